// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Keyboard shortcut overlay.

use crate::canvas::input::Tool;
use crate::canvas::CanvasController;

const GENERAL_SHORTCUTS: &[(&str, &str)] = &[
    ("Ctrl+Z", "Undo"),
    ("Ctrl+Y / Ctrl+Shift+Z", "Redo"),
    ("Delete", "Clear all annotations"),
    ("+ / -", "Zoom in / out"),
    ("Enter", "Close polygon"),
    ("Escape", "Cancel drawing"),
    ("Space", "Play / pause video"),
    ("?", "Toggle this help"),
];

/// Display the shortcut window while help is toggled on.
pub fn show(ctx: &egui::Context, controller: &mut CanvasController) {
    let mut open = controller.show_help();
    if !open {
        return;
    }

    egui::Window::new("Keyboard Shortcuts")
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            egui::Grid::new("shortcuts")
                .num_columns(2)
                .spacing([24.0, 6.0])
                .striped(true)
                .show(ui, |ui| {
                    for tool in Tool::ALL {
                        ui.monospace(tool.shortcut().to_ascii_uppercase().to_string());
                        ui.label(tool.name());
                        ui.end_row();
                    }
                    for (keys, description) in GENERAL_SHORTCUTS {
                        ui.monospace(*keys);
                        ui.label(*description);
                        ui.end_row();
                    }
                });
            if controller.is_locked() {
                ui.separator();
                ui.label(
                    egui::RichText::new("Editing is locked: tool and clear shortcuts are disabled")
                        .italics()
                        .weak(),
                );
            }
        });

    if !open {
        controller.set_help(false);
    }
}
