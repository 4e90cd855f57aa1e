// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar for selecting drawing tools, undo/redo,
//! zoom, the edit lock and annotation import/export.

use crate::canvas::input::Tool;
use crate::canvas::CanvasController;

/// File operations the toolbar asks the app to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    ExportJson,
    ExportYaml,
    Import,
}

fn tool_icon(tool: Tool) -> &'static str {
    match tool {
        Tool::BBox => "⬜",
        Tool::Polygon => "▱",
        Tool::Point => "⏺",
        Tool::Line => "⟋",
        Tool::Text => "T",
    }
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, controller: &mut CanvasController) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        // Tools
        let editable = !controller.is_locked();
        for tool in Tool::ALL {
            let text = format!("{} {}", tool_icon(tool), tool.name());
            let selected = controller.tool() == tool;
            if ui
                .add_enabled(editable, egui::SelectableLabel::new(selected, text))
                .on_hover_text(format!("{} ({})", tool.name(), tool.shortcut().to_ascii_uppercase()))
                .clicked()
            {
                controller.set_tool(tool);
            }
        }

        ui.separator();

        // Undo/Redo
        if ui
            .add_enabled(controller.store().can_undo(), egui::Button::new("↶"))
            .on_hover_text("Undo (Ctrl+Z)")
            .clicked()
        {
            controller.undo();
        }
        if ui
            .add_enabled(controller.store().can_redo(), egui::Button::new("↷"))
            .on_hover_text("Redo (Ctrl+Y)")
            .clicked()
        {
            controller.redo();
        }

        ui.separator();

        // Zoom
        if ui.button("➖").on_hover_text("Zoom Out (-)").clicked() {
            controller.zoom_out();
        }
        ui.label(format!("{:.0}%", controller.viewport().zoom() * 100.0));
        if ui.button("➕").on_hover_text("Zoom In (+)").clicked() {
            controller.zoom_in();
        }
        if ui.button("⟲").on_hover_text("Reset View").clicked() {
            controller.reset_view();
        }

        ui.separator();

        // Lock
        let locked = controller.is_locked();
        let lock_text = if locked { "🔒" } else { "🔓" };
        if ui
            .selectable_label(locked, lock_text)
            .on_hover_text(if locked { "Unlock editing" } else { "Lock editing" })
            .clicked()
        {
            controller.toggle_lock();
        }

        ui.separator();

        // Export/Import
        ui.menu_button("Export", |ui| {
            if ui.button("JSON...").clicked() {
                action = ToolbarAction::ExportJson;
                ui.close_menu();
            }
            if ui.button("YAML...").clicked() {
                action = ToolbarAction::ExportYaml;
                ui.close_menu();
            }
        });
        if ui
            .add_enabled(editable, egui::Button::new("Import..."))
            .on_hover_text("Import Annotations")
            .clicked()
        {
            action = ToolbarAction::Import;
        }
        if ui
            .selectable_label(controller.show_help(), "?")
            .on_hover_text("Keyboard Shortcuts (?)")
            .clicked()
        {
            controller.toggle_help();
        }
    });

    action
}
