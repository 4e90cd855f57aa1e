// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation properties panel.
//!
//! This module provides the side panel for choosing the label and colour of
//! new annotations and for browsing and deleting existing ones.

use crate::canvas::render::Rgba;
use crate::canvas::CanvasController;
use crate::models::annotation::AnnotationPatch;

/// Edits requested from the annotation list.
enum ListAction {
    Delete(String),
    Restyle(String),
}

/// Local wall-clock time of a millisecond timestamp.
fn format_time(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Display the properties panel.
pub fn show(ui: &mut egui::Ui, controller: &mut CanvasController) {
    ui.heading("Properties");
    ui.separator();

    ui.label(egui::RichText::new("Label").small().strong());
    let mut label = controller.label().to_string();
    if ui
        .add(egui::TextEdit::singleline(&mut label).hint_text("Enter label"))
        .changed()
    {
        controller.set_label(label);
    }

    ui.label(egui::RichText::new("Color").small().strong());
    let color = Rgba::parse_or_default(controller.color());
    let mut rgb = [color.r, color.g, color.b];
    if ui.color_edit_button_srgb(&mut rgb).changed() {
        controller.set_color(Rgba::rgb(rgb[0], rgb[1], rgb[2]).to_hex());
    }

    ui.separator();

    let count = controller.store().annotations().len();
    ui.label(
        egui::RichText::new(format!(
            "{} Annotation{}",
            count,
            if count == 1 { "" } else { "s" }
        ))
        .small()
        .strong(),
    );

    let editable = !controller.is_locked();
    let mut action = None;
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for annotation in controller.store().annotations() {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.horizontal(|ui| {
                        let swatch = Rgba::parse_or_default(annotation.color());
                        ui.colored_label(
                            egui::Color32::from_rgb(swatch.r, swatch.g, swatch.b),
                            "■",
                        );
                        ui.strong(annotation.label());
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui
                                .add_enabled(editable, egui::Button::new("🗑").small())
                                .on_hover_text("Delete")
                                .clicked()
                            {
                                action = Some(ListAction::Delete(annotation.id().to_string()));
                            }
                            if ui
                                .add_enabled(editable, egui::Button::new("🖌").small())
                                .on_hover_text("Apply current label and color")
                                .clicked()
                            {
                                action = Some(ListAction::Restyle(annotation.id().to_string()));
                            }
                        });
                    });
                    let mut details = format!(
                        "{} · {}",
                        annotation.kind().as_str(),
                        format_time(annotation.created_at())
                    );
                    if let Some(confidence) = annotation.confidence() {
                        details.push_str(&format!(" · {:.0}%", confidence * 100.0));
                    }
                    ui.label(egui::RichText::new(details).small().weak());
                });
            }
        });

    match action {
        Some(ListAction::Delete(id)) => {
            controller.remove(&id);
        }
        Some(ListAction::Restyle(id)) => {
            let patch = AnnotationPatch::default()
                .label(controller.label())
                .color(controller.color());
            controller.update(&id, patch);
        }
        None => {}
    }
}
