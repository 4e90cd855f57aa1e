// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image/video display and annotation.
//!
//! This module paints the media and the controller's draw commands with
//! egui, and forwards pointer input to the canvas controller in
//! canvas-local screen coordinates.

use crate::canvas::input::Gesture;
use crate::canvas::render::{DrawCommand, Rgba, Stroke, TextAnchor};
use crate::canvas::{CanvasController, Notice};
use crate::models::annotation::Point;

const DASH_LENGTH: f32 = 6.0;
const GAP_LENGTH: f32 = 4.0;

/// Display the canvas area and route mouse interaction to `controller`.
pub fn show(
    ui: &mut egui::Ui,
    controller: &mut CanvasController,
    media_texture: Option<&egui::TextureHandle>,
    media_size: Option<(u32, u32)>,
) {
    let status_height = ui.spacing().interact_size.y + ui.spacing().item_spacing.y * 2.0;
    let canvas_size = ui.available_size() - egui::vec2(0.0, status_height);
    let (response, painter) =
        ui.allocate_painter(canvas_size.max(egui::Vec2::ZERO), egui::Sense::click_and_drag());
    let rect = response.rect;
    let origin = rect.min;

    painter.rect_filled(rect, 0.0, egui::Color32::from_gray(40));

    let to_canvas = |pos: egui::Pos2| Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64);
    let to_screen = |p: Point| origin + egui::vec2(p.x as f32, p.y as f32);

    // Media layer
    match media_size {
        Some((width, height)) => {
            let viewport = controller.viewport();
            let min = to_screen(viewport.media_to_screen(Point::new(0.0, 0.0)));
            let max = to_screen(viewport.media_to_screen(Point::new(width as f64, height as f64)));
            let media_rect = egui::Rect::from_min_max(min, max);

            if let Some(texture) = media_texture {
                painter.image(
                    texture.id(),
                    media_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            } else if controller.media().is_video() {
                let video = controller.video();
                painter.rect_filled(media_rect, 0.0, egui::Color32::from_gray(15));
                painter.text(
                    media_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    format!(
                        "{} {}",
                        if video.playing { "▶" } else { "⏸" },
                        controller.media().media_url
                    ),
                    egui::FontId::proportional(16.0),
                    egui::Color32::from_gray(160),
                );
            }
        }
        None => {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Open an image or video to begin annotating\nFile → Open Media...",
                egui::FontId::proportional(16.0),
                egui::Color32::from_gray(180),
            );
        }
    }

    // Pointer input
    if media_size.is_some() {
        handle_pointer(ui, &response, controller, to_canvas);
    }

    // Annotation layer, rebuilt from scratch every frame
    for command in controller.render() {
        paint(&painter, &command, to_screen);
    }

    // Status line
    ui.separator();
    ui.horizontal(|ui| {
        ui.label(format!("Tool: {}", controller.tool().name()));
        ui.separator();
        ui.label(format!("{:.0}%", controller.viewport().zoom() * 100.0));
        ui.separator();
        if controller.is_locked() {
            ui.label("🔒 Locked");
        } else if let Gesture::Polygon { vertices, .. } = controller.gesture() {
            ui.label(format!("{} vertices, Enter to close", vertices.len()));
        } else {
            ui.label(egui::RichText::new(controller.tool().hint()).italics().weak());
        }

        let mut dismiss = false;
        match controller.notice() {
            Some(Notice::Info(message)) => {
                ui.separator();
                ui.label(message);
                dismiss = ui.small_button("✕").clicked();
            }
            Some(Notice::Error(message)) => {
                ui.separator();
                ui.colored_label(egui::Color32::LIGHT_RED, message);
                dismiss = ui.small_button("✕").clicked();
            }
            None => {}
        }
        if dismiss {
            controller.dismiss_notice();
        }
    });
}

fn handle_pointer(
    ui: &egui::Ui,
    response: &egui::Response,
    controller: &mut CanvasController,
    to_canvas: impl Fn(egui::Pos2) -> Point,
) {
    use egui::PointerButton;

    if response.drag_started_by(PointerButton::Primary) {
        if let Some(origin) = ui.input(|i| i.pointer.press_origin()) {
            controller.pointer_down(to_canvas(origin));
        }
    }
    if response.dragged_by(PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            controller.pointer_move(to_canvas(pos));
        }
    }
    if response.drag_stopped_by(PointerButton::Primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            controller.pointer_up(to_canvas(pos));
        }
    }

    if response.dragged_by(PointerButton::Secondary) || response.dragged_by(PointerButton::Middle) {
        let delta = response.drag_delta();
        controller.pan_by(delta.x as f64, delta.y as f64);
    }

    if let Some(pos) = response.interact_pointer_pos() {
        if response.double_clicked() {
            controller.double_click(to_canvas(pos));
        } else if response.clicked() {
            controller.pointer_down(to_canvas(pos));
            controller.pointer_up(to_canvas(pos));
        }
    }

    if let Some(pos) = response.hover_pos() {
        if !response.dragged() {
            controller.pointer_move(to_canvas(pos));
        }
    }

    if response.hovered() {
        let scroll = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 {
            // egui reports wheel-up as positive
            controller.wheel(-(scroll as f64));
        }
    }
}

fn color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

fn stroke32(s: &Stroke) -> egui::Stroke {
    egui::Stroke::new(s.width as f32, color32(s.color))
}

fn is_convex(points: &[egui::Pos2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0_f32;
    for i in 0..n {
        let (a, b, c) = (points[i], points[(i + 1) % n], points[(i + 2) % n]);
        let cross = (b - a).x * (c - b).y - (b - a).y * (c - b).x;
        if cross != 0.0 {
            if sign != 0.0 && cross.signum() != sign {
                return false;
            }
            sign = cross.signum();
        }
    }
    true
}

fn outline(painter: &egui::Painter, points: Vec<egui::Pos2>, closed: bool, stroke: &Stroke) {
    if stroke.dashed {
        let mut path = points;
        if closed {
            if let Some(first) = path.first().copied() {
                path.push(first);
            }
        }
        painter.extend(egui::Shape::dashed_line(&path, stroke32(stroke), DASH_LENGTH, GAP_LENGTH));
    } else if closed {
        painter.add(egui::Shape::closed_line(points, stroke32(stroke)));
    } else {
        painter.add(egui::Shape::line(points, stroke32(stroke)));
    }
}

/// Replay one draw command.
fn paint(painter: &egui::Painter, command: &DrawCommand, to_screen: impl Fn(Point) -> egui::Pos2) {
    match command {
        DrawCommand::Rect {
            min,
            width,
            height,
            fill,
            stroke,
        } => {
            let rect = egui::Rect::from_min_size(
                to_screen(*min),
                egui::vec2(*width as f32, *height as f32),
            );
            if let Some(fill) = fill {
                painter.rect_filled(rect, 0.0, color32(*fill));
            }
            let corners = vec![rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()];
            outline(painter, corners, true, stroke);
        }
        DrawCommand::Circle {
            center,
            radius,
            fill,
            stroke,
        } => {
            painter.circle(
                to_screen(*center),
                *radius as f32,
                fill.map(color32).unwrap_or(egui::Color32::TRANSPARENT),
                stroke.as_ref().map(stroke32).unwrap_or(egui::Stroke::NONE),
            );
        }
        DrawCommand::Path {
            points,
            closed,
            fill,
            stroke,
        } => {
            let screen: Vec<egui::Pos2> = points.iter().map(|p| to_screen(*p)).collect();
            // egui only tessellates convex fills correctly
            if let Some(fill) = fill {
                if *closed && is_convex(&screen) {
                    painter.add(egui::Shape::convex_polygon(
                        screen.clone(),
                        color32(*fill),
                        egui::Stroke::NONE,
                    ));
                }
            }
            outline(painter, screen, *closed, stroke);
        }
        DrawCommand::Text {
            pos,
            anchor,
            text,
            color,
            size,
        } => {
            let align = match anchor {
                TextAnchor::BottomLeft => egui::Align2::LEFT_BOTTOM,
                TextAnchor::TopLeft => egui::Align2::LEFT_TOP,
            };
            painter.text(
                to_screen(*pos),
                align,
                text,
                egui::FontId::proportional(*size as f32),
                color32(*color),
            );
        }
    }
}
