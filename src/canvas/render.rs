// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rendering: turns the annotation list into draw commands.
//!
//! [`render`] is pure. It reads a snapshot and a viewport and returns the
//! full shape layer in screen coordinates; it never patches a previous
//! frame. Any painter (egui, a 2D canvas, a terminal) can replay the
//! commands.

use super::viewport::Viewport;
use crate::models::annotation::{Annotation, BoundingBox, Geometry, Line, Point};

/// Fallback colour for annotations whose colour string does not parse.
pub const DEFAULT_COLOR: Rgba = Rgba::rgb(0x7c, 0x3a, 0xed);

/// Alpha of the translucent fill under boxes, polygons and points.
const FILL_ALPHA: u8 = 0x20;

/// Stroke width in screen pixels.
const STROKE_WIDTH: f64 = 2.0;

/// Label font size in screen pixels.
const LABEL_SIZE: f64 = 14.0;

/// Point marker radius in screen pixels.
const POINT_RADIUS: f64 = 5.0;

/// Preview vertex marker radius in screen pixels.
const VERTEX_RADIUS: f64 = 3.0;

/// Gap between a shape and its label, in media units.
const LABEL_GAP: f64 = 5.0;

/// Horizontal offset of a point's label, in media units.
const POINT_LABEL_OFFSET: f64 = 10.0;

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => {
                let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
                Some(Self::rgb(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?).with_alpha(byte(6)?)),
            _ => None,
        }
    }

    /// Parse, falling back to [`DEFAULT_COLOR`].
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse_hex(s).unwrap_or(DEFAULT_COLOR)
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Outline style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Rgba,
    pub dashed: bool,
}

impl Stroke {
    fn solid(color: Rgba) -> Self {
        Self {
            width: STROKE_WIDTH,
            color,
            dashed: false,
        }
    }

    fn dashed(color: Rgba) -> Self {
        Self {
            dashed: true,
            ..Self::solid(color)
        }
    }
}

/// Which corner of the text box `pos` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    BottomLeft,
    TopLeft,
}

/// A single screen-space drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        min: Point,
        width: f64,
        height: f64,
        fill: Option<Rgba>,
        stroke: Stroke,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Option<Rgba>,
        stroke: Option<Stroke>,
    },
    Path {
        points: Vec<Point>,
        closed: bool,
        fill: Option<Rgba>,
        stroke: Stroke,
    },
    Text {
        pos: Point,
        anchor: TextAnchor,
        text: String,
        color: Rgba,
        size: f64,
    },
}

/// Shape of an unfinished gesture, in media coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewShape {
    Rect(BoundingBox),
    Segment(Line),
    /// Placed vertices followed by the pointer position, if any.
    OpenPolygon(Vec<Point>),
}

/// The in-progress gesture drawn on top of committed annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub shape: PreviewShape,
    pub color: Rgba,
}

/// Build the full shape layer for `annotations` under `viewport`.
pub fn render(
    annotations: &[Annotation],
    viewport: &Viewport,
    preview: Option<&Preview>,
) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(annotations.len() * 2 + 4);
    for annotation in annotations {
        draw_annotation(&mut commands, annotation, viewport);
    }
    if let Some(preview) = preview {
        draw_preview(&mut commands, preview, viewport);
    }
    commands
}

fn label(text: &str, pos: Point, color: Rgba) -> DrawCommand {
    DrawCommand::Text {
        pos,
        anchor: TextAnchor::BottomLeft,
        text: text.to_string(),
        color,
        size: LABEL_SIZE,
    }
}

fn draw_annotation(out: &mut Vec<DrawCommand>, annotation: &Annotation, viewport: &Viewport) {
    let color = Rgba::parse_or_default(annotation.color());
    let fill = Some(color.with_alpha(FILL_ALPHA));

    match annotation.geometry() {
        Geometry::BBox(b) => {
            out.push(DrawCommand::Rect {
                min: viewport.media_to_screen(Point::new(b.x, b.y)),
                width: viewport.media_len_to_screen(b.width),
                height: viewport.media_len_to_screen(b.height),
                fill,
                stroke: Stroke::solid(color),
            });
            let pos = viewport.media_to_screen(Point::new(b.x, b.y - LABEL_GAP));
            out.push(label(annotation.label(), pos, color));
        }
        Geometry::Point(p) => {
            out.push(DrawCommand::Circle {
                center: viewport.media_to_screen(*p),
                radius: POINT_RADIUS,
                fill,
                stroke: Some(Stroke::solid(color)),
            });
            let pos = viewport.media_to_screen(Point::new(p.x + POINT_LABEL_OFFSET, p.y));
            out.push(label(annotation.label(), pos, color));
        }
        Geometry::Polygon(poly) => {
            out.push(DrawCommand::Path {
                points: poly.points.iter().map(|p| viewport.media_to_screen(*p)).collect(),
                closed: true,
                fill,
                stroke: Stroke::solid(color),
            });
            let anchor = annotation.geometry().anchor();
            let pos = viewport.media_to_screen(Point::new(anchor.x, anchor.y - LABEL_GAP));
            out.push(label(annotation.label(), pos, color));
        }
        Geometry::Line(line) => {
            out.push(DrawCommand::Path {
                points: vec![
                    viewport.media_to_screen(line.start),
                    viewport.media_to_screen(line.end),
                ],
                closed: false,
                fill: None,
                stroke: Stroke::solid(color),
            });
            let pos =
                viewport.media_to_screen(Point::new(line.start.x, line.start.y - LABEL_GAP));
            out.push(label(annotation.label(), pos, color));
        }
        Geometry::Text(t) => {
            out.push(DrawCommand::Text {
                pos: viewport.media_to_screen(Point::new(t.x, t.y)),
                anchor: TextAnchor::TopLeft,
                text: t.text.clone(),
                color,
                size: LABEL_SIZE,
            });
        }
    }
}

fn draw_preview(out: &mut Vec<DrawCommand>, preview: &Preview, viewport: &Viewport) {
    let stroke = Stroke::dashed(preview.color);
    match &preview.shape {
        PreviewShape::Rect(b) => out.push(DrawCommand::Rect {
            min: viewport.media_to_screen(Point::new(b.x, b.y)),
            width: viewport.media_len_to_screen(b.width),
            height: viewport.media_len_to_screen(b.height),
            fill: None,
            stroke,
        }),
        PreviewShape::Segment(line) => out.push(DrawCommand::Path {
            points: vec![
                viewport.media_to_screen(line.start),
                viewport.media_to_screen(line.end),
            ],
            closed: false,
            fill: None,
            stroke,
        }),
        PreviewShape::OpenPolygon(points) => {
            let screen: Vec<Point> = points.iter().map(|p| viewport.media_to_screen(*p)).collect();
            for p in &screen {
                out.push(DrawCommand::Circle {
                    center: *p,
                    radius: VERTEX_RADIUS,
                    fill: Some(preview.color),
                    stroke: None,
                });
            }
            if screen.len() >= 2 {
                out.push(DrawCommand::Path {
                    points: screen,
                    closed: false,
                    fill: None,
                    stroke,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{Polygon, TextMark};

    fn annotation(geometry: Geometry) -> Annotation {
        Annotation::from_parts(
            "id".to_string(),
            "car".to_string(),
            "#ff8000".to_string(),
            geometry,
            None,
            0,
        )
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgba::parse_hex("#ff8000"), Some(Rgba::rgb(255, 128, 0)));
        assert_eq!(Rgba::parse_hex("#f80"), Some(Rgba::rgb(255, 136, 0)));
        assert_eq!(
            Rgba::parse_hex("#ff800020"),
            Some(Rgba::rgb(255, 128, 0).with_alpha(0x20))
        );
        assert_eq!(Rgba::parse_hex("ff8000"), None);
        assert_eq!(Rgba::parse_hex("#zzzzzz"), None);
        assert_eq!(Rgba::parse_hex("#ééé"), None);
        assert_eq!(Rgba::parse_or_default("red"), DEFAULT_COLOR);
        assert_eq!(Rgba::rgb(124, 58, 237).to_hex(), "#7c3aed");
    }

    #[test]
    fn test_bbox_recipe_at_identity() {
        let ann = annotation(Geometry::BBox(BoundingBox::new(10.0, 20.0, 30.0, 40.0)));
        let commands = render(&[ann], &Viewport::default(), None);

        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[0],
            DrawCommand::Rect {
                min: Point::new(10.0, 20.0),
                width: 30.0,
                height: 40.0,
                fill: Some(Rgba::rgb(255, 128, 0).with_alpha(0x20)),
                stroke: Stroke::solid(Rgba::rgb(255, 128, 0)),
            }
        );
        match &commands[1] {
            DrawCommand::Text { pos, text, .. } => {
                assert_eq!(*pos, Point::new(10.0, 15.0));
                assert_eq!(text, "car");
            }
            other => panic!("expected label, got {other:?}"),
        }
    }

    #[test]
    fn test_geometry_follows_viewport() {
        let ann = annotation(Geometry::BBox(BoundingBox::new(10.0, 20.0, 30.0, 40.0)));
        let mut vp = Viewport::default();
        vp.set_zoom(2.0);
        vp.pan_by(50.0, 50.0);

        let commands = render(&[ann], &vp, None);
        match &commands[0] {
            DrawCommand::Rect { min, width, height, .. } => {
                assert_eq!(*min, Point::new(70.0, 90.0));
                assert_eq!((*width, *height), (60.0, 80.0));
            }
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn test_point_radius_is_screen_space() {
        let ann = annotation(Geometry::Point(Point::new(5.0, 5.0)));
        let mut vp = Viewport::default();
        vp.set_zoom(3.0);

        match &render(&[ann], &vp, None)[0] {
            DrawCommand::Circle { center, radius, .. } => {
                assert_eq!(*center, Point::new(15.0, 15.0));
                assert_eq!(*radius, POINT_RADIUS);
            }
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn test_every_kind_renders() {
        let anns = vec![
            annotation(Geometry::Polygon(Polygon {
                points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)],
            })),
            annotation(Geometry::Line(Line {
                start: Point::new(0.0, 0.0),
                end: Point::new(10.0, 10.0),
            })),
            annotation(Geometry::Text(TextMark {
                x: 1.0,
                y: 2.0,
                text: "hi".to_string(),
            })),
        ];
        let commands = render(&anns, &Viewport::default(), None);

        assert!(matches!(commands[0], DrawCommand::Path { closed: true, .. }));
        assert!(matches!(commands[2], DrawCommand::Path { closed: false, fill: None, .. }));
        assert!(matches!(
            commands.last(),
            Some(DrawCommand::Text { anchor: TextAnchor::TopLeft, .. })
        ));
    }

    #[test]
    fn test_preview_is_dashed_and_last() {
        let preview = Preview {
            shape: PreviewShape::OpenPolygon(vec![Point::new(0.0, 0.0), Point::new(4.0, 4.0)]),
            color: Rgba::rgb(0, 0, 255),
        };
        let commands = render(&[], &Viewport::default(), Some(&preview));

        assert_eq!(commands.len(), 3);
        match commands.last() {
            Some(DrawCommand::Path { stroke, closed, .. }) => {
                assert!(stroke.dashed);
                assert!(!closed);
            }
            other => panic!("expected preview path, got {other:?}"),
        }
    }
}
