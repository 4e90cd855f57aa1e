// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the core data structures for representing boxes,
//! polygons, points, lines and text marks. All geometry is stored in
//! media-local coordinates (pixels of the underlying image or video frame),
//! independent of the current zoom and pan.

use crate::error::AnnotationError;
use crate::io::serialization::AnnotationRecord;
use crate::util::geometry;
use serde::{Deserialize, Serialize};

/// Opaque, session-unique annotation identifier.
pub type AnnotationId = String;

/// A 2D point in media-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Type of annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    #[serde(rename = "bbox")]
    BBox,
    Polygon,
    Point,
    Line,
    Text,
}

impl AnnotationKind {
    /// Name used in the export format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BBox => "bbox",
            Self::Polygon => "polygon",
            Self::Point => "point",
            Self::Line => "line",
            Self::Text => "text",
        }
    }
}

/// An axis-aligned bounding box; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// A closed polygon given by its ordered vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

/// A straight segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

/// A text mark anchored at its top-left position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMark {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Kind-specific payload of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    BBox(BoundingBox),
    Polygon(Polygon),
    Point(Point),
    Line(Line),
    Text(TextMark),
}

impl Geometry {
    /// The annotation kind this payload belongs to.
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Self::BBox(_) => AnnotationKind::BBox,
            Self::Polygon(_) => AnnotationKind::Polygon,
            Self::Point(_) => AnnotationKind::Point,
            Self::Line(_) => AnnotationKind::Line,
            Self::Text(_) => AnnotationKind::Text,
        }
    }

    /// Check the structural invariants every stored geometry must satisfy:
    /// finite coordinates and positive extent for boxes and polygons.
    pub fn validate(&self) -> Result<(), AnnotationError> {
        let finite = match self {
            Self::BBox(b) => [b.x, b.y, b.width, b.height].iter().all(|v| v.is_finite()),
            Self::Polygon(p) => p.points.iter().all(Point::is_finite),
            Self::Point(p) => p.is_finite(),
            Self::Line(l) => l.start.is_finite() && l.end.is_finite(),
            Self::Text(t) => t.x.is_finite() && t.y.is_finite(),
        };
        if !finite {
            return Err(AnnotationError::Validation(format!(
                "{} geometry has non-finite coordinates",
                self.kind().as_str()
            )));
        }

        match self {
            Self::BBox(b) if b.width <= 0.0 || b.height <= 0.0 => Err(AnnotationError::Validation(
                format!("bbox must have positive extent, got {}x{}", b.width, b.height),
            )),
            Self::Polygon(p) if p.points.len() < 3 => Err(AnnotationError::Validation(format!(
                "polygon needs at least 3 vertices, got {}",
                p.points.len()
            ))),
            Self::Polygon(p) if geometry::polygon_area(&p.points) <= 0.0 => Err(
                AnnotationError::Validation("polygon must enclose a positive area".to_string()),
            ),
            _ => Ok(()),
        }
    }

    /// Media-space position where the label is anchored.
    pub fn anchor(&self) -> Point {
        match self {
            Self::BBox(b) => Point::new(b.x, b.y),
            Self::Polygon(p) => geometry::bounds(&p.points)
                .map(|b| Point::new(b.x, b.y))
                .unwrap_or(Point::new(0.0, 0.0)),
            Self::Point(p) => *p,
            Self::Line(l) => l.start,
            Self::Text(t) => Point::new(t.x, t.y),
        }
    }
}

/// A labeled annotation over the media.
///
/// `id`, `confidence` (once set) and `created_at` never change after
/// construction; label, colour and geometry are edited through
/// [`AnnotationPatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnnotationRecord", into = "AnnotationRecord")]
pub struct Annotation {
    id: AnnotationId,
    label: String,
    color: String,
    geometry: Geometry,
    confidence: Option<f64>,
    /// Creation time in milliseconds since the Unix epoch.
    created_at: i64,
}

impl Annotation {
    /// Create a new annotation with a fresh id and the current time.
    pub fn new(label: impl Into<String>, color: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            label: label.into(),
            color: color.into(),
            geometry,
            confidence: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Rebuild an annotation from already-validated parts.
    pub fn from_parts(
        id: AnnotationId,
        label: String,
        color: String,
        geometry: Geometry,
        confidence: Option<f64>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            label,
            color,
            geometry,
            confidence,
            created_at,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> AnnotationKind {
        self.geometry.kind()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Validate id, geometry and confidence.
    pub fn validate(&self) -> Result<(), AnnotationError> {
        if self.id.is_empty() {
            return Err(AnnotationError::Validation("id must not be empty".to_string()));
        }
        if let Some(c) = self.confidence {
            if !c.is_finite() {
                return Err(AnnotationError::Validation(format!(
                    "confidence must be finite, got {c}"
                )));
            }
        }
        self.geometry.validate()
    }

    /// Merge a partial update into this annotation.
    ///
    /// The kind cannot change and a confidence that is already set cannot
    /// be replaced. On error the annotation is left untouched.
    pub fn apply(&mut self, patch: AnnotationPatch) -> Result<(), AnnotationError> {
        if let Some(ref geometry) = patch.geometry {
            if geometry.kind() != self.kind() {
                return Err(AnnotationError::Validation(format!(
                    "cannot change {} annotation into {}",
                    self.kind().as_str(),
                    geometry.kind().as_str()
                )));
            }
            geometry.validate()?;
        }
        if let (Some(current), Some(new)) = (self.confidence, patch.confidence) {
            if current != new {
                return Err(AnnotationError::Validation(format!(
                    "confidence of {} is already set",
                    self.id
                )));
            }
        }

        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(geometry) = patch.geometry {
            self.geometry = geometry;
        }
        if patch.confidence.is_some() {
            self.confidence = patch.confidence;
        }
        Ok(())
    }
}

/// Partial update for an annotation; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationPatch {
    pub label: Option<String>,
    pub color: Option<String>,
    pub geometry: Option<Geometry>,
    pub confidence: Option<f64>,
}

impl AnnotationPatch {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }
}
