// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation serialization and deserialization.
//!
//! This module handles exporting and importing annotation lists in JSON
//! and YAML. Every annotation travels as an [`AnnotationRecord`] with the
//! field order `id, type, label, color, data, confidence?, timestamp`.

use crate::error::AnnotationError;
use crate::models::annotation::{
    Annotation, AnnotationKind, BoundingBox, Geometry, Line, Point, Polygon, TextMark,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;

/// Wire shape of a single annotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub label: String,
    pub color: String,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub timestamp: i64,
}

fn point_data(p: &Point) -> Value {
    json!({ "x": p.x, "y": p.y })
}

fn geometry_to_data(geometry: &Geometry) -> Value {
    match geometry {
        Geometry::BBox(b) => json!({
            "x": b.x,
            "y": b.y,
            "width": b.width,
            "height": b.height,
        }),
        Geometry::Polygon(p) => json!({
            "points": p.points.iter().map(point_data).collect::<Vec<_>>(),
        }),
        Geometry::Point(p) => point_data(p),
        Geometry::Line(l) => json!({
            "start": point_data(&l.start),
            "end": point_data(&l.end),
        }),
        Geometry::Text(t) => json!({ "x": t.x, "y": t.y, "text": t.text }),
    }
}

fn geometry_from_data(kind: AnnotationKind, data: Value) -> Result<Geometry, AnnotationError> {
    let parsed = match kind {
        AnnotationKind::BBox => serde_json::from_value::<BoundingBox>(data).map(Geometry::BBox),
        AnnotationKind::Polygon => serde_json::from_value::<Polygon>(data).map(Geometry::Polygon),
        AnnotationKind::Point => serde_json::from_value::<Point>(data).map(Geometry::Point),
        AnnotationKind::Line => serde_json::from_value::<Line>(data).map(Geometry::Line),
        AnnotationKind::Text => serde_json::from_value::<TextMark>(data).map(Geometry::Text),
    };
    parsed.map_err(|e| AnnotationError::Parse(format!("invalid {} data: {e}", kind.as_str())))
}

impl From<Annotation> for AnnotationRecord {
    fn from(annotation: Annotation) -> Self {
        Self {
            id: annotation.id().to_string(),
            kind: annotation.kind(),
            label: annotation.label().to_string(),
            color: annotation.color().to_string(),
            data: geometry_to_data(annotation.geometry()),
            confidence: annotation.confidence(),
            timestamp: annotation.created_at(),
        }
    }
}

impl TryFrom<AnnotationRecord> for Annotation {
    type Error = AnnotationError;

    fn try_from(record: AnnotationRecord) -> Result<Self, Self::Error> {
        let geometry = geometry_from_data(record.kind, record.data)?;
        let annotation = Annotation::from_parts(
            record.id,
            record.label,
            record.color,
            geometry,
            record.confidence,
            record.timestamp,
        );
        annotation.validate()?;
        Ok(annotation)
    }
}

pub(crate) fn ensure_unique_ids(annotations: &[Annotation]) -> Result<(), AnnotationError> {
    let mut seen = HashSet::new();
    for annotation in annotations {
        if !seen.insert(annotation.id()) {
            return Err(AnnotationError::Parse(format!(
                "duplicate annotation id {}",
                annotation.id()
            )));
        }
    }
    Ok(())
}

/// Serialize annotations as a pretty-printed JSON array.
pub fn to_json(annotations: &[Annotation]) -> Result<String, AnnotationError> {
    Ok(serde_json::to_string_pretty(annotations)?)
}

/// Parse a JSON array of annotations, validating every record.
pub fn from_json(json: &str) -> Result<Vec<Annotation>, AnnotationError> {
    let annotations: Vec<Annotation> = serde_json::from_str(json)?;
    ensure_unique_ids(&annotations)?;
    Ok(annotations)
}

/// Export annotations to a file; the format follows the extension.
pub fn export_to_file(annotations: &[Annotation], path: &Path) -> Result<()> {
    let extension = path.extension().and_then(|s| s.to_str());
    let contents = match extension {
        Some("yaml") | Some("yml") => serde_yaml::to_string(annotations)?,
        Some("json") => to_json(annotations)?,
        _ => anyhow::bail!("Unsupported file extension: {:?}", extension),
    };
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Read an annotation file previously written by [`export_to_file`].
pub fn import_from_file(path: &Path) -> Result<Vec<Annotation>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let extension = path.extension().and_then(|s| s.to_str());
    let annotations = match extension {
        Some("yaml") | Some("yml") => {
            let annotations: Vec<Annotation> = serde_yaml::from_str(&contents)?;
            ensure_unique_ids(&annotations)?;
            annotations
        }
        _ => from_json(&contents)?,
    };
    Ok(annotations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Annotation> {
        vec![
            Annotation::from_parts(
                "a1".to_string(),
                "car".to_string(),
                "#7c3aed".to_string(),
                Geometry::BBox(BoundingBox::new(10.0, 20.0, 30.0, 40.0)),
                Some(0.75),
                1_700_000_000_000,
            ),
            Annotation::from_parts(
                "a2".to_string(),
                "edge".to_string(),
                "#00ff00".to_string(),
                Geometry::Line(Line {
                    start: Point::new(0.0, 0.0),
                    end: Point::new(12.0, 5.0),
                }),
                None,
                1_700_000_000_500,
            ),
            Annotation::from_parts(
                "a3".to_string(),
                "note".to_string(),
                "#000000".to_string(),
                Geometry::Text(TextMark {
                    x: 3.0,
                    y: 4.0,
                    text: "hello".to_string(),
                }),
                None,
                1_700_000_001_000,
            ),
        ]
    }

    #[test]
    fn test_export_field_order() {
        let json = to_json(&sample()[..1]).unwrap();
        let order = ["\"id\"", "\"type\"", "\"label\"", "\"color\"", "\"data\"", "\"confidence\"", "\"timestamp\""];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
        assert!(json.contains("\"type\": \"bbox\""));

        let data_start = json.find("\"data\"").unwrap();
        let data = &json[data_start..];
        assert!(data.find("\"x\"").unwrap() < data.find("\"width\"").unwrap());
    }

    #[test]
    fn test_export_omits_missing_confidence() {
        let json = to_json(&sample()[1..2]).unwrap();
        assert!(!json.contains("confidence"));
    }

    #[test]
    fn test_json_round_trip() {
        let annotations = sample();
        let parsed = from_json(&to_json(&annotations).unwrap()).unwrap();
        assert_eq!(parsed, annotations);
    }

    #[test]
    fn test_import_rejects_malformed_input() {
        assert!(matches!(from_json("not json"), Err(AnnotationError::Parse(_))));
        assert!(matches!(from_json("{\"id\": \"x\"}"), Err(AnnotationError::Parse(_))));

        // Missing color
        let missing = r#"[{"id":"a","type":"point","label":"p","data":{"x":1,"y":2},"timestamp":1}]"#;
        assert!(matches!(from_json(missing), Err(AnnotationError::Parse(_))));

        // Data does not match the declared type
        let mismatched = r##"[{"id":"a","type":"bbox","label":"b","color":"#fff","data":{"x":1,"y":2},"timestamp":1}]"##;
        assert!(matches!(from_json(mismatched), Err(AnnotationError::Parse(_))));

        // Zero-size box
        let degenerate = r##"[{"id":"a","type":"bbox","label":"b","color":"#fff","data":{"x":1,"y":2,"width":0,"height":4},"timestamp":1}]"##;
        assert!(matches!(from_json(degenerate), Err(AnnotationError::Parse(_))));
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let point = r##"{"id":"same","type":"point","label":"p","color":"#fff","data":{"x":1,"y":2},"timestamp":1}"##;
        let json = format!("[{point},{point}]");
        let err = from_json(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_import_accepts_empty_array() {
        assert!(from_json("[]").unwrap().is_empty());
    }

    #[test]
    fn test_file_round_trip_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let annotations = sample();

        for name in ["annotations.json", "annotations.yaml"] {
            let path = dir.path().join(name);
            export_to_file(&annotations, &path).unwrap();
            let loaded = import_from_file(&path).unwrap();
            assert_eq!(loaded, annotations);
        }

        assert!(export_to_file(&annotations, &dir.path().join("out.txt")).is_err());
    }
}
