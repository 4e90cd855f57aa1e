// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Domain errors for annotation editing.
//!
//! Storage, media and configuration plumbing report failures through
//! `anyhow`; the variants here are the ones the canvas catches and turns
//! into a notice for the user.

/// Errors raised by annotation store operations and import parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationError {
    /// A candidate annotation or patch failed validation.
    #[error("invalid annotation: {0}")]
    Validation(String),
    /// Imported or persisted JSON could not be parsed.
    #[error("failed to parse annotations: {0}")]
    Parse(String),
    /// No annotation with the given id exists in the working list.
    #[error("annotation not found: {0}")]
    NotFound(String),
    /// An annotation with the given id already exists.
    #[error("duplicate annotation id: {0}")]
    DuplicateId(String),
}

impl From<serde_json::Error> for AnnotationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
