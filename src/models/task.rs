// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media handed to an editing session by the task provider.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of media being annotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    Image,
    Video,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "mkv", "avi", "m4v"];

impl MediaType {
    /// Guess the media type from a path or URL extension.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let extension = Path::new(path)
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match extension {
            Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => Self::Video,
            _ => Self::Image,
        }
    }
}

/// The media for one editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMedia {
    pub media_url: String,
    pub media_type: MediaType,
}

impl TaskMedia {
    pub fn new(media_url: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            media_url: media_url.into(),
            media_type,
        }
    }

    /// Build a task for a local path, inferring the media type.
    pub fn from_path(path: impl Into<String>) -> Self {
        let media_url = path.into();
        let media_type = MediaType::from_path(&media_url);
        Self {
            media_url,
            media_type,
        }
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaType::Video
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(MediaType::from_path("clip.MP4"), MediaType::Video);
        assert_eq!(MediaType::from_path("/data/frame.png"), MediaType::Image);
        assert_eq!(MediaType::from_path("no_extension"), MediaType::Image);
        assert!(TaskMedia::from_path("a.webm").is_video());
    }

    #[test]
    fn test_media_type_ignores_query_and_fragment() {
        assert_eq!(MediaType::from_path("https://cdn.example/clip.mp4?t=1"), MediaType::Video);
        assert_eq!(MediaType::from_path("clip.mov#t=10"), MediaType::Video);
        assert_eq!(MediaType::from_path("frame.png?v=2#top"), MediaType::Image);
    }
}
