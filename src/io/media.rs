// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading.
//!
//! Images are decoded into RGBA pixels suitable for an egui texture. Video
//! files are not decoded; the canvas shows a placeholder surface sized by
//! [`DEFAULT_VIDEO_SIZE`] and only tracks playback state.

use anyhow::{Context, Result};
use std::path::Path;

/// Surface size used when the media is a video.
pub const DEFAULT_VIDEO_SIZE: (u32, u32) = (1280, 720);

/// A decoded image ready for upload.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode an image file into RGBA8 pixels.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path)
        .with_context(|| format!("failed to decode image {}", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: img.into_raw(),
    })
}
