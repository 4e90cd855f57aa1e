// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zoom and pan of the drawing surface.
//!
//! `pan` is in screen pixels relative to the canvas origin; `zoom` is a
//! scale factor clamped to `[min_zoom, max_zoom]`.

use crate::models::annotation::Point;

pub const DEFAULT_MIN_ZOOM: f64 = 0.5;
pub const DEFAULT_MAX_ZOOM: f64 = 3.0;
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;

/// Transient viewport transform owned by the canvas controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Point,
    min_zoom: f64,
    max_zoom: f64,
    step: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM, DEFAULT_ZOOM_STEP)
    }
}

impl Viewport {
    /// Create a viewport at zoom 1 and no pan with the given zoom bounds.
    pub fn new(min_zoom: f64, max_zoom: f64, step: f64) -> Self {
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            (max_zoom, min_zoom)
        };
        Self {
            zoom: 1.0_f64.clamp(min_zoom, max_zoom),
            pan: Point::new(0.0, 0.0),
            min_zoom,
            max_zoom,
            step,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.step);
    }

    /// Shift the pan offset by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = Point::new(self.pan.x + dx, self.pan.y + dy);
    }

    /// Back to zoom 1 (clamped) and no pan.
    pub fn reset(&mut self) {
        self.set_zoom(1.0);
        self.pan = Point::new(0.0, 0.0);
    }

    /// `media = (screen - pan) / zoom`
    pub fn screen_to_media(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    /// `screen = media * zoom + pan`
    pub fn media_to_screen(&self, media: Point) -> Point {
        Point::new(
            media.x * self.zoom + self.pan.x,
            media.y * self.zoom + self.pan.y,
        )
    }

    /// Scale a media-space length to screen pixels.
    pub fn media_len_to_screen(&self, len: f64) -> f64 {
        len * self.zoom
    }
}
