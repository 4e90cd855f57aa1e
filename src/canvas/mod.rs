// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas controller.
//!
//! Turns pointer, wheel and keyboard input into annotation store calls and
//! owns everything transient about the drawing surface: viewport, active
//! tool, drawing label and colour, lock and help flags, video playback
//! state and the in-progress gesture. The controller never edits the
//! annotation list itself; it reads the store's working list and calls
//! store operations. Nothing here depends on a UI toolkit.

pub mod input;
pub mod render;
pub mod viewport;

use crate::error::AnnotationError;
use crate::models::annotation::{
    Annotation, AnnotationPatch, Geometry, Line, Point, Polygon, TextMark,
};
use crate::models::task::TaskMedia;
use crate::store::AnnotationStore;
use crate::util::geometry;
use input::{Gesture, Key, KeyPress, Tool};
use render::{DrawCommand, Preview, PreviewShape, Rgba};
use viewport::Viewport;

/// Minimum extent (media units) a drawn shape must exceed to be kept.
pub const DEFAULT_MIN_SHAPE_SIZE: f64 = 5.0;

/// Consecutive polygon clicks closer than this (media units) are one vertex.
const DUPLICATE_VERTEX_DISTANCE: f64 = 0.5;

/// Construction-time settings for a [`CanvasController`].
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSettings {
    pub min_shape_size: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    pub default_label: String,
    pub default_color: String,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            min_shape_size: DEFAULT_MIN_SHAPE_SIZE,
            min_zoom: viewport::DEFAULT_MIN_ZOOM,
            max_zoom: viewport::DEFAULT_MAX_ZOOM,
            zoom_step: viewport::DEFAULT_ZOOM_STEP,
            default_label: "object".to_string(),
            default_color: "#7c3aed".to_string(),
        }
    }
}

/// Playback flags for video media.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoState {
    pub playing: bool,
    pub muted: bool,
}

/// A message for the user about the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Drawing surface state and input handling for one editing session.
#[derive(Debug)]
pub struct CanvasController {
    store: AnnotationStore,
    media: TaskMedia,
    viewport: Viewport,
    tool: Tool,
    label: String,
    color: String,
    locked: bool,
    show_help: bool,
    video: VideoState,
    gesture: Gesture,
    min_shape_size: f64,
    notice: Option<Notice>,
}

impl CanvasController {
    /// Bind a store to the media of an editing session.
    pub fn new(store: AnnotationStore, media: TaskMedia, settings: CanvasSettings) -> Self {
        Self {
            store,
            media,
            viewport: Viewport::new(settings.min_zoom, settings.max_zoom, settings.zoom_step),
            tool: Tool::default(),
            label: settings.default_label,
            color: settings.default_color,
            locked: false,
            show_help: false,
            video: VideoState::default(),
            gesture: Gesture::Idle,
            min_shape_size: settings.min_shape_size,
            notice: None,
        }
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    /// Register a store listener; see [`AnnotationStore::subscribe`].
    pub fn subscribe<F>(&mut self, listener: F) -> crate::store::SubscriptionId
    where
        F: FnMut(&[Annotation], crate::store::HistoryStatus) + 'static,
    {
        self.store.subscribe(listener)
    }

    pub fn media(&self) -> &TaskMedia {
        &self.media
    }

    /// Switch to new media; annotations are kept.
    pub fn set_media(&mut self, media: TaskMedia) {
        log::info!("Switching media to {}", media.media_url);
        self.media = media;
        self.video = VideoState::default();
        self.gesture = Gesture::Idle;
        self.viewport.reset();
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.color = color.into();
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn video(&self) -> VideoState {
        self.video
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn report(&mut self, action: &str, err: AnnotationError) {
        log::warn!("{} failed: {}", action, err);
        self.notice = Some(Notice::Error(format!("{action} failed: {err}")));
    }

    fn inform(&mut self, message: String) {
        log::info!("{}", message);
        self.notice = Some(Notice::Info(message));
    }

    // --- Modes ---

    /// Select a drawing tool; ignored while locked.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if self.locked {
            log::debug!("Tool change to {:?} suppressed while locked", tool);
            return false;
        }
        if tool != self.tool {
            self.gesture = Gesture::Idle;
            self.tool = tool;
            log::debug!("Selected tool {:?}", tool);
        }
        true
    }

    /// Lock or unlock editing. Locking abandons any in-progress gesture.
    pub fn set_locked(&mut self, locked: bool) {
        if locked {
            self.gesture = Gesture::Idle;
        }
        self.locked = locked;
        log::info!("Editing {}", if locked { "locked" } else { "unlocked" });
    }

    pub fn toggle_lock(&mut self) {
        self.set_locked(!self.locked);
    }

    pub fn set_help(&mut self, show: bool) {
        self.show_help = show;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Toggle play/pause; only meaningful for video media.
    pub fn toggle_playback(&mut self) -> bool {
        if !self.media.is_video() {
            return false;
        }
        self.video.playing = !self.video.playing;
        log::debug!("Video {}", if self.video.playing { "playing" } else { "paused" });
        true
    }

    pub fn toggle_mute(&mut self) -> bool {
        if !self.media.is_video() {
            return false;
        }
        self.video.muted = !self.video.muted;
        true
    }

    // --- Viewport ---

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// Wheel scrolling: negative `delta_y` (scroll up) zooms in.
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y < 0.0 {
            self.zoom_in();
        } else if delta_y > 0.0 {
            self.zoom_out();
        }
    }

    // --- Pointer gestures (screen coordinates in, media coordinates stored) ---

    pub fn pointer_down(&mut self, screen: Point) {
        if self.locked {
            return;
        }
        let media = self.viewport.screen_to_media(screen);

        match self.tool {
            Tool::BBox | Tool::Line => {
                self.gesture = Gesture::Dragging {
                    tool: self.tool,
                    start: media,
                    current: media,
                };
            }
            Tool::Point => {
                self.commit(Geometry::Point(media));
            }
            Tool::Text => {
                if self.label.trim().is_empty() {
                    log::debug!("Discarded text mark with empty label");
                    return;
                }
                self.commit(Geometry::Text(TextMark {
                    x: media.x,
                    y: media.y,
                    text: self.label.clone(),
                }));
            }
            Tool::Polygon => self.add_polygon_vertex(media),
        }
    }

    pub fn pointer_move(&mut self, screen: Point) {
        let media = self.viewport.screen_to_media(screen);
        match &mut self.gesture {
            Gesture::Dragging { current, .. } => *current = media,
            Gesture::Polygon { hover, .. } => *hover = Some(media),
            Gesture::Idle => {}
        }
    }

    pub fn pointer_up(&mut self, screen: Point) {
        let Gesture::Dragging { tool, start, .. } = self.gesture else {
            return;
        };
        self.gesture = Gesture::Idle;
        let end = self.viewport.screen_to_media(screen);
        let min = self.min_shape_size;

        match tool {
            Tool::BBox => {
                let rect = geometry::rect_from_corners(start, end);
                if rect.width > min && rect.height > min {
                    self.commit(Geometry::BBox(rect));
                } else {
                    log::debug!(
                        "Discarded {:.1}x{:.1} box below minimum size {}",
                        rect.width,
                        rect.height,
                        min
                    );
                }
            }
            Tool::Line => {
                if start.distance_to(&end) > min {
                    self.commit(Geometry::Line(Line { start, end }));
                } else {
                    log::debug!("Discarded line shorter than {}", min);
                }
            }
            _ => {}
        }
    }

    /// Double click closes an open polygon.
    pub fn double_click(&mut self, screen: Point) {
        if self.locked || self.tool != Tool::Polygon {
            return;
        }
        let media = self.viewport.screen_to_media(screen);
        self.add_polygon_vertex(media);
        self.finish_polygon();
    }

    fn add_polygon_vertex(&mut self, media: Point) {
        match &mut self.gesture {
            Gesture::Polygon { vertices, hover } => {
                let duplicate = vertices
                    .last()
                    .map_or(false, |last| last.distance_to(&media) < DUPLICATE_VERTEX_DISTANCE);
                if !duplicate {
                    vertices.push(media);
                }
                *hover = Some(media);
            }
            _ => {
                self.gesture = Gesture::Polygon {
                    vertices: vec![media],
                    hover: Some(media),
                };
            }
        }
    }

    /// Close the open polygon, committing it if it is large enough.
    pub fn finish_polygon(&mut self) {
        if !matches!(self.gesture, Gesture::Polygon { .. }) {
            return;
        }
        let Gesture::Polygon { vertices, .. } = std::mem::take(&mut self.gesture) else {
            return;
        };
        let min_area = self.min_shape_size * self.min_shape_size;
        if vertices.len() < 3 || geometry::polygon_area(&vertices) <= min_area {
            log::debug!("Discarded polygon with {} vertices below minimum size", vertices.len());
            return;
        }
        self.commit(Geometry::Polygon(Polygon { points: vertices }));
    }

    /// Abandon the in-progress gesture.
    pub fn cancel_gesture(&mut self) {
        self.gesture = Gesture::Idle;
    }

    fn commit(&mut self, geometry: Geometry) {
        let annotation = Annotation::new(self.label.clone(), self.color.clone(), geometry);
        let kind = annotation.kind();
        match self.store.add(annotation) {
            Ok(()) => log::info!(
                "Added {} annotation, total: {}",
                kind.as_str(),
                self.store.annotations().len()
            ),
            Err(e) => self.report("Add annotation", e),
        }
    }

    // --- Store operations ---

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    /// Remove every annotation; ignored while locked.
    pub fn clear(&mut self) -> bool {
        if self.locked {
            log::debug!("Clear suppressed while locked");
            return false;
        }
        self.gesture = Gesture::Idle;
        self.store.clear();
        log::info!("Cleared all annotations");
        true
    }

    /// Delete one annotation; ignored while locked.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.locked {
            return false;
        }
        match self.store.remove(id) {
            Ok(removed) => {
                log::info!(
                    "Deleted annotation {}, total: {}",
                    removed.id(),
                    self.store.annotations().len()
                );
                true
            }
            Err(e) => {
                self.report("Delete annotation", e);
                false
            }
        }
    }

    /// Edit one annotation; ignored while locked.
    pub fn update(&mut self, id: &str, patch: AnnotationPatch) -> bool {
        if self.locked {
            return false;
        }
        match self.store.update(id, patch) {
            Ok(()) => true,
            Err(e) => {
                self.report("Update annotation", e);
                false
            }
        }
    }

    /// Serialize the working list; failures become a notice.
    pub fn export(&mut self) -> Option<String> {
        match self.store.export_annotations() {
            Ok(json) => Some(json),
            Err(e) => {
                self.report("Export", e);
                None
            }
        }
    }

    /// Replace all annotations with parsed `json`. Malformed input leaves
    /// the store untouched and becomes a notice. Ignored while locked.
    pub fn import(&mut self, json: &str) -> bool {
        if self.locked {
            log::debug!("Import suppressed while locked");
            return false;
        }
        match self.store.import_annotations(json) {
            Ok(count) => {
                self.gesture = Gesture::Idle;
                self.inform(format!("Imported {count} annotations"));
                true
            }
            Err(e) => {
                self.report("Import", e);
                false
            }
        }
    }

    /// Replace all annotations with an already-parsed list.
    pub fn import_parsed(&mut self, annotations: Vec<Annotation>) -> bool {
        if self.locked {
            return false;
        }
        self.gesture = Gesture::Idle;
        let count = self.store.replace_all(annotations);
        self.inform(format!("Imported {count} annotations"));
        true
    }

    /// Surface an error from outside the controller (file dialogs, I/O).
    pub fn report_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.notice = Some(Notice::Error(message));
    }

    // --- Keyboard ---

    /// Dispatch a key press; returns whether it was consumed.
    pub fn handle_key(&mut self, press: KeyPress) -> bool {
        let modifiers = press.modifiers;
        if modifiers.command() {
            return match press.key {
                Key::Char(c) if c.eq_ignore_ascii_case(&'z') && modifiers.shift => self.redo(),
                Key::Char(c) if c.eq_ignore_ascii_case(&'z') => self.undo(),
                Key::Char(c) if c.eq_ignore_ascii_case(&'y') => self.redo(),
                _ => false,
            };
        }

        match press.key {
            Key::Char('?') => {
                self.toggle_help();
                true
            }
            Key::Char('+') | Key::Char('=') => {
                self.zoom_in();
                true
            }
            Key::Char('-') => {
                self.zoom_out();
                true
            }
            Key::Space => self.toggle_playback(),
            Key::Escape => {
                if self.gesture != Gesture::Idle {
                    self.cancel_gesture();
                } else {
                    self.show_help = false;
                }
                true
            }
            Key::Enter => {
                self.finish_polygon();
                true
            }
            _ if self.locked => false,
            Key::Delete => self.clear(),
            Key::Char(c) => match Tool::from_shortcut(c) {
                Some(tool) => self.set_tool(tool),
                None => false,
            },
        }
    }

    // --- Rendering ---

    /// Preview of the in-progress gesture, if any.
    pub fn preview(&self) -> Option<Preview> {
        let color = Rgba::parse_or_default(&self.color);
        let shape = match &self.gesture {
            Gesture::Idle => return None,
            Gesture::Dragging {
                tool: Tool::Line,
                start,
                current,
            } => PreviewShape::Segment(Line {
                start: *start,
                end: *current,
            }),
            Gesture::Dragging { start, current, .. } => {
                PreviewShape::Rect(geometry::rect_from_corners(*start, *current))
            }
            Gesture::Polygon { vertices, hover } => {
                let mut points = vertices.clone();
                points.extend(*hover);
                PreviewShape::OpenPolygon(points)
            }
        };
        Some(Preview { shape, color })
    }

    /// Full shape layer for the current snapshot and viewport.
    pub fn render(&self) -> Vec<DrawCommand> {
        render::render(self.store.annotations(), &self.viewport, self.preview().as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{AnnotationKind, BoundingBox};
    use crate::models::task::MediaType;
    use input::Modifiers;

    fn controller(media_type: MediaType) -> CanvasController {
        CanvasController::new(
            AnnotationStore::new(),
            TaskMedia::new("media", media_type),
            CanvasSettings::default(),
        )
    }

    fn drag(c: &mut CanvasController, from: (f64, f64), to: (f64, f64)) {
        c.pointer_down(Point::new(from.0, from.1));
        c.pointer_move(Point::new((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0));
        c.pointer_up(Point::new(to.0, to.1));
    }

    fn plain(key: Key) -> KeyPress {
        KeyPress::new(key, Modifiers::NONE)
    }

    fn ctrl(c: char) -> KeyPress {
        KeyPress::new(
            Key::Char(c),
            Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            },
        )
    }

    #[test]
    fn test_drag_commits_bbox() {
        let mut c = controller(MediaType::Image);
        drag(&mut c, (40.0, 60.0), (10.0, 20.0));

        let anns = c.store().annotations();
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].label(), "object");
        assert_eq!(anns[0].color(), "#7c3aed");
        assert_eq!(
            anns[0].geometry(),
            &Geometry::BBox(BoundingBox::new(10.0, 20.0, 30.0, 40.0))
        );
        assert_eq!(c.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_small_drag_is_discarded() {
        let mut c = controller(MediaType::Image);
        drag(&mut c, (0.0, 0.0), (4.0, 100.0));
        drag(&mut c, (0.0, 0.0), (100.0, 5.0));
        drag(&mut c, (0.0, 0.0), (0.0, 0.0));

        assert!(c.store().annotations().is_empty());
        assert_eq!(c.store().history().len(), 1);
    }

    #[test]
    fn test_minimum_size_is_in_media_units() {
        let mut c = controller(MediaType::Image);
        c.set_zoom(2.0);
        // 8 screen px is 4 media px at zoom 2
        drag(&mut c, (0.0, 0.0), (8.0, 8.0));
        assert!(c.store().annotations().is_empty());

        drag(&mut c, (0.0, 0.0), (20.0, 20.0));
        assert_eq!(
            c.store().annotations()[0].geometry(),
            &Geometry::BBox(BoundingBox::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn test_geometry_unchanged_by_viewport() {
        let mut c = controller(MediaType::Image);
        drag(&mut c, (10.0, 10.0), (60.0, 40.0));
        let stored = c.store().annotations()[0].geometry().clone();

        c.set_zoom(2.0);
        c.pan_by(50.0, 50.0);
        assert_eq!(c.store().annotations()[0].geometry(), &stored);

        // Screen position is re-derived at render time
        match &c.render()[0] {
            DrawCommand::Rect { min, .. } => assert_eq!(*min, Point::new(70.0, 70.0)),
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn test_screen_to_media_on_pointer_down() {
        let mut c = controller(MediaType::Image);
        c.set_tool(Tool::Point);
        c.set_zoom(2.0);
        c.pan_by(50.0, 50.0);
        c.pointer_down(Point::new(150.0, 250.0));

        assert_eq!(
            c.store().annotations()[0].geometry(),
            &Geometry::Point(Point::new(50.0, 100.0))
        );
    }

    #[test]
    fn test_line_and_text_tools() {
        let mut c = controller(MediaType::Image);
        c.set_tool(Tool::Line);
        drag(&mut c, (0.0, 0.0), (3.0, 3.0));
        assert!(c.store().annotations().is_empty());
        drag(&mut c, (0.0, 0.0), (30.0, 40.0));
        assert_eq!(c.store().annotations()[0].kind(), AnnotationKind::Line);

        c.set_tool(Tool::Text);
        c.set_label("  ");
        c.pointer_down(Point::new(5.0, 5.0));
        assert_eq!(c.store().annotations().len(), 1);

        c.set_label("hello");
        c.pointer_down(Point::new(5.0, 5.0));
        let text = &c.store().annotations()[1];
        assert_eq!(
            text.geometry(),
            &Geometry::Text(TextMark {
                x: 5.0,
                y: 5.0,
                text: "hello".to_string()
            })
        );
    }

    #[test]
    fn test_polygon_tool() {
        let mut c = controller(MediaType::Image);
        c.set_tool(Tool::Polygon);
        c.pointer_down(Point::new(0.0, 0.0));
        c.pointer_down(Point::new(0.0, 0.0));
        c.pointer_down(Point::new(50.0, 0.0));
        c.pointer_move(Point::new(25.0, 25.0));

        match c.preview().map(|p| p.shape) {
            Some(PreviewShape::OpenPolygon(points)) => assert_eq!(points.len(), 3),
            other => panic!("expected open polygon, got {other:?}"),
        }

        // Two vertices cannot close
        assert!(c.handle_key(plain(Key::Enter)));
        assert!(c.store().annotations().is_empty());

        c.pointer_down(Point::new(0.0, 0.0));
        c.pointer_down(Point::new(50.0, 0.0));
        c.double_click(Point::new(50.0, 50.0));

        let anns = c.store().annotations();
        assert_eq!(anns.len(), 1);
        match anns[0].geometry() {
            Geometry::Polygon(p) => assert_eq!(p.points.len(), 3),
            other => panic!("expected polygon, got {other:?}"),
        }
        assert_eq!(c.gesture(), &Gesture::Idle);
    }

    #[test]
    fn test_escape_cancels_polygon() {
        let mut c = controller(MediaType::Image);
        c.set_tool(Tool::Polygon);
        c.pointer_down(Point::new(0.0, 0.0));
        c.pointer_down(Point::new(50.0, 0.0));
        c.handle_key(plain(Key::Escape));
        c.pointer_down(Point::new(50.0, 50.0));
        c.finish_polygon();
        assert!(c.store().annotations().is_empty());
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut c = controller(MediaType::Image);
        for (key, tool) in [('p', Tool::Polygon), ('o', Tool::Point), ('l', Tool::Line), ('t', Tool::Text), ('b', Tool::BBox)] {
            assert!(c.handle_key(plain(Key::Char(key))));
            assert_eq!(c.tool(), tool);
        }

        drag(&mut c, (0.0, 0.0), (20.0, 20.0));
        drag(&mut c, (0.0, 0.0), (30.0, 30.0));

        assert!(c.handle_key(ctrl('z')));
        assert_eq!(c.store().annotations().len(), 1);
        assert!(c.handle_key(ctrl('y')));
        assert_eq!(c.store().annotations().len(), 2);
        c.handle_key(ctrl('z'));
        let redo = KeyPress::new(
            Key::Char('Z'),
            Modifiers {
                ctrl: true,
                shift: true,
                meta: false,
            },
        );
        assert!(c.handle_key(redo));
        assert_eq!(c.store().annotations().len(), 2);

        // Ctrl+B is not a tool shortcut
        c.set_tool(Tool::Point);
        assert!(!c.handle_key(ctrl('b')));
        assert_eq!(c.tool(), Tool::Point);

        c.handle_key(plain(Key::Char('?')));
        assert!(c.show_help());
        c.handle_key(plain(Key::Char('+')));
        assert!((c.viewport().zoom() - 1.1).abs() < 1e-9);
        c.handle_key(plain(Key::Char('-')));
        c.handle_key(plain(Key::Char('-')));
        assert!((c.viewport().zoom() - 0.9).abs() < 1e-9);

        assert!(c.handle_key(plain(Key::Delete)));
        assert!(c.store().annotations().is_empty());
        assert!(!c.store().can_undo());
    }

    #[test]
    fn test_lock_blocks_editing_but_not_navigation() {
        let mut c = controller(MediaType::Image);
        drag(&mut c, (0.0, 0.0), (20.0, 20.0));
        let id = c.store().annotations()[0].id().to_string();
        c.toggle_lock();

        drag(&mut c, (0.0, 0.0), (40.0, 40.0));
        assert_eq!(c.store().annotations().len(), 1);

        assert!(!c.handle_key(plain(Key::Char('p'))));
        assert_eq!(c.tool(), Tool::BBox);
        assert!(!c.handle_key(plain(Key::Delete)));
        assert!(!c.remove(&id));
        assert!(!c.import("[]"));
        assert_eq!(c.store().annotations().len(), 1);

        assert!(c.handle_key(plain(Key::Char('+'))));
        assert!(c.handle_key(plain(Key::Char('?'))));
        assert!(c.handle_key(ctrl('z')));
        assert!(c.store().annotations().is_empty());
        assert!(c.handle_key(ctrl('y')));
        assert_eq!(c.store().annotations().len(), 1);

        c.toggle_lock();
        assert!(c.remove(&id));
    }

    #[test]
    fn test_space_toggles_video_only() {
        let mut image = controller(MediaType::Image);
        assert!(!image.handle_key(plain(Key::Space)));
        assert!(!image.video().playing);

        let mut video = controller(MediaType::Video);
        assert!(video.handle_key(plain(Key::Space)));
        assert!(video.video().playing);
        video.set_locked(true);
        assert!(video.handle_key(plain(Key::Space)));
        assert!(!video.video().playing);
        assert!(video.toggle_mute());
        assert!(video.video().muted);
    }

    #[test]
    fn test_wheel_zoom() {
        let mut c = controller(MediaType::Image);
        c.wheel(-120.0);
        assert!((c.viewport().zoom() - 1.1).abs() < 1e-9);
        c.wheel(120.0);
        c.wheel(0.0);
        assert!((c.viewport().zoom() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_import_failure_is_reported_and_harmless() {
        let mut c = controller(MediaType::Image);
        drag(&mut c, (0.0, 0.0), (20.0, 20.0));
        let before = c.store().annotations().to_vec();

        assert!(!c.import("{ not json"));
        assert_eq!(c.store().annotations(), before.as_slice());
        assert!(matches!(c.notice(), Some(Notice::Error(_))));

        let exported = c.export().unwrap();
        assert!(c.import(&exported));
        assert_eq!(c.store().annotations(), before.as_slice());
        assert!(!c.store().can_undo());
        assert_eq!(c.notice(), Some(&Notice::Info("Imported 1 annotations".to_string())));
    }

    #[test]
    fn test_fractional_coordinates_survive_export_import() {
        let mut c = controller(MediaType::Image);
        c.set_zoom(1.3);
        c.pan_by(17.3, 9.7);
        for i in 0..50 {
            let offset = i as f64 * 3.7;
            drag(&mut c, (offset, offset * 0.9), (offset + 41.3, offset + 57.9));
        }
        assert_eq!(c.store().annotations().len(), 50);
        let before = c.store().annotations().to_vec();

        let exported = c.export().unwrap();
        assert!(c.import(&exported));
        assert_eq!(c.store().annotations(), before.as_slice());
    }

    #[test]
    fn test_update_restyles_annotation() {
        let mut c = controller(MediaType::Image);
        drag(&mut c, (0.0, 0.0), (30.0, 30.0));
        let id = c.store().annotations()[0].id().to_string();

        assert!(c.update(&id, AnnotationPatch::default().label("car").color("#00ff00")));
        let ann = c.store().get(&id).unwrap();
        assert_eq!((ann.label(), ann.color()), ("car", "#00ff00"));
        assert_eq!(c.store().history().len(), 3);

        c.set_locked(true);
        assert!(!c.update(&id, AnnotationPatch::default().label("bus")));
        c.set_locked(false);
        assert!(!c.update("ghost", AnnotationPatch::default().label("bus")));
        assert!(matches!(c.notice(), Some(Notice::Error(_))));
        assert_eq!(c.store().get(&id).unwrap().label(), "car");
    }

    #[test]
    fn test_remove_missing_sets_notice() {
        let mut c = controller(MediaType::Image);
        assert!(!c.remove("ghost"));
        assert!(matches!(c.notice(), Some(Notice::Error(_))));
        c.dismiss_notice();
        assert!(c.notice().is_none());
    }

    #[test]
    fn test_drag_preview() {
        let mut c = controller(MediaType::Image);
        assert!(c.preview().is_none());
        c.pointer_down(Point::new(10.0, 10.0));
        c.pointer_move(Point::new(30.0, 50.0));

        assert_eq!(
            c.preview().map(|p| p.shape),
            Some(PreviewShape::Rect(BoundingBox::new(10.0, 10.0, 20.0, 40.0)))
        );
        assert_eq!(c.render().len(), 1);
    }

    #[test]
    fn test_set_media_keeps_annotations() {
        let mut c = controller(MediaType::Video);
        drag(&mut c, (0.0, 0.0), (50.0, 50.0));
        c.toggle_playback();
        c.set_zoom(2.0);

        c.set_media(TaskMedia::from_path("next.png"));
        assert!(!c.media().is_video());
        assert_eq!(c.video(), VideoState::default());
        assert_eq!(c.viewport().zoom(), 1.0);
        assert_eq!(c.store().annotations().len(), 1);
    }
}
