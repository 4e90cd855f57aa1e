// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the application structure that implements the
//! eframe::App trait. It owns the canvas controller (and through it the
//! annotation store), persists the store whenever it changes, loads media
//! in the background and routes keyboard input and file dialogs.

use crate::canvas::input::{Key, KeyPress, Modifiers};
use crate::canvas::CanvasController;
use crate::config::AppConfig;
use crate::io::media::{self, LoadedImage};
use crate::io::serialization;
use crate::models::task::TaskMedia;
use crate::store::storage::{FileStorage, MemoryStorage, StorageBackend, STORE_SLOT};
use crate::store::AnnotationStore;
use crate::ui::{canvas, help, properties, timeline, toolbar};
use anyhow::Context;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver};

/// Main application state.
pub struct AnnotatorApp {
    /// Drawing surface state; owns the annotation store
    controller: CanvasController,

    /// Where the store is persisted
    storage: Box<dyn StorageBackend>,

    /// Set by the store subscription whenever state changes
    dirty: Rc<Cell<bool>>,

    /// Loaded image texture for display
    media_texture: Option<egui::TextureHandle>,

    /// Media dimensions (width, height)
    media_size: Option<(u32, u32)>,

    /// Receiver for background image loading
    media_loader: Option<Receiver<Result<LoadedImage, String>>>,

    /// Loading state message
    loading_message: Option<String>,
}

impl AnnotatorApp {
    /// Create the application, rehydrating the store unless `fresh`.
    pub fn new(config: &AppConfig, media: Option<TaskMedia>, fresh: bool) -> Self {
        let mut storage: Box<dyn StorageBackend> = if config.persist {
            Box::new(FileStorage::new(config.storage_dir.clone()))
        } else {
            Box::new(MemoryStorage::new())
        };

        if fresh {
            if let Err(e) = storage.remove(STORE_SLOT) {
                log::warn!("Failed to discard persisted state: {:#}", e);
            }
        }
        let store = AnnotationStore::load(&*storage).with_history_limit(config.history_limit);

        let has_media = media.is_some();
        let media = media.unwrap_or_else(|| TaskMedia::from_path(""));
        let mut controller = CanvasController::new(store, media, config.canvas_settings());

        let dirty = Rc::new(Cell::new(false));
        let flag = Rc::clone(&dirty);
        controller.subscribe(move |_, _| flag.set(true));

        let mut app = Self {
            controller,
            storage,
            dirty,
            media_texture: None,
            media_size: None,
            media_loader: None,
            loading_message: None,
        };
        if has_media {
            app.load_media();
        }
        app
    }

    /// Start loading the controller's media (asynchronously for images).
    fn load_media(&mut self) {
        self.media_texture = None;
        self.media_size = None;

        let media = self.controller.media().clone();
        if media.is_video() {
            log::info!("Opened video {}", media.media_url);
            self.media_size = Some(media::DEFAULT_VIDEO_SIZE);
            return;
        }

        let (sender, receiver) = channel();
        self.media_loader = Some(receiver);
        self.loading_message = Some("Loading image...".to_string());

        // Spawn background thread for loading
        let path = PathBuf::from(&media.media_url);
        std::thread::spawn(move || {
            let result = media::load_image(&path).map_err(|e| format!("{:#}", e));
            if let Ok(ref img) = result {
                log::info!("Loaded image: {} ({}x{})", path.display(), img.width, img.height);
            }
            let _ = sender.send(result);
        });
    }

    fn open_media_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Media", &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp", "mp4", "webm", "mov", "mkv", "avi"])
            .pick_file()
        {
            let media = TaskMedia::from_path(path.to_string_lossy().to_string());
            self.controller.set_media(media);
            self.load_media();
        }
    }

    /// Export annotations to a file chosen by the user.
    fn export_annotations(&mut self, extension: &str) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter(extension.to_uppercase(), &[extension])
            .set_file_name(format!("annotations.{extension}"))
            .save_file()
        else {
            return;
        };

        let result = if extension == "json" {
            let Some(json) = self.controller.export() else {
                return;
            };
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))
        } else {
            serialization::export_to_file(self.controller.store().annotations(), &path)
        };
        match result {
            Ok(()) => log::info!("Exported annotations to {}", path.display()),
            Err(e) => self
                .controller
                .report_error(format!("Failed to export annotations: {:#}", e)),
        }
    }

    /// Import annotations from a file chosen by the user.
    fn import_annotations(&mut self) {
        if self.controller.is_locked() {
            self.controller.report_error("Unlock editing to import annotations");
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Annotations", &["json", "yaml", "yml"])
            .pick_file()
        else {
            return;
        };

        let is_json = path
            .extension()
            .and_then(|s| s.to_str())
            .map_or(true, |ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            match std::fs::read_to_string(&path) {
                Ok(json) => {
                    self.controller.import(&json);
                }
                Err(e) => self
                    .controller
                    .report_error(format!("Failed to read {}: {}", path.display(), e)),
            }
            return;
        }

        match serialization::import_from_file(&path) {
            Ok(annotations) => {
                self.controller.import_parsed(annotations);
            }
            Err(e) => self
                .controller
                .report_error(format!("Failed to import {}: {:#}", path.display(), e)),
        }
    }

    fn poll_media_loader(&mut self, ctx: &egui::Context) {
        let Some(ref receiver) = self.media_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.media_loader = None;
        self.loading_message = None;

        match result {
            Ok(loaded) => {
                let size = [loaded.width as usize, loaded.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
                let texture = ctx.load_texture("media", color_image, egui::TextureOptions::LINEAR);
                self.media_texture = Some(texture);
                self.media_size = Some((loaded.width, loaded.height));
                self.controller.reset_view();
            }
            Err(e) => {
                self.controller
                    .report_error(format!("Failed to load image: {}", e));
            }
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let events = ctx.input(|i| i.events.clone());
        for event in events {
            if let egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } = event
            {
                if let Some(key) = map_key(key, modifiers) {
                    self.controller.handle_key(KeyPress::new(key, map_modifiers(modifiers)));
                }
            }
        }
    }

    fn persist_if_dirty(&mut self) {
        if !self.dirty.replace(false) {
            return;
        }
        if let Err(e) = self.controller.store().save(&mut *self.storage) {
            log::error!("Failed to persist annotations: {:#}", e);
        }
    }
}

fn map_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<Key> {
    match key {
        egui::Key::Delete => Some(Key::Delete),
        egui::Key::Escape => Some(Key::Escape),
        egui::Key::Enter => Some(Key::Enter),
        egui::Key::Space => Some(Key::Space),
        egui::Key::Minus => Some(Key::Char('-')),
        egui::Key::Plus => Some(Key::Char('+')),
        egui::Key::Equals => Some(Key::Char('=')),
        egui::Key::Questionmark => Some(Key::Char('?')),
        egui::Key::Slash if modifiers.shift => Some(Key::Char('?')),
        other => {
            let mut chars = other.name().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Key::Char(c.to_ascii_lowercase())),
                _ => None,
            }
        }
    }
}

fn map_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        ctrl: modifiers.ctrl,
        shift: modifiers.shift,
        meta: modifiers.mac_cmd,
    }
}

impl eframe::App for AnnotatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_media_loader(ctx);

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Media...").clicked() {
                        ui.close_menu();
                        self.open_media_dialog();
                    }
                    if ui.button("Import Annotations...").clicked() {
                        ui.close_menu();
                        self.import_annotations();
                    }
                    ui.menu_button("Export Annotations", |ui| {
                        if ui.button("Export as JSON...").clicked() {
                            ui.close_menu();
                            self.export_annotations("json");
                        }
                        if ui.button("Export as YAML...").clicked() {
                            ui.close_menu();
                            self.export_annotations("yaml");
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let store = self.controller.store();
                    let (can_undo, can_redo) = (store.can_undo(), store.can_redo());
                    if ui.add_enabled(can_undo, egui::Button::new("Undo (Ctrl+Z)")).clicked() {
                        self.controller.undo();
                        ui.close_menu();
                    }
                    if ui.add_enabled(can_redo, egui::Button::new("Redo (Ctrl+Y)")).clicked() {
                        self.controller.redo();
                        ui.close_menu();
                    }
                    ui.separator();
                    let editable = !self.controller.is_locked();
                    if ui.add_enabled(editable, egui::Button::new("Clear All (Delete)")).clicked() {
                        self.controller.clear();
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Zoom In").clicked() {
                        self.controller.zoom_in();
                        ui.close_menu();
                    }
                    if ui.button("Zoom Out").clicked() {
                        self.controller.zoom_out();
                        ui.close_menu();
                    }
                    if ui.button("Reset View").clicked() {
                        self.controller.reset_view();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Keyboard Shortcuts").clicked() {
                        self.controller.toggle_help();
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &mut self.controller))
            .inner;
        match toolbar_action {
            toolbar::ToolbarAction::ExportJson => self.export_annotations("json"),
            toolbar::ToolbarAction::ExportYaml => self.export_annotations("yaml"),
            toolbar::ToolbarAction::Import => self.import_annotations(),
            toolbar::ToolbarAction::None => {}
        }

        // Properties panel (right side)
        egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                if self.controller.media().is_video() {
                    egui::TopBottomPanel::bottom("video_controls")
                        .show_inside(ui, |ui| timeline::show(ui, &mut self.controller));
                }
                properties::show(ui, &mut self.controller);
            });

        self.handle_keyboard(ctx);

        // Main canvas (center)
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(ref message) = self.loading_message {
                ui.centered_and_justified(|ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.spinner();
                        ui.add_space(10.0);
                        ui.label(
                            egui::RichText::new(message)
                                .size(16.0)
                                .color(egui::Color32::from_gray(200)),
                        );
                    });
                });
            } else {
                canvas::show(
                    ui,
                    &mut self.controller,
                    self.media_texture.as_ref(),
                    self.media_size,
                );
            }
        });

        help::show(ctx, &mut self.controller);

        self.persist_if_dirty();
    }
}
