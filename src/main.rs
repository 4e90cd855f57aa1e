// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotator - media annotation workspace
//!
//! A cross-platform desktop application for drawing bounding boxes,
//! polygons, points, lines and text marks over images and videos, with
//! undo/redo history, persistence and JSON/YAML export.

mod app;
mod canvas;
mod config;
mod error;
mod io;
mod models;
mod store;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::AnnotatorApp;
use clap::Parser;
use config::AppConfig;
use models::task::{MediaType, TaskMedia};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "annotator", version, about = "Annotate images and videos")]
struct Cli {
    /// Image or video to open
    media: Option<String>,

    /// Override media type detection
    #[arg(long, value_enum)]
    media_type: Option<MediaType>,

    /// YAML config file
    #[arg(long, env = "ANNOTATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for persisted annotations (overrides config)
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Discard persisted annotations and start empty
    #[arg(long)]
    fresh: bool,
}

impl Cli {
    fn task_media(&self) -> Option<TaskMedia> {
        let url = self.media.as_ref()?;
        Some(match self.media_type {
            Some(media_type) => TaskMedia::new(url.clone(), media_type),
            None => TaskMedia::from_path(url.clone()),
        })
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = cli.storage_dir.clone() {
        config.storage_dir = dir;
    }
    log::debug!("Using config {:?}", config);

    let app = AnnotatorApp::new(&config, cli.task_media(), cli.fresh);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Annotator"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native("Annotator", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
