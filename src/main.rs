// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hotspotter - interactive image map editor
//!
//! A desktop tool for drawing clickable hotspot areas over a background
//! image and persisting them as an entry document.

mod app;
mod host;
mod models;
mod state;
mod ui;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use app::HotspotApp;
use host::file::{DirAssetResolver, FileEntry};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Usage: hotspotter <entry.json> [asset-dir]
    let mut args = std::env::args().skip(1);
    let entry_path: PathBuf = args
        .next()
        .context("usage: hotspotter <entry.json> [asset-dir]")?
        .into();
    let asset_root: PathBuf = args.next().unwrap_or_else(|| ".".to_string()).into();

    let store = FileEntry::open(entry_path.clone())
        .with_context(|| format!("failed to open entry {}", entry_path.display()))?;
    let resolver = Arc::new(DirAssetResolver::new(asset_root));

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Hotspotter - Image Map Editor"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Hotspotter",
        options,
        Box::new(move |_cc| Ok(Box::new(HotspotApp::new(Box::new(store), resolver)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
