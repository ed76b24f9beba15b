// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! File-backed host implementation.
//!
//! Stands in for the CMS host in the desktop harness: the entry
//! document lives in a JSON file, and asset ids resolve to image files
//! under an asset root directory.

use super::bridge::{AssetResolver, EntryStore, FieldListener, FieldSubscription, FieldValue};
use super::memory::MemoryEntry;
use crate::models::screen::ImageFile;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Entry store persisted as a pretty-printed JSON document on disk.
///
/// A write is acknowledged only once the file has been rewritten; a
/// failed disk write surfaces as an error so the sync layer retries.
pub struct FileEntry {
    path: PathBuf,
    entry: MemoryEntry,
}

impl FileEntry {
    /// Open an entry file, creating an empty document if none exists.
    pub fn open(path: PathBuf) -> Result<Self> {
        let entry = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading entry file {}", path.display()))?;
            let fields: BTreeMap<String, FieldValue> = serde_json::from_str(&json)
                .with_context(|| format!("parsing entry file {}", path.display()))?;
            MemoryEntry::from_fields(fields)
        } else {
            log::info!("entry file {} not found, starting empty", path.display());
            MemoryEntry::new()
        };
        Ok(Self { path, entry })
    }

    fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self.entry.fields())?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("writing entry file {}", self.path.display()))?;
        Ok(())
    }
}

impl EntryStore for FileEntry {
    fn get_field(&self, name: &str) -> Option<FieldValue> {
        self.entry.get_field(name)
    }

    fn set_field(&mut self, name: &str, value: Option<FieldValue>) -> Result<()> {
        self.entry.set_field(name, value)?;
        self.save()
    }

    fn on_field_change(&mut self, name: &str, listener: FieldListener) -> FieldSubscription {
        self.entry.on_field_change(name, listener)
    }
}

/// Resolves asset ids as image paths relative to a root directory,
/// reading pixel dimensions from the file header.
pub struct DirAssetResolver {
    root: PathBuf,
}

impl DirAssetResolver {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl AssetResolver for DirAssetResolver {
    fn resolve(&self, asset_id: &str) -> Result<ImageFile> {
        let path = self.root.join(asset_id);
        let (width, height) = image::image_dimensions(&path)
            .with_context(|| format!("reading image dimensions of {}", path.display()))?;
        Ok(ImageFile {
            content_type: content_type_for(&path),
            width,
            height,
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            url: path.to_string_lossy().into_owned(),
        })
    }
}

fn content_type_for(path: &Path) -> String {
    let kind = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "jpeg",
        Some("gif") => "gif",
        Some("bmp") => "bmp",
        Some("webp") => "webp",
        _ => "png",
    };
    format!("image/{kind}")
}
