// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Screen (image-map document) data structures.
//!
//! A screen is one image-map definition: background and rollover-mask
//! images plus the committed, z-ordered list of hotspot areas.

use super::area::{now_millis, Area};
use serde::{Deserialize, Serialize};

/// Stable identifier of a [`Screen`], derived from its creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(pub String);

impl ScreenId {
    pub fn generate() -> Self {
        Self(format!("SCREEN:{:x}", now_millis()))
    }
}

/// Resolved details of an image asset.
///
/// Until asset resolution completes the screen holds no [`ImageFile`] and
/// must render in a degraded "no image" state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFile {
    pub content_type: String,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub url: String,
}

/// One image-map document: named images plus committed areas.
///
/// `areas` order is display/z-order and is preserved across edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screen {
    pub screen_id: ScreenId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<ImageFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask_image: Option<ImageFile>,
    #[serde(default)]
    pub areas: Vec<Area>,
}

impl Screen {
    /// Create an empty screen with a freshly generated id.
    pub fn new() -> Self {
        Self {
            screen_id: ScreenId::generate(),
            name: String::new(),
            background_image: None,
            mask_image: None,
            areas: Vec::new(),
        }
    }

    /// Rebuild a screen from persisted entry fields.
    pub fn from_entry(name: String, areas: Vec<Area>) -> Self {
        Self {
            screen_id: ScreenId::generate(),
            name,
            background_image: None,
            mask_image: None,
            areas,
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}
