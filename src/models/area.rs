// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hotspot area data structures.
//!
//! This module defines the core data structures for image-map hotspots:
//! points, polygon line segments and the selectable areas built from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// A 2D point in the image's local pixel space.
///
/// Serialized as a two-element array `[x, y]`, the coordinate shape used
/// by the persisted entry document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(point: Point) -> Self {
        (point.x, point.y)
    }
}

/// One segment of a polygon outline.
///
/// A line without an `end` is still being dragged by the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonLine {
    pub start: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Point>,
}

impl PolygonLine {
    /// Start an open segment at the given point.
    pub fn open(start: Point) -> Self {
        Self { start, end: None }
    }

    /// Create a completed segment.
    pub fn closed(start: Point, end: Point) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Close this segment at the given end point.
    pub fn closed_at(self, end: Point) -> Self {
        Self {
            start: self.start,
            end: Some(end),
        }
    }
}

/// Stable identifier of an [`Area`], generated once at creation.
///
/// All list membership, replacement and deletion of areas is keyed on
/// this id. Areas are never compared by position or reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaId(pub String);

impl AreaId {
    /// Generate a fresh id from the creation time plus a process-local
    /// counter so ids stay unique within a single millisecond.
    pub fn generate() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("AREA:{}:{}", now_millis(), n))
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A closed polygon hotspot with link metadata and presentation attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    /// Link URL opened when the hotspot is activated. Empty by default.
    pub link: String,
    /// Completed segments in insertion order (= polygon winding order).
    pub lines: Vec<PolygonLine>,
    pub rollover_mask: bool,
    pub fill_color: String,
    pub fill_opacity: String,
    pub stroke: String,
}

impl Area {
    /// Create an empty area with a fresh id and default presentation.
    pub fn new() -> Self {
        Self {
            id: AreaId::generate(),
            name: String::new(),
            link: String::new(),
            lines: Vec::new(),
            rollover_mask: false,
            fill_color: "red".to_string(),
            fill_opacity: "10%".to_string(),
            stroke: "lightgrey".to_string(),
        }
    }
}

impl Default for Area {
    fn default() -> Self {
        Self::new()
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
