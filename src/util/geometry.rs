// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Pure helpers converting polygon line sequences into renderable path
//! data and clip-path masks, plus the axis-lock pointer snap and the
//! point-in-polygon hit test used for area selection.

use crate::models::area::{Point, PolygonLine};

/// Neutral single-point clip region used to hide the rollover mask.
pub const HIDDEN_MASK: &str = "0 0";

/// Render one line segment as `"x1,y1 x2,y2 "`.
///
/// Segments that are still open (no `end`) render to the empty string.
pub fn render_path_segment(line: &PolygonLine) -> String {
    match line.end {
        Some(end) => format!("{},{} {},{} ", line.start.x, line.start.y, end.x, end.y),
        None => String::new(),
    }
}

/// Concatenate the rendered segments of a line sequence, in order,
/// yielding the polygon's point-list representation.
pub fn path_points(lines: &[PolygonLine]) -> String {
    lines.iter().map(render_path_segment).collect()
}

/// Render a committed area's lines as a CSS clip-path polygon:
/// comma-joined `"x1px y1px, x2px y2px"` fragments.
pub fn mask_clip_path(lines: &[PolygonLine]) -> String {
    lines
        .iter()
        .map(|line| {
            let end = line.end.unwrap_or(Point::new(0.0, 0.0));
            format!(
                "{}px {}px, {}px {}px",
                line.start.x, line.start.y, end.x, end.y
            )
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Snap a raw pointer position to the dominant axis relative to the line
/// start when the axis-lock modifier is held.
///
/// Whichever axis has the larger delta from `start` wins; an exact tie
/// produces the vertical lock. Callers apply this before dispatching an
/// end-line action, the reducer never snaps.
pub fn modify_coordinates(axis_lock: bool, raw: Point, start: Point) -> Point {
    if !axis_lock {
        return raw;
    }
    let dx = (raw.x - start.x).abs();
    let dy = (raw.y - start.y).abs();
    if dx > dy {
        Point::new(raw.x, start.y)
    } else {
        Point::new(start.x, raw.y)
    }
}

/// Collect the polygon vertices described by a sequence of closed lines.
///
/// Each completed segment contributes its start point; the final
/// segment's end closes the loop unless it already coincides with the
/// first vertex.
fn polygon_vertices(lines: &[PolygonLine]) -> Vec<Point> {
    let mut vertices = Vec::new();
    let mut last_end = None;
    for line in lines {
        if let Some(end) = line.end {
            vertices.push(line.start);
            last_end = Some(end);
        }
    }
    if let (Some(end), Some(first)) = (last_end, vertices.first().copied()) {
        if end != first {
            vertices.push(end);
        }
    }
    vertices
}

/// Ray-casting test for whether a point lies inside the polygon formed
/// by an area's closed lines.
pub fn point_in_polygon(point: Point, lines: &[PolygonLine]) -> bool {
    let vertices = polygon_vertices(lines);
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let vi = vertices[i];
        let vj = vertices[j];
        if (vi.y > point.y) != (vj.y > point.y)
            && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
