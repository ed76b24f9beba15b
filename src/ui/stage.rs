// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stage canvas for image display and polygon drawing.
//!
//! Renders the background image, committed hotspot areas and the
//! in-progress polyline, and translates pointer input into semantic
//! drawing events for the app to dispatch.

use crate::models::area::{Area, Point};
use crate::models::screen::Screen;
use crate::state::stage::{StagePhase, StageState};
use crate::util::geometry;

/// Result of stage interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    None,
    /// Click on empty canvas while idle.
    StartLine(Point),
    /// Click while drawing; carries the raw pointer position, the app
    /// applies the axis-lock snap before dispatching.
    EndLine(Point),
    /// Double-click: commit the in-progress area.
    CommitArea,
    /// Right-click: discard in-progress work and deselect.
    Cancel,
    /// Click on a committed area while idle.
    SelectArea(crate::models::area::AreaId),
}

/// What the stage produced this frame.
pub struct StageResponse {
    pub event: StageEvent,
    /// Clip-path mask for the area under the pointer, or the neutral
    /// hidden mask when nothing is hovered.
    pub hover_mask: String,
}

/// Display the stage and handle pointer interactions.
pub fn show(
    ui: &mut egui::Ui,
    screen: Option<&Screen>,
    stage: &StageState,
    background: Option<&egui::TextureHandle>,
    mask: Option<&egui::TextureHandle>,
    axis_lock: bool,
) -> StageResponse {
    let mut event = StageEvent::None;
    let mut hover_mask = geometry::HIDDEN_MASK.to_string();

    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);
    let available = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available);
        let canvas_rect = ui.min_rect();

        // Fit the image into the canvas, or fall back to a 1:1 mapping
        // while the background is unresolved.
        let image_size = screen
            .and_then(|s| s.background_image.as_ref())
            .map(|img| (img.width, img.height));
        let (image_rect, image_w, image_h) = match image_size {
            Some((w, h)) if w > 0 && h > 0 => {
                let img_aspect = w as f32 / h as f32;
                let avail_aspect = canvas_rect.width() / canvas_rect.height();
                let (dw, dh) = if img_aspect > avail_aspect {
                    (canvas_rect.width(), canvas_rect.width() / img_aspect)
                } else {
                    (canvas_rect.height() * img_aspect, canvas_rect.height())
                };
                let offset = egui::vec2(
                    (canvas_rect.width() - dw) / 2.0,
                    (canvas_rect.height() - dh) / 2.0,
                );
                let rect = egui::Rect::from_min_size(canvas_rect.min + offset, egui::vec2(dw, dh));
                (rect, w as f32, h as f32)
            }
            _ => (canvas_rect, canvas_rect.width(), canvas_rect.height()),
        };

        let to_screen = move |p: Point| {
            egui::pos2(
                image_rect.min.x + (p.x as f32 / image_w) * image_rect.width(),
                image_rect.min.y + (p.y as f32 / image_h) * image_rect.height(),
            )
        };
        let to_image = move |pos: egui::Pos2| {
            Point::new(
                f64::from((pos.x - image_rect.min.x) / image_rect.width() * image_w),
                f64::from((pos.y - image_rect.min.y) / image_rect.height() * image_h),
            )
        };

        let painter = ui.painter().clone();

        match background {
            Some(texture) => {
                painter.image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            }
            None => {
                // Degraded state until asset resolution completes.
                painter.rect_filled(image_rect, 0.0, egui::Color32::from_gray(55));
                painter.text(
                    image_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "No background image",
                    egui::FontId::proportional(14.0),
                    egui::Color32::from_gray(140),
                );
            }
        }

        let response = ui.allocate_rect(image_rect, egui::Sense::click());
        let hover_point = response.hover_pos().map(to_image);

        // Committed areas; the topmost hovered one provides the mask.
        if let Some(screen) = screen {
            for area in &screen.areas {
                let selected = stage.selected.as_ref() == Some(&area.id);
                draw_area(&painter, area, selected, to_screen);
                if !selected {
                    if let Some(point) = hover_point {
                        if geometry::point_in_polygon(point, &area.lines) {
                            hover_mask = geometry::mask_clip_path(&area.lines);
                        }
                    }
                }
            }
        }

        // Approximate the rollover reveal: show the mask image while a
        // non-selected area is hovered.
        if hover_mask != geometry::HIDDEN_MASK {
            if let Some(texture) = mask {
                painter.image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::from_white_alpha(160),
                );
            }
        }

        // In-progress work: the open polyline plus the rubber-band
        // segment following the pointer (with the axis-lock preview).
        if let StagePhase::Drawing { line, area } = &stage.phase {
            if let Some(area) = area {
                draw_area(&painter, area, false, to_screen);
            }
            if let Some(raw) = hover_point {
                let end = geometry::modify_coordinates(axis_lock, raw, line.start);
                painter.line_segment(
                    [to_screen(line.start), to_screen(end)],
                    egui::Stroke::new(1.0, egui::Color32::WHITE),
                );
            }
        }

        if response.double_clicked() {
            event = StageEvent::CommitArea;
        } else if response.secondary_clicked() {
            event = StageEvent::Cancel;
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if image_rect.contains(pos) {
                    let point = to_image(pos);
                    event = if stage.is_drawing() {
                        StageEvent::EndLine(point)
                    } else {
                        // Topmost area under the click wins.
                        let hit = screen.and_then(|s| {
                            s.areas
                                .iter()
                                .rev()
                                .find(|area| geometry::point_in_polygon(point, &area.lines))
                                .map(|area| area.id.clone())
                        });
                        match hit {
                            Some(id) => StageEvent::SelectArea(id),
                            None => StageEvent::StartLine(point),
                        }
                    };
                }
            }
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        let hint = if stage.is_drawing() {
            "Click to add points - Enter or double-click commits, Shift locks axis, right-click cancels"
        } else {
            "Click to start drawing, click an area to select it"
        };
        ui.label(egui::RichText::new(hint).italics().weak());
        if let Some(screen) = screen {
            ui.separator();
            ui.label(format!("{} areas", screen.areas.len()));
        }
    });

    StageResponse { event, hover_mask }
}

/// Draw one area's segments and vertices.
fn draw_area(
    painter: &egui::Painter,
    area: &Area,
    selected: bool,
    to_screen: impl Fn(Point) -> egui::Pos2,
) {
    let color = if selected {
        egui::Color32::RED
    } else {
        egui::Color32::YELLOW
    };

    let mut first_start = None;
    let mut last_end = None;
    for line in &area.lines {
        if let Some(end) = line.end {
            let a = to_screen(line.start);
            let b = to_screen(end);
            painter.line_segment([a, b], egui::Stroke::new(2.0, color));
            painter.circle_filled(a, 3.0, color);
            first_start.get_or_insert(a);
            last_end = Some(b);
        }
    }

    // Close the outline back to the first vertex.
    if let (Some(first), Some(last)) = (first_start, last_end) {
        if area.lines.len() >= 2 {
            painter.line_segment([last, first], egui::Stroke::new(2.0, color));
        }
        painter.circle_filled(last, 3.0, color);
    }
}
