// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Entry sidebar panel.
//!
//! Read-only companion view: shows the currently selected hotspot with
//! its link (editable in place), or an overview of the entry when
//! nothing is selected.

use crate::models::area::{Area, AreaId};
use crate::models::screen::{ImageFile, Screen};
use crate::util::geometry;

/// Result of sidebar interaction.
pub enum SidebarAction {
    None,
    Select(AreaId),
    Deselect,
    DeleteSelected,
    /// Replace the selected area's link URL.
    ChangeLink(String),
}

/// Display the sidebar for the current selection.
pub fn show(
    ui: &mut egui::Ui,
    screen: Option<&Screen>,
    selected: Option<&Area>,
    link_draft: &mut Option<String>,
) -> SidebarAction {
    let mut action = SidebarAction::None;

    match selected {
        Some(area) => {
            ui.heading("Selected area");
            ui.label(egui::RichText::new(&area.id.0).monospace().size(11.0));
            if !area.name.is_empty() {
                ui.label(&area.name);
            }
            ui.separator();

            if link_draft.is_some() {
                ui.label("Link URL");
                if let Some(draft) = link_draft.as_mut() {
                    ui.text_edit_singleline(draft);
                }
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        if let Some(link) = link_draft.take() {
                            action = SidebarAction::ChangeLink(link);
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        *link_draft = None;
                    }
                });
            } else {
                let link = if area.link.is_empty() {
                    "(no link)"
                } else {
                    area.link.as_str()
                };
                ui.label(link);
                if ui.button("Edit link").clicked() {
                    *link_draft = Some(area.link.clone());
                }
            }

            ui.separator();
            ui.label("Outline");
            ui.label(
                egui::RichText::new(geometry::path_points(&area.lines))
                    .monospace()
                    .size(11.0),
            );

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Deselect").clicked() {
                    action = SidebarAction::Deselect;
                }
                if ui.button("Delete").clicked() {
                    action = SidebarAction::DeleteSelected;
                }
            });
        }
        None => {
            ui.heading("Image map");
            match screen {
                Some(screen) => {
                    if !screen.name.is_empty() {
                        ui.label(&screen.name);
                    }
                    ui.separator();
                    image_info(ui, "background", screen.background_image.as_ref());
                    image_info(ui, "rollover", screen.mask_image.as_ref());
                    ui.separator();
                    ui.label(format!("{} areas", screen.areas.len()));
                    for area in &screen.areas {
                        let label = if area.name.is_empty() {
                            area.id.0.clone()
                        } else {
                            area.name.clone()
                        };
                        if ui.selectable_label(false, label).clicked() {
                            action = SidebarAction::Select(area.id.clone());
                        }
                    }
                }
                None => {
                    ui.label("No screen loaded");
                }
            }
        }
    }

    action
}

fn image_info(ui: &mut egui::Ui, label: &str, image: Option<&ImageFile>) {
    match image {
        Some(img) => {
            ui.label(format!(
                "{label}: {} [{}] {}x{}",
                img.file_name, img.content_type, img.width, img.height
            ));
        }
        None => {
            ui.label(
                egui::RichText::new(format!("{label}: unresolved"))
                    .weak(),
            );
        }
    }
}
