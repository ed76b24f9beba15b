// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! Wires the editor state machines to a host entry store: hydrates the
//! screen from persisted fields, translates pointer/key input into
//! reducer actions, resolves and decodes image assets on background
//! threads, and reconciles every transition back into the store.

use crate::host::bridge::{fields, AssetResolver, EntryStore, FieldSubscription};
use crate::host::sync::{subscribe_fields, AssetCache, AssetField, EntrySync, FieldEvent};
use crate::models::area::Area;
use crate::models::screen::Screen;
use crate::state::document::{self, EditorAction, EditorMode, EditorState};
use crate::state::stage::StageAction;
use crate::ui::{sidebar, stage};
use crate::util::geometry;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Result of a background image decode.
struct LoadedTexture {
    field: AssetField,
    size: [usize; 2],
    pixels: Vec<u8>,
}

/// Main application state.
pub struct HotspotApp {
    /// Host-side entry document storage
    store: Box<dyn EntryStore>,

    /// Document + drawing state machines
    editor: EditorState,

    /// Change-only persistence of the committed area list
    sync: EntrySync,

    /// Asset resolution with stale-response discarding
    assets: AssetCache,

    /// External field mutations funneled from the subscriptions
    field_events: Receiver<FieldEvent>,

    /// Keeps the field listeners attached for the app's lifetime;
    /// dropping the app detaches them.
    _subscriptions: Vec<FieldSubscription>,

    /// Channel for background image decoding
    texture_tx: Sender<LoadedTexture>,
    texture_rx: Receiver<LoadedTexture>,

    background_texture: Option<egui::TextureHandle>,
    mask_texture: Option<egui::TextureHandle>,

    /// Sidebar link edit in progress
    link_draft: Option<String>,

    /// Last hover mask reported by the stage
    hover_mask: String,
}

impl HotspotApp {
    /// Create the application from a host store and asset resolver,
    /// hydrating editor state from the persisted entry fields.
    pub fn new(mut store: Box<dyn EntryStore>, resolver: Arc<dyn AssetResolver>) -> Self {
        let title = store
            .get_field(fields::TITLE)
            .and_then(|value| value.as_str().map(str::to_string));
        let areas: Vec<Area> = store
            .get_field(fields::AREAS)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default();
        let selected_index = store
            .get_field(fields::SELECTED)
            .and_then(|value| value.as_u64())
            .map(|index| index as usize);

        let mut editor = if title.is_some() || !areas.is_empty() {
            EditorState::from_screen(Screen::from_entry(title.unwrap_or_default(), areas))
        } else {
            // Nothing stored yet; the update loop bootstraps a screen.
            EditorState::default()
        };
        if let Some(index) = selected_index {
            let restored = editor
                .screen
                .as_ref()
                .and_then(|screen| screen.areas.get(index))
                .map(|area| area.id.clone());
            editor.stage.selected = restored;
        }

        let sync = EntrySync::seed(store.as_ref());
        let (subscriptions, field_events) = subscribe_fields(
            store.as_mut(),
            &[fields::TITLE, fields::BACKGROUND, fields::ROLLOVER],
        );

        let mut assets = AssetCache::new(resolver);
        for field in [AssetField::Background, AssetField::Rollover] {
            let asset_id = store
                .get_field(field.field_name())
                .and_then(|value| value.as_str().map(str::to_string));
            if let Some(asset_id) = asset_id {
                assets.request(field, &asset_id);
            }
        }

        let (texture_tx, texture_rx) = channel();
        Self {
            store,
            editor,
            sync,
            assets,
            field_events,
            _subscriptions: subscriptions,
            texture_tx,
            texture_rx,
            background_texture: None,
            mask_texture: None,
            link_draft: None,
            hover_mask: geometry::HIDDEN_MASK.to_string(),
        }
    }

    /// Apply one action and reconcile the result into the host store.
    fn dispatch(&mut self, action: EditorAction) {
        let state = std::mem::take(&mut self.editor);
        self.editor = document::reduce(state, action);

        match self.sync.persist(
            self.store.as_mut(),
            self.editor.screen.as_ref(),
            self.editor.stage.selected.as_ref(),
        ) {
            Ok(_) => {}
            // Snapshot stays stale, so the next transition retries.
            Err(error) => log::warn!("persist failed, will retry: {error:#}"),
        }
    }

    /// React to an external change of an asset field.
    fn asset_field_changed(&mut self, field: AssetField, value: Option<serde_json::Value>) {
        match value.as_ref().and_then(|v| v.as_str()) {
            Some(asset_id) => self.assets.request(field, asset_id),
            None => {
                self.assets.invalidate(field);
                self.clear_image(field);
            }
        }
    }

    fn clear_image(&mut self, field: AssetField) {
        match field {
            AssetField::Background => {
                self.background_texture = None;
                self.dispatch(EditorAction::ClearImage);
            }
            AssetField::Rollover => {
                self.mask_texture = None;
                self.dispatch(EditorAction::ClearMaskImage);
            }
        }
    }

    /// Decode an image file on a background thread; the texture upload
    /// happens on the UI thread once pixels arrive.
    fn spawn_texture_load(&self, field: AssetField, url: String) {
        let tx = self.texture_tx.clone();
        std::thread::spawn(move || match image::open(&url) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                log::info!("loaded image {url} ({}x{})", size[0], size[1]);
                let _ = tx.send(LoadedTexture {
                    field,
                    size,
                    pixels: rgba.into_raw(),
                });
            }
            Err(error) => log::warn!("failed to load image {url}: {error}"),
        });
    }

    fn drain_host_events(&mut self) {
        let events: Vec<FieldEvent> = self.field_events.try_iter().collect();
        for event in events {
            log::debug!("field change: {}", event.field);
            match event.field {
                fields::TITLE => match event.value.as_ref().and_then(|v| v.as_str()) {
                    Some(title) => self.dispatch(EditorAction::ChangeName(title.to_string())),
                    None => self.dispatch(EditorAction::ClearName),
                },
                fields::BACKGROUND => {
                    self.asset_field_changed(AssetField::Background, event.value);
                }
                fields::ROLLOVER => {
                    self.asset_field_changed(AssetField::Rollover, event.value);
                }
                _ => {}
            }
        }
    }

    fn drain_asset_completions(&mut self) {
        for (field, details) in self.assets.poll() {
            match details {
                Some(details) => {
                    self.spawn_texture_load(field, details.url.clone());
                    let action = match field {
                        AssetField::Background => EditorAction::ChangeImage(details),
                        AssetField::Rollover => EditorAction::ChangeMaskImage(details),
                    };
                    self.dispatch(action);
                }
                None => self.clear_image(field),
            }
        }
    }

    fn drain_loaded_textures(&mut self, ctx: &egui::Context) {
        let loaded: Vec<LoadedTexture> = self.texture_rx.try_iter().collect();
        for texture in loaded {
            let image = egui::ColorImage::from_rgba_unmultiplied(texture.size, &texture.pixels);
            let handle = ctx.load_texture(
                texture.field.field_name(),
                image,
                egui::TextureOptions::LINEAR,
            );
            match texture.field {
                AssetField::Background => self.background_texture = Some(handle),
                AssetField::Rollover => self.mask_texture = Some(handle),
            }
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        // Don't steal keys from focused text fields.
        if ctx.wants_keyboard_input() {
            return;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.dispatch(EditorAction::Stage(StageAction::AddArea));
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.dispatch(EditorAction::Stage(StageAction::ClearArea));
            self.dispatch(EditorAction::Stage(StageAction::ClearAreaSelection));
            self.link_draft = None;
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Backspace) || i.key_pressed(egui::Key::Delete)) {
            self.dispatch(EditorAction::Stage(StageAction::DeleteSelectedArea));
            self.link_draft = None;
        }
    }

    fn handle_sidebar_action(&mut self, action: sidebar::SidebarAction) {
        match action {
            sidebar::SidebarAction::Select(id) => {
                self.link_draft = None;
                self.dispatch(EditorAction::Stage(StageAction::SelectArea(id)));
            }
            sidebar::SidebarAction::Deselect => {
                self.link_draft = None;
                self.dispatch(EditorAction::Stage(StageAction::ClearAreaSelection));
            }
            sidebar::SidebarAction::DeleteSelected => {
                self.link_draft = None;
                self.dispatch(EditorAction::Stage(StageAction::DeleteSelectedArea));
            }
            sidebar::SidebarAction::ChangeLink(link) => {
                if let Some(area) = self.editor.selected_area() {
                    let mut replacement = area.clone();
                    replacement.link = link;
                    self.dispatch(EditorAction::Stage(StageAction::ChangeSelectedArea(
                        replacement,
                    )));
                }
            }
            sidebar::SidebarAction::None => {}
        }
    }

    fn handle_stage_event(&mut self, event: stage::StageEvent, axis_lock: bool) {
        match event {
            stage::StageEvent::StartLine(point) => {
                self.dispatch(EditorAction::Stage(StageAction::StartLine(point)));
            }
            stage::StageEvent::EndLine(raw) => {
                // The reducer never snaps; resolve the end coordinate here.
                if let Some(line) = self.editor.stage.drawing_line() {
                    let end = geometry::modify_coordinates(axis_lock, raw, line.start);
                    self.dispatch(EditorAction::Stage(StageAction::EndLine(end)));
                }
            }
            stage::StageEvent::CommitArea => {
                self.dispatch(EditorAction::Stage(StageAction::AddArea));
            }
            stage::StageEvent::Cancel => {
                self.dispatch(EditorAction::Stage(StageAction::ClearArea));
                self.dispatch(EditorAction::Stage(StageAction::ClearAreaSelection));
            }
            stage::StageEvent::SelectArea(id) => {
                self.link_draft = None;
                self.dispatch(EditorAction::Stage(StageAction::SelectArea(id)));
            }
            stage::StageEvent::None => {}
        }
    }
}

impl eframe::App for HotspotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_host_events();
        self.drain_asset_completions();
        self.drain_loaded_textures(ctx);

        // Self-triggering bootstrap: no screen stored yet.
        if self.editor.mode == EditorMode::Empty {
            log::info!("bootstrapping empty screen");
            self.dispatch(EditorAction::CreateScreen);
        }

        self.handle_keys(ctx);
        let axis_lock = ctx.input(|i| i.modifiers.shift);

        let sidebar_action = egui::SidePanel::right("sidebar")
            .default_width(260.0)
            .show(ctx, |ui| {
                sidebar::show(
                    ui,
                    self.editor.screen.as_ref(),
                    self.editor.selected_area(),
                    &mut self.link_draft,
                )
            })
            .inner;
        self.handle_sidebar_action(sidebar_action);

        let stage_response = egui::CentralPanel::default()
            .show(ctx, |ui| {
                stage::show(
                    ui,
                    self.editor.screen.as_ref(),
                    &self.editor.stage,
                    self.background_texture.as_ref(),
                    self.mask_texture.as_ref(),
                    axis_lock,
                )
            })
            .inner;

        if stage_response.hover_mask != self.hover_mask {
            log::debug!("mask: {}", stage_response.hover_mask);
            self.hover_mask = stage_response.hover_mask;
        }
        self.handle_stage_event(stage_response.event, axis_lock);

        // Background threads may complete without further input events.
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
