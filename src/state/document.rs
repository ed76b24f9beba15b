// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Document state machine.
//!
//! Owns the screen (the committed image-map document) and the editor
//! mode, and delegates pointer interaction to the stage reducer. Three
//! stage transitions are composite: commit, delete and change also
//! mutate the committed area list, reading the stage's pre-transition
//! value inside the same reduction so no call-order assumptions leak
//! out of this module.

use super::stage::{self, StageAction, StageState};
use crate::models::screen::{ImageFile, Screen};

/// Editor mode. `Preview` is reserved; no transition produces it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Empty,
    Edit,
    Preview,
}

/// Actions accepted by the document reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Bootstrap a fresh screen (dispatched by the caller whenever it
    /// observes `Empty` mode, not by the user).
    CreateScreen,
    ChangeName(String),
    ClearName,
    ChangeImage(ImageFile),
    ClearImage,
    ChangeMaskImage(ImageFile),
    ClearMaskImage,
    /// Delegated drawing transition.
    Stage(StageAction),
}

/// Complete editor state: mode, committed document, drawing state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorState {
    pub mode: EditorMode,
    pub screen: Option<Screen>,
    pub stage: StageState,
}

impl EditorState {
    /// Rebuild editor state from a previously persisted screen.
    pub fn from_screen(screen: Screen) -> Self {
        Self {
            mode: EditorMode::Edit,
            screen: Some(screen),
            stage: StageState::default(),
        }
    }

    /// The committed area currently selected, if any.
    pub fn selected_area(&self) -> Option<&crate::models::area::Area> {
        let id = self.stage.selected.as_ref()?;
        self.screen
            .as_ref()?
            .areas
            .iter()
            .find(|area| &area.id == id)
    }
}

/// Apply one action to the editor state.
pub fn reduce(state: EditorState, action: EditorAction) -> EditorState {
    log::debug!("action: {:?}", action);
    match action {
        EditorAction::CreateScreen => EditorState {
            mode: EditorMode::Edit,
            screen: Some(Screen::new()),
            stage: state.stage,
        },
        EditorAction::ChangeName(name) => with_screen(state, |screen| screen.name = name),
        EditorAction::ClearName => with_screen(state, |screen| screen.name.clear()),
        EditorAction::ChangeImage(image) => {
            with_screen(state, |screen| screen.background_image = Some(image))
        }
        EditorAction::ClearImage => with_screen(state, |screen| screen.background_image = None),
        EditorAction::ChangeMaskImage(image) => {
            with_screen(state, |screen| screen.mask_image = Some(image))
        }
        EditorAction::ClearMaskImage => with_screen(state, |screen| screen.mask_image = None),
        EditorAction::Stage(stage_action) => reduce_stage(state, stage_action),
    }
}

/// Apply a field edit to the current screen; no-op when none is loaded.
fn with_screen(mut state: EditorState, edit: impl FnOnce(&mut Screen)) -> EditorState {
    if let Some(screen) = state.screen.as_mut() {
        edit(screen);
    }
    state
}

fn reduce_stage(state: EditorState, action: StageAction) -> EditorState {
    let EditorState { mode, screen, stage } = state;
    match action {
        StageAction::AddArea => {
            // Capture the in-progress area before the stage reducer
            // drops it, then promote it to the committed list.
            let pending = stage.drawing_area().cloned();
            let stage = stage::reduce(stage, StageAction::AddArea);
            let screen = screen.map(|mut screen| {
                if let Some(area) = pending {
                    log::info!("committed area {} ({} lines)", area.id, area.lines.len());
                    screen.areas.push(area);
                }
                screen
            });
            EditorState { mode, screen, stage }
        }
        StageAction::DeleteSelectedArea => {
            let selected = stage.selected.clone();
            let stage = stage::reduce(stage, StageAction::DeleteSelectedArea);
            let screen = screen.map(|mut screen| {
                if let Some(id) = selected {
                    screen.areas.retain(|area| area.id != id);
                    log::info!("deleted area {}, {} remaining", id, screen.areas.len());
                }
                screen
            });
            EditorState { mode, screen, stage }
        }
        StageAction::ChangeSelectedArea(replacement) => {
            // Splice by stable id, in place: locate the selected area and
            // substitute the replacement without disturbing z-order.
            let slot = stage.selected.as_ref().and_then(|id| {
                screen
                    .as_ref()
                    .and_then(|s| s.areas.iter().position(|area| &area.id == id))
            });
            match slot {
                Some(index) => {
                    let screen = screen.map(|mut screen| {
                        screen.areas[index] = replacement.clone();
                        screen
                    });
                    let stage =
                        stage::reduce(stage, StageAction::ChangeSelectedArea(replacement));
                    EditorState { mode, screen, stage }
                }
                // No selection, or the selected id is gone: absorb.
                None => EditorState { mode, screen, stage },
            }
        }
        delegated => EditorState {
            mode,
            screen,
            stage: stage::reduce(stage, delegated),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::area::{Area, Point};

    fn edit_state() -> EditorState {
        reduce(EditorState::default(), EditorAction::CreateScreen)
    }

    fn draw_square(state: EditorState) -> EditorState {
        let clicks = [
            StageAction::StartLine(Point::new(0.0, 0.0)),
            StageAction::EndLine(Point::new(10.0, 0.0)),
            StageAction::EndLine(Point::new(10.0, 10.0)),
            StageAction::EndLine(Point::new(0.0, 10.0)),
        ];
        clicks
            .into_iter()
            .fold(state, |state, action| reduce(state, EditorAction::Stage(action)))
    }

    #[test]
    fn test_create_screen_bootstraps_edit_mode() {
        let state = edit_state();
        assert_eq!(state.mode, EditorMode::Edit);
        let screen = state.screen.expect("screen materialized");
        assert!(screen.name.is_empty());
        assert!(screen.areas.is_empty());
    }

    #[test]
    fn test_field_edits_without_screen_are_noops() {
        let state = reduce(
            EditorState::default(),
            EditorAction::ChangeName("unused".to_string()),
        );
        assert!(state.screen.is_none());
        assert_eq!(state.mode, EditorMode::Empty);
    }

    #[test]
    fn test_name_and_image_field_edits() {
        let image = ImageFile {
            content_type: "image/png".to_string(),
            width: 100,
            height: 50,
            file_name: "bg.png".to_string(),
            url: "assets/bg.png".to_string(),
        };

        let state = edit_state();
        let state = reduce(state, EditorAction::ChangeName("map".to_string()));
        let state = reduce(state, EditorAction::ChangeImage(image.clone()));
        let state = reduce(state, EditorAction::ChangeMaskImage(image.clone()));
        {
            let screen = state.screen.as_ref().unwrap();
            assert_eq!(screen.name, "map");
            assert_eq!(screen.background_image.as_ref(), Some(&image));
            assert_eq!(screen.mask_image.as_ref(), Some(&image));
        }

        let state = reduce(state, EditorAction::ClearName);
        let state = reduce(state, EditorAction::ClearImage);
        let state = reduce(state, EditorAction::ClearMaskImage);
        let screen = state.screen.as_ref().unwrap();
        assert!(screen.name.is_empty());
        assert!(screen.background_image.is_none());
        assert!(screen.mask_image.is_none());
    }

    #[test]
    fn test_commit_promotes_drawn_square() {
        // start (0,0) -> end (10,0) -> end (10,10) -> end (0,10) -> commit
        let state = draw_square(edit_state());
        let state = reduce(state, EditorAction::Stage(StageAction::AddArea));

        let screen = state.screen.as_ref().unwrap();
        assert_eq!(screen.areas.len(), 1);
        let area = &screen.areas[0];
        assert_eq!(area.lines.len(), 3);
        for pair in area.lines.windows(2) {
            assert_eq!(pair[0].end.unwrap(), pair[1].start);
        }
        assert_eq!(area.lines[0].start, Point::new(0.0, 0.0));
        assert_eq!(area.lines[2].end.unwrap(), Point::new(0.0, 10.0));

        // Drawing state fully reset.
        assert!(!state.stage.is_drawing());
        assert!(state.stage.drawing_area().is_none());
    }

    #[test]
    fn test_commit_without_in_progress_area_is_a_noop() {
        let state = edit_state();
        let before = state.screen.clone();
        let state = reduce(state, EditorAction::Stage(StageAction::AddArea));
        assert_eq!(state.screen, before);
    }

    #[test]
    fn test_commit_without_screen_discards_area() {
        let state = draw_square(EditorState::default());
        let state = reduce(state, EditorAction::Stage(StageAction::AddArea));
        assert!(state.screen.is_none());
        assert!(!state.stage.is_drawing());
    }

    #[test]
    fn test_delete_selected_then_redispatch_is_safe() {
        let state = draw_square(edit_state());
        let state = reduce(state, EditorAction::Stage(StageAction::AddArea));
        let id = state.screen.as_ref().unwrap().areas[0].id.clone();

        let state = reduce(state, EditorAction::Stage(StageAction::SelectArea(id)));
        let state = reduce(state, EditorAction::Stage(StageAction::DeleteSelectedArea));
        assert!(state.screen.as_ref().unwrap().areas.is_empty());
        assert!(state.stage.selected.is_none());

        // No selection left: deleting again changes nothing.
        let again = reduce(
            state.clone(),
            EditorAction::Stage(StageAction::DeleteSelectedArea),
        );
        assert_eq!(again.screen, state.screen);
    }

    #[test]
    fn test_change_selected_area_replaces_in_place() {
        let mut state = edit_state();
        for _ in 0..3 {
            state = draw_square(state);
            state = reduce(state, EditorAction::Stage(StageAction::AddArea));
        }
        let ids: Vec<_> = state
            .screen
            .as_ref()
            .unwrap()
            .areas
            .iter()
            .map(|a| a.id.clone())
            .collect();
        assert_eq!(ids.len(), 3);

        // Replace the middle area, keeping its id.
        let mut replacement = state.screen.as_ref().unwrap().areas[1].clone();
        replacement.link = "https://example.com/door".to_string();

        let state = reduce(
            state,
            EditorAction::Stage(StageAction::SelectArea(ids[1].clone())),
        );
        let state = reduce(
            state,
            EditorAction::Stage(StageAction::ChangeSelectedArea(replacement.clone())),
        );

        let areas = &state.screen.as_ref().unwrap().areas;
        assert_eq!(areas.len(), 3);
        // Order preserved, middle entry substituted.
        assert_eq!(areas[0].id, ids[0]);
        assert_eq!(areas[1], replacement);
        assert_eq!(areas[2].id, ids[2]);
        assert_eq!(state.stage.selected, Some(ids[1].clone()));
    }

    #[test]
    fn test_change_without_selection_is_absorbed() {
        let state = draw_square(edit_state());
        let state = reduce(state, EditorAction::Stage(StageAction::AddArea));
        let before = state.clone();

        let state = reduce(
            state,
            EditorAction::Stage(StageAction::ChangeSelectedArea(Area::new())),
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_selected_area_lookup_is_by_id() {
        let state = draw_square(edit_state());
        let state = reduce(state, EditorAction::Stage(StageAction::AddArea));
        let id = state.screen.as_ref().unwrap().areas[0].id.clone();
        let state = reduce(state, EditorAction::Stage(StageAction::SelectArea(id.clone())));

        let selected = state.selected_area().expect("selection resolves");
        assert_eq!(selected.id, id);
    }

    #[test]
    fn test_committed_ids_are_unique() {
        let mut state = edit_state();
        for _ in 0..2 {
            state = draw_square(state);
            state = reduce(state, EditorAction::Stage(StageAction::AddArea));
        }
        let areas = &state.screen.as_ref().unwrap().areas;
        assert_eq!(areas.len(), 2);
        assert_ne!(areas[0].id, areas[1].id);
    }
}
