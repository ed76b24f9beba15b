// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stage (drawing) state machine.
//!
//! The ephemeral pointer-interaction reducer: idle -> drawing -> idle,
//! plus selection of committed areas. In-progress lines and areas live
//! only here and never touch the committed screen; the document reducer
//! promotes them on commit.

use crate::models::area::{Area, AreaId, Point, PolygonLine};

/// Actions accepted by the stage reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum StageAction {
    /// Begin a new line at the clicked point (idle only).
    StartLine(Point),
    /// Close the in-progress line at the resolved end coordinate and
    /// immediately open the next one (drawing only).
    EndLine(Point),
    /// Discard the in-progress line and area.
    ClearLine,
    /// Discard the in-progress line and area.
    ClearArea,
    /// Commit the in-progress area; the document reducer appends it.
    AddArea,
    /// Mark a committed area as selected.
    SelectArea(AreaId),
    /// Drop the current selection.
    ClearAreaSelection,
    /// Replace the selected area; the document reducer splices the list.
    ChangeSelectedArea(Area),
    /// Delete the selected area; the document reducer removes it.
    DeleteSelectedArea,
}

/// Drawing phase as a tagged union: an in-progress line or area cannot
/// exist outside the `Drawing` phase.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StagePhase {
    #[default]
    Idle,
    Drawing {
        /// The open segment currently following the pointer.
        line: PolygonLine,
        /// The area under construction, created lazily on the first
        /// completed segment.
        area: Option<Area>,
    },
}

/// Full drawing-state snapshot.
///
/// Selection is tracked by stable area id, orthogonal to the drawing
/// phase; a selected area always refers to an element of the committed
/// list (or one just removed from it, in which case the same transition
/// clears the selection).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StageState {
    pub phase: StagePhase,
    pub selected: Option<AreaId>,
}

impl StageState {
    /// The area under construction, if any.
    pub fn drawing_area(&self) -> Option<&Area> {
        match &self.phase {
            StagePhase::Drawing { area, .. } => area.as_ref(),
            StagePhase::Idle => None,
        }
    }

    /// The open line following the pointer, if any.
    pub fn drawing_line(&self) -> Option<&PolygonLine> {
        match &self.phase {
            StagePhase::Drawing { line, .. } => Some(line),
            StagePhase::Idle => None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.phase, StagePhase::Drawing { .. })
    }
}

/// Apply one action to the stage state.
///
/// Malformed combinations (ending a line while idle, starting one while
/// drawing) are absorbed as no-ops; no transition fails.
pub fn reduce(state: StageState, action: StageAction) -> StageState {
    match action {
        StageAction::StartLine(start) => match state.phase {
            StagePhase::Idle => StageState {
                phase: StagePhase::Drawing {
                    line: PolygonLine::open(start),
                    area: None,
                },
                selected: None,
            },
            StagePhase::Drawing { .. } => state,
        },
        StageAction::EndLine(end) => match state.phase {
            StagePhase::Drawing { line, area } => {
                let mut area = area.unwrap_or_default();
                area.lines.push(line.closed_at(end));
                StageState {
                    phase: StagePhase::Drawing {
                        // Ending one segment begins the next at the same
                        // coordinate, forming a continuous polyline.
                        line: PolygonLine::open(end),
                        area: Some(area),
                    },
                    selected: state.selected,
                }
            }
            StagePhase::Idle => state,
        },
        StageAction::AddArea | StageAction::ClearLine | StageAction::ClearArea => StageState {
            phase: StagePhase::Idle,
            selected: state.selected,
        },
        StageAction::SelectArea(id) => StageState {
            selected: Some(id),
            ..state
        },
        StageAction::ClearAreaSelection | StageAction::DeleteSelectedArea => StageState {
            selected: None,
            ..state
        },
        StageAction::ChangeSelectedArea(area) => StageState {
            selected: Some(area.id),
            ..state
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_start_line_enters_drawing_and_clears_selection() {
        let state = StageState {
            phase: StagePhase::Idle,
            selected: Some(AreaId("AREA:1".to_string())),
        };
        let state = reduce(state, StageAction::StartLine(point(1.0, 2.0)));
        assert!(state.is_drawing());
        assert!(state.selected.is_none());
        assert_eq!(state.drawing_line(), Some(&PolygonLine::open(point(1.0, 2.0))));
        assert!(state.drawing_area().is_none());
    }

    #[test]
    fn test_start_line_while_drawing_is_a_noop() {
        let state = reduce(StageState::default(), StageAction::StartLine(point(0.0, 0.0)));
        let same = reduce(state.clone(), StageAction::StartLine(point(9.0, 9.0)));
        assert_eq!(same, state);
    }

    #[test]
    fn test_end_line_while_idle_is_a_noop() {
        let state = reduce(StageState::default(), StageAction::EndLine(point(5.0, 5.0)));
        assert_eq!(state, StageState::default());
    }

    #[test]
    fn test_end_line_appends_segment_and_chains_next() {
        let state = reduce(StageState::default(), StageAction::StartLine(point(0.0, 0.0)));
        let state = reduce(state, StageAction::EndLine(point(10.0, 0.0)));

        let area = state.drawing_area().expect("area created lazily");
        assert_eq!(area.lines.len(), 1);
        assert_eq!(
            area.lines[0],
            PolygonLine::closed(point(0.0, 0.0), point(10.0, 0.0))
        );
        // The next open line starts where the last one ended.
        assert_eq!(state.drawing_line(), Some(&PolygonLine::open(point(10.0, 0.0))));

        let state = reduce(state, StageAction::EndLine(point(10.0, 10.0)));
        let area = state.drawing_area().unwrap();
        assert_eq!(area.lines.len(), 2);
        assert_eq!(area.lines[1].start, area.lines[0].end.unwrap());
    }

    #[test]
    fn test_lazy_area_gets_default_presentation() {
        let state = reduce(StageState::default(), StageAction::StartLine(point(0.0, 0.0)));
        let state = reduce(state, StageAction::EndLine(point(1.0, 1.0)));
        let area = state.drawing_area().unwrap();
        assert_eq!(area.fill_color, "red");
        assert_eq!(area.fill_opacity, "10%");
        assert_eq!(area.stroke, "lightgrey");
        assert!(!area.rollover_mask);
        assert!(area.link.is_empty());
    }

    #[test]
    fn test_add_area_resets_to_idle_keeping_selection() {
        let mut state = reduce(StageState::default(), StageAction::StartLine(point(0.0, 0.0)));
        state = reduce(state, StageAction::EndLine(point(1.0, 0.0)));
        state.selected = Some(AreaId("AREA:keep".to_string()));

        let state = reduce(state, StageAction::AddArea);
        assert_eq!(state.phase, StagePhase::Idle);
        assert!(state.drawing_area().is_none());
        assert!(state.drawing_line().is_none());
        assert_eq!(state.selected, Some(AreaId("AREA:keep".to_string())));
    }

    #[test]
    fn test_clear_discards_in_progress_work() {
        let state = reduce(StageState::default(), StageAction::StartLine(point(0.0, 0.0)));
        let state = reduce(state, StageAction::EndLine(point(1.0, 0.0)));
        let state = reduce(state, StageAction::ClearArea);
        assert_eq!(state.phase, StagePhase::Idle);

        let state = reduce(state, StageAction::StartLine(point(0.0, 0.0)));
        let state = reduce(state, StageAction::ClearLine);
        assert_eq!(state.phase, StagePhase::Idle);
    }

    #[test]
    fn test_select_and_deselect() {
        let id = AreaId("AREA:7".to_string());
        let state = reduce(StageState::default(), StageAction::SelectArea(id.clone()));
        assert_eq!(state.selected, Some(id));

        let state = reduce(state, StageAction::ClearAreaSelection);
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_delete_clears_selection() {
        let state = reduce(
            StageState::default(),
            StageAction::SelectArea(AreaId("AREA:9".to_string())),
        );
        let state = reduce(state, StageAction::DeleteSelectedArea);
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_change_selected_area_tracks_replacement_id() {
        let mut replacement = Area::new();
        replacement.link = "https://example.com".to_string();
        let id = replacement.id.clone();

        let state = reduce(
            StageState::default(),
            StageAction::ChangeSelectedArea(replacement),
        );
        assert_eq!(state.selected, Some(id));
    }
}
