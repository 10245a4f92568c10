//! Motion sub-dispatch (cursor movement).
//!
//! Resolves the raw target through `span_resolver::motion_target`, then
//! normalizes the cursor for Normal / Visual modes (never resting on the
//! newline of a non-empty line). A motion that leaves the cursor where it was
//! reports failure so macro playback can stop.

use super::DispatchResult;
use crate::MotionKind;
use crate::span_resolver::motion_target;
use core_model::View;
use core_state::{EditorState, Mode};

pub(crate) fn handle_motion(
    kind: MotionKind,
    count: u32,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    let before = view.cursor;
    let past_end = state.mode == Mode::Insert;
    let target = motion_target(
        state.buffer(),
        view.cursor,
        kind,
        count,
        &mut view.sticky_col,
        past_end,
    );
    let Some(target) = target else {
        tracing::trace!(target: "actions.dispatch", ?kind, count, "motion_failed");
        return DispatchResult::failed();
    };
    view.cursor = target;
    if !past_end {
        view.normalize_for_normal(state.buffer());
    }
    tracing::trace!(target: "actions.dispatch", ?kind, count, from = before, to = view.cursor, "motion");
    if view.cursor == before && kind.can_fail() {
        return DispatchResult::failed();
    }
    DispatchResult::dirty()
}
