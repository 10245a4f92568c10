//! Dispatcher applying `Action` to mutable editor state.
//!
//! Sub-modules:
//! * `motion`   - cursor movement
//! * `operator` - d/c/y over motions, doubled keys, text objects and regions
//! * `visual`   - visual mode entry, selection and operators
//! * `mode`     - insert-session entry and exit
//! * `edit`     - insert-mode edits, `x`/`X` and paste
//! * `undo`     - undo / redo
//!
//! Every normal-mode command is one undo group. An insert session (including
//! the insert half of `c`) keeps its group open until `<Esc>`.

use crate::repeat::{RepeatAction, RepeatEngine, RepeatTarget};
use crate::{Action, EditKind, OperatorKind};
use core_config::EditorConfig;
use core_model::EditorModel;
use core_state::Mode;
use tracing::{debug, trace};

mod edit;
mod mode;
mod motion;
mod operator;
mod undo;
mod visual;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    /// Buffer, cursor or mode changed.
    pub dirty: bool,
    /// The command could not be carried out (motion failure, nothing to
    /// operate on, empty register). Macro playback stops on failure.
    pub failed: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            failed: false,
        }
    }
    pub fn clean() -> Self {
        Self {
            dirty: false,
            failed: false,
        }
    }
    pub fn failed() -> Self {
        Self {
            dirty: false,
            failed: true,
        }
    }
}

/// Editing options resolved from `[editor]` config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOptions {
    pub shiftwidth: usize,
    pub expandtab: bool,
    pub autoindent: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for EditOptions {
    fn from(cfg: &EditorConfig) -> Self {
        Self {
            shiftwidth: cfg.shiftwidth.max(1),
            expandtab: cfg.expandtab,
            autoindent: cfg.autoindent,
        }
    }
}

/// Per-session dispatch state that outlives single actions.
#[derive(Debug, Default)]
pub struct DispatchContext {
    pub options: EditOptions,
    pub repeat: RepeatEngine,
}

impl DispatchContext {
    pub fn new(options: EditOptions) -> Self {
        Self {
            options,
            repeat: RepeatEngine::new(),
        }
    }
}

/// Apply an action to the model.
pub fn dispatch(action: Action, model: &mut EditorModel, ctx: &mut DispatchContext) -> DispatchResult {
    trace!(target: "actions.dispatch", ?action, "dispatch");
    if let Action::RepeatLast { count } = action {
        return repeat_last(count, model, ctx);
    }
    let (state, view) = model.split_state_and_view();
    match action {
        Action::Motion { motion, count } => {
            let insert = state.mode == Mode::Insert;
            let result = motion::handle_motion(motion, count, state, view);
            if insert && !result.failed {
                ctx.repeat.break_insert();
            }
            result
        }
        Action::ApplyOperator {
            op,
            motion,
            count,
            register,
        } => operator::apply_motion(op, motion, count, register, state, view, ctx),
        Action::LinewiseOperator {
            op,
            count,
            register,
        } => operator::apply_linewise(op, count, register, state, view, ctx),
        Action::ObjectOperator {
            op,
            object,
            count,
            register,
        } => operator::apply_object(op, object, count, register, state, view, ctx),
        Action::VisualOperator { op, register } => {
            visual::apply_operator(op, register, state, view, ctx)
        }
        Action::VisualObject { object, count } => visual::select_object(object, count, state, view),
        Action::VisualSwapEnds => visual::swap_ends(state, view),
        Action::EnterVisual(kind) => visual::enter(kind, state, view),
        Action::ExitVisual => visual::exit(state, view),
        Action::EnterInsert(entry) => mode::enter_insert(entry, state, view, ctx),
        Action::ExitInsert => mode::exit_insert(state, view, ctx),
        Action::Edit(kind) => edit::handle_edit(kind, state, view, ctx),
        Action::DeleteChar {
            forward,
            count,
            register,
        } => edit::delete_char(forward, count, register, state, view, ctx),
        Action::Paste {
            before,
            count,
            register,
        } => edit::paste(before, count, register, state, view, ctx),
        Action::Undo { count } => undo::handle_undo(count, state, view),
        Action::Redo { count } => undo::handle_redo(count, state, view),
        Action::Unsupported(msg) => {
            debug!(target: "actions.dispatch", %msg, "unsupported");
            state.set_status(msg);
            DispatchResult::failed()
        }
        // Recording and playback belong to the session's input loop.
        Action::StartRecording(_)
        | Action::StopRecording
        | Action::PlayMacro { .. }
        | Action::RepeatLast { .. } => DispatchResult::clean(),
    }
}

/// `.`: replay the last change against the current cursor. `count` replaces
/// the recorded count.
fn repeat_last(count: Option<u32>, model: &mut EditorModel, ctx: &mut DispatchContext) -> DispatchResult {
    if ctx.repeat.is_replaying() {
        model.state_mut().set_status("repeat already in progress");
        return DispatchResult::failed();
    }
    if model.state().mode != Mode::Normal {
        return DispatchResult::clean();
    }
    let Some(action) = ctx.repeat.last().cloned() else {
        model.state_mut().set_status("nothing to repeat");
        return DispatchResult::failed();
    };
    debug!(target: "actions.repeat", ?action, ?count, "repeat_start");
    ctx.repeat.set_replaying(true);
    let result = replay(action, count, model, ctx);
    ctx.repeat.set_replaying(false);
    result
}

fn replay(
    action: RepeatAction,
    count: Option<u32>,
    model: &mut EditorModel,
    ctx: &mut DispatchContext,
) -> DispatchResult {
    match action {
        RepeatAction::Operator {
            op,
            target,
            count: recorded,
            register,
            inserted,
        } => {
            let count = count.unwrap_or(recorded);
            let result = match target {
                RepeatTarget::Motion(motion) => dispatch(
                    Action::ApplyOperator {
                        op,
                        motion,
                        count,
                        register,
                    },
                    model,
                    ctx,
                ),
                RepeatTarget::Line => dispatch(
                    Action::LinewiseOperator {
                        op,
                        count,
                        register,
                    },
                    model,
                    ctx,
                ),
                RepeatTarget::Object(object) => dispatch(
                    Action::ObjectOperator {
                        op,
                        object,
                        count,
                        register,
                    },
                    model,
                    ctx,
                ),
                RepeatTarget::Visual { linewise, extent } => {
                    let (state, view) = model.split_state_and_view();
                    operator::apply_region(op, linewise, extent, register, state, view, ctx)
                }
            };
            if op == OperatorKind::Change && model.state().mode == Mode::Insert {
                replay_edits(inserted.as_deref().unwrap_or_default(), model, ctx);
                dispatch(Action::ExitInsert, model, ctx);
            }
            result
        }
        RepeatAction::Insert { entry, edits } => {
            let result = dispatch(Action::EnterInsert(entry), model, ctx);
            for _ in 0..count.unwrap_or(1).max(1) {
                replay_edits(&edits, model, ctx);
            }
            dispatch(Action::ExitInsert, model, ctx);
            result
        }
        RepeatAction::DeleteChar {
            forward,
            count: recorded,
            register,
        } => dispatch(
            Action::DeleteChar {
                forward,
                count: count.unwrap_or(recorded),
                register,
            },
            model,
            ctx,
        ),
        RepeatAction::Paste {
            before,
            count: recorded,
            register,
        } => dispatch(
            Action::Paste {
                before,
                count: count.unwrap_or(recorded),
                register,
            },
            model,
            ctx,
        ),
    }
}

/// Feed recorded edit keys back through the insert-mode edit path.
fn replay_edits(edits: &[EditKind], model: &mut EditorModel, ctx: &mut DispatchContext) {
    for &kind in edits {
        dispatch(Action::Edit(kind), model, ctx);
    }
}

/// Status for a range that resolved to nothing.
pub(crate) fn nothing_to_operate(state: &mut core_state::EditorState) -> DispatchResult {
    state.set_status("nothing to operate on");
    DispatchResult::failed()
}
