//! Editing session: owns the model and every piece of per-editor state, and
//! runs the single-threaded input loop.
//!
//! Keys enter a queue tagged with their origin. Macro playback pushes the
//! slot's keys to the front of the same queue, so replayed keys are
//! translated and dispatched exactly like typed ones. Each key is processed
//! to completion before the next is taken.

use std::collections::{HashMap, VecDeque};

use anyhow::{Context, bail};
use core_config::Config;
use core_events::{InputOrigin, KeyEvent, KeyParseError, QueuedKey, parse_keys};
use core_model::EditorModel;
use core_plugin::{
    CallbackHandle, CallbackInvoker, Command, EditorContext, HighlightSpan, HookEvent,
    HookRegistry, NoopSyntaxService, PluginHost, SyntaxService,
};
use core_state::{EditorState, Mode};
use core_text::{Buffer, Position};
use tracing::{debug, trace, warn};

use crate::dispatcher::{DispatchContext, DispatchResult, EditOptions, dispatch};
use crate::{Action, InsertEntry, KeyTranslator, MacroRecorder, VisualKind};

pub struct Session {
    model: EditorModel,
    translator: KeyTranslator,
    ctx: DispatchContext,
    macros: MacroRecorder,
    queue: VecDeque<QueuedKey>,
    /// Macro keys still queued; `@` is refused while non-zero.
    macro_keys_pending: usize,
    hooks: HookRegistry,
    invoker: Option<Box<dyn CallbackInvoker>>,
    syntax: Box<dyn SyntaxService>,
    highlights: Vec<HighlightSpan>,
    mappings: HashMap<KeyEvent, Command<Action>>,
}

impl Session {
    pub fn new(buffer: Buffer) -> Self {
        Self::with_config(buffer, &Config::default())
    }

    pub fn with_config(buffer: Buffer, config: &Config) -> Self {
        let state = EditorState::with_history(buffer, config.undo().max_groups);
        let mut session = Self {
            model: EditorModel::new(state),
            translator: KeyTranslator::new(),
            ctx: DispatchContext::new(EditOptions::from(config.editor())),
            macros: MacroRecorder::new(),
            queue: VecDeque::new(),
            macro_keys_pending: 0,
            hooks: HookRegistry::new(),
            invoker: None,
            syntax: Box::new(NoopSyntaxService),
            highlights: Vec::new(),
            mappings: HashMap::new(),
        };
        session.reparse();
        session
    }

    pub fn model(&self) -> &EditorModel {
        &self.model
    }

    pub fn text(&self) -> String {
        self.model.state().buffer().text()
    }

    pub fn cursor_offset(&self) -> usize {
        self.model.cursor()
    }

    pub fn position(&self) -> Position {
        self.model.cursor_position()
    }

    pub fn mode(&self) -> Mode {
        self.model.state().mode
    }

    pub fn status(&self) -> Option<&str> {
        self.model.state().status()
    }

    pub fn highlights(&self) -> &[HighlightSpan] {
        &self.highlights
    }

    pub fn macros(&self) -> &MacroRecorder {
        &self.macros
    }

    pub fn macros_mut(&mut self) -> &mut MacroRecorder {
        &mut self.macros
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn set_invoker(&mut self, invoker: Box<dyn CallbackInvoker>) {
        self.invoker = Some(invoker);
    }

    pub fn set_syntax_service(&mut self, service: Box<dyn SyntaxService>) {
        debug!(target: "session", service = service.name(), "syntax_service_set");
        self.syntax = service;
        self.reparse();
    }

    pub fn load_plugins(&mut self, host: &mut dyn PluginHost) -> anyhow::Result<()> {
        debug!(target: "plugin.hooks", host = host.name(), "plugins_loading");
        host.load_all(&mut self.hooks)
            .with_context(|| format!("plugin host {} failed to load", host.name()))
    }

    /// Bind a normal-mode key. Mappings apply only when no command is pending.
    pub fn map_key(&mut self, key: KeyEvent, command: Command<Action>) {
        self.mappings.insert(key, command);
    }

    /// Feed one user key and process everything it queues.
    pub fn feed(&mut self, event: KeyEvent) {
        self.queue.push_back(QueuedKey {
            event,
            origin: InputOrigin::User,
        });
        self.drain();
    }

    /// Feed a key script in Vim notation (`"ayy`, `I#<Esc>j`).
    pub fn feed_keys(&mut self, notation: &str) -> Result<(), KeyParseError> {
        for event in parse_keys(notation)? {
            self.feed(event);
        }
        Ok(())
    }

    /// Run a command outside the key path (scripted bindings, embedders).
    pub fn run_command(&mut self, command: Command<Action>) -> DispatchResult {
        let revision = self.model.state().revision();
        let mode = self.mode();
        let result = match command {
            Command::Builtin(action) => dispatch(action, &mut self.model, &mut self.ctx),
            Command::Callback(handle) => self.invoke(handle),
        };
        self.after_key(revision, mode);
        result
    }

    fn drain(&mut self) {
        while let Some(key) = self.queue.pop_front() {
            self.process(key);
        }
    }

    fn process(&mut self, key: QueuedKey) {
        trace!(target: "session", ?key, "key");
        if key.origin == InputOrigin::Macro {
            self.macro_keys_pending = self.macro_keys_pending.saturating_sub(1);
        } else if self.macros.is_recording() {
            self.macros.capture(key.event);
        }
        let revision = self.model.state().revision();
        let mode = self.mode();

        let mapped = if mode == Mode::Normal && self.translator.is_idle() {
            self.mappings.get(&key.event).cloned()
        } else {
            None
        };
        let result = match mapped {
            Some(Command::Builtin(action)) => {
                self.model.state_mut().clear_status();
                dispatch(action, &mut self.model, &mut self.ctx)
            }
            Some(Command::Callback(handle)) => self.invoke(handle),
            None => {
                let recording = self.macros.is_recording();
                match self.translator.translate(mode, &key.event, recording) {
                    Some(action) => {
                        self.model.state_mut().clear_status();
                        self.run_action(action, key.origin)
                    }
                    None => DispatchResult::clean(),
                }
            }
        };

        if result.failed && key.origin == InputOrigin::Macro {
            self.abort_macro();
        }
        self.after_key(revision, mode);
    }

    fn run_action(&mut self, action: Action, origin: InputOrigin) -> DispatchResult {
        match action {
            Action::StartRecording(slot) => {
                self.macros.start(slot);
                self.model
                    .state_mut()
                    .set_status(format!("recording @{slot}"));
                DispatchResult::clean()
            }
            Action::StopRecording => {
                self.macros.stop();
                DispatchResult::clean()
            }
            Action::PlayMacro { slot, count } => self.play_macro(slot, count, origin),
            action => dispatch(action, &mut self.model, &mut self.ctx),
        }
    }

    fn play_macro(&mut self, slot: Option<char>, count: u32, origin: InputOrigin) -> DispatchResult {
        if origin == InputOrigin::Macro || self.macro_keys_pending > 0 {
            self.model
                .state_mut()
                .set_status("macro playback already in progress");
            return DispatchResult::failed();
        }
        let Some(slot) = self.macros.resolve_play_slot(slot) else {
            self.model.state_mut().set_status("no previous macro");
            return DispatchResult::failed();
        };
        let events = self.macros.get(slot).unwrap_or_default().to_vec();
        if events.is_empty() {
            return DispatchResult::clean();
        }
        let times = count.max(1) as usize;
        debug!(target: "actions.macro", slot = %slot, events = events.len(), times, "playback_started");
        for _ in 0..times {
            for event in events.iter().rev() {
                self.queue.push_front(QueuedKey {
                    event: *event,
                    origin: InputOrigin::Macro,
                });
            }
        }
        self.macro_keys_pending += events.len() * times;
        DispatchResult::clean()
    }

    /// Drop the rest of a failing macro and whatever it left pending.
    fn abort_macro(&mut self) {
        let mut dropped = 0;
        while self
            .queue
            .front()
            .is_some_and(|k| k.origin == InputOrigin::Macro)
        {
            self.queue.pop_front();
            dropped += 1;
        }
        self.macro_keys_pending = 0;
        self.translator.reset();
        debug!(target: "actions.macro", dropped, "playback_aborted");
    }

    fn after_key(&mut self, revision: u64, mode: Mode) {
        if self.model.state().revision() != revision {
            self.reparse();
            self.fire(HookEvent::TextChanged);
        }
        if self.mode() != mode {
            self.fire(HookEvent::ModeChanged);
        }
    }

    fn reparse(&mut self) {
        let text = self.model.state().buffer().text();
        self.highlights = self.syntax.parse(&text);
    }

    fn fire(&mut self, event: HookEvent) {
        for handle in self.hooks.handles(event) {
            self.invoke(handle);
        }
    }

    /// Run a scripted callback with the session lent out as its context.
    fn invoke(&mut self, handle: CallbackHandle) -> DispatchResult {
        let Some(mut invoker) = self.invoker.take() else {
            warn!(target: "plugin.hooks", handle = handle.0, "no_invoker");
            self.model.state_mut().set_status("no script runtime");
            return DispatchResult::failed();
        };
        let result = invoker.invoke(handle, self);
        self.invoker = Some(invoker);
        match result {
            Ok(()) => DispatchResult::dirty(),
            Err(e) => {
                warn!(target: "plugin.hooks", handle = handle.0, error = %e, "callback_failed");
                self.model.state_mut().set_status(format!("callback failed: {e}"));
                DispatchResult::failed()
            }
        }
    }

    /// One undo group around a scripted mutation.
    fn grouped<T>(
        &mut self,
        f: impl FnOnce(&mut EditorState) -> Result<T, core_text::TextError>,
    ) -> anyhow::Result<T> {
        let cursor = self.model.cursor();
        let (state, view) = self.model.split_state_and_view();
        state.begin_group(cursor);
        let result = f(state);
        state.end_group();
        if state.mode == Mode::Insert {
            view.clamp(state.buffer());
        } else {
            view.normalize_for_normal(state.buffer());
        }
        Ok(result?)
    }
}

impl EditorContext for Session {
    fn text(&self) -> String {
        Session::text(self)
    }

    fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
        let cursor = self.model.cursor();
        self.grouped(|state| state.replace_all(text, cursor))
    }

    fn line(&self, line: usize) -> anyhow::Result<String> {
        Ok(self.model.state().buffer().line_text(line)?)
    }

    fn set_line(&mut self, line: usize, text: &str) -> anyhow::Result<()> {
        self.grouped(|state| {
            let buf = state.buffer();
            let start = buf.line_start_offset(line)?;
            let end = buf.line_end_offset(line)?;
            state.delete(start, end)?;
            state.insert(start, text)
        })
    }

    fn cursor(&self) -> (usize, usize) {
        let pos = self.position();
        (pos.line, pos.col)
    }

    fn set_cursor(&mut self, line: usize, col: usize) -> anyhow::Result<()> {
        let (state, view) = self.model.split_state_and_view();
        view.cursor = state.buffer().line_col_to_offset(line, col)?;
        view.sticky_col = None;
        if state.mode != Mode::Insert {
            view.normalize_for_normal(state.buffer());
        }
        Ok(())
    }

    fn insert(&mut self, pos: usize, text: &str) -> anyhow::Result<()> {
        self.grouped(|state| state.insert(pos, text))
    }

    fn delete(&mut self, start: usize, end: usize) -> anyhow::Result<()> {
        self.grouped(|state| state.delete(start, end).map(|_| ()))
    }

    fn mode_name(&self) -> &'static str {
        self.mode().name()
    }

    fn set_mode_name(&mut self, name: &str) -> anyhow::Result<()> {
        let Some(target) = Mode::from_name(name) else {
            bail!("unknown mode {name:?}");
        };
        let current = self.mode();
        if current == target {
            return Ok(());
        }
        if current == Mode::Insert {
            dispatch(Action::ExitInsert, &mut self.model, &mut self.ctx);
        } else if current.is_visual() && !target.is_visual() {
            dispatch(Action::ExitVisual, &mut self.model, &mut self.ctx);
        }
        let step = match target {
            Mode::Normal => None,
            Mode::Insert => Some(Action::EnterInsert(InsertEntry::Insert)),
            Mode::VisualChar => Some(Action::EnterVisual(VisualKind::Char)),
            Mode::VisualLine => Some(Action::EnterVisual(VisualKind::Line)),
        };
        if let Some(action) = step {
            dispatch(action, &mut self.model, &mut self.ctx);
        }
        self.translator.reset();
        Ok(())
    }
}
