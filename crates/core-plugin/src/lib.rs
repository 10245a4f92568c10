//! Collaborator seams for scripting, plugins and syntax services.
//!
//! Everything here is instance-owned: a session carries its own hook
//! registry, callback invoker and syntax service, so two sessions (e.g. in
//! tests) never observe each other's registrations. Callbacks receive the
//! session as `&mut dyn EditorContext` for the duration of one call only; no
//! collaborator keeps a pointer back into the editor.
//!
//! This crate depends on nothing editor-specific so the scripting runtime can
//! implement `CallbackInvoker` without pulling in the editing core.

use std::collections::HashMap;

use tracing::{debug, trace};

/// Narrow editing surface exposed to scripting callbacks. Offsets and columns
/// are rune based and validated exactly like the buffer primitives.
pub trait EditorContext {
    fn text(&self) -> String;
    fn set_text(&mut self, text: &str) -> anyhow::Result<()>;
    fn line(&self, line: usize) -> anyhow::Result<String>;
    fn set_line(&mut self, line: usize, text: &str) -> anyhow::Result<()>;
    /// Cursor as (line, column).
    fn cursor(&self) -> (usize, usize);
    fn set_cursor(&mut self, line: usize, col: usize) -> anyhow::Result<()>;
    fn insert(&mut self, pos: usize, text: &str) -> anyhow::Result<()>;
    fn delete(&mut self, start: usize, end: usize) -> anyhow::Result<()>;
    fn mode_name(&self) -> &'static str;
    fn set_mode_name(&mut self, name: &str) -> anyhow::Result<()>;
}

/// Opaque handle to a function owned by the scripting runtime. The core never
/// looks inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(pub u64);

/// A command is either a built-in editor action or a scripted callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<B> {
    Builtin(B),
    Callback(CallbackHandle),
}

/// Capability that resolves callback handles. Injected into the session.
pub trait CallbackInvoker {
    fn invoke(&mut self, handle: CallbackHandle, ctx: &mut dyn EditorContext)
    -> anyhow::Result<()>;
}

/// Editor events that scripted hooks can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// Buffer revision changed while processing a key.
    TextChanged,
    /// Mode differs from the mode before the key.
    ModeChanged,
}

/// Per-session hook table.
#[derive(Debug, Default)]
pub struct HookRegistry {
    hooks: HashMap<HookEvent, Vec<CallbackHandle>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, event: HookEvent, handle: CallbackHandle) {
        debug!(target: "plugin.hooks", ?event, handle = handle.0, "hook_registered");
        self.hooks.entry(event).or_default().push(handle);
    }

    /// Remove every registration of `handle`; returns how many were dropped.
    pub fn unregister(&mut self, handle: CallbackHandle) -> usize {
        let mut removed = 0;
        for list in self.hooks.values_mut() {
            let before = list.len();
            list.retain(|h| *h != handle);
            removed += before - list.len();
        }
        removed
    }

    /// Handles for `event` in registration order.
    pub fn handles(&self, event: HookEvent) -> Vec<CallbackHandle> {
        let out = self.hooks.get(&event).cloned().unwrap_or_default();
        trace!(target: "plugin.hooks", ?event, count = out.len(), "hooks_resolved");
        out
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.values().all(Vec::is_empty)
    }
}

/// Highlight or fold span reported by a syntax service, in UTF-8 byte offsets
/// of the snapshot it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start_byte: usize,
    pub end_byte: usize,
    pub category: String,
}

/// Incremental-parsing collaborator fed with a full text snapshot after each
/// change.
pub trait SyntaxService {
    fn name(&self) -> &'static str;
    fn parse(&mut self, text: &str) -> Vec<HighlightSpan>;
}

/// Default service: no highlighting.
#[derive(Debug, Default)]
pub struct NoopSyntaxService;

impl SyntaxService for NoopSyntaxService {
    fn name(&self) -> &'static str {
        "noop-syntax"
    }
    fn parse(&mut self, _text: &str) -> Vec<HighlightSpan> {
        Vec::new()
    }
}

/// A collection-oriented plugin host. Implementors discover plugins and let
/// them register hooks against the session's registry.
pub trait PluginHost {
    /// Stable human-readable host identifier (for logs / diagnostics).
    fn name(&self) -> &'static str;
    /// Load plugins and register their hooks. Implementors SHOULD be
    /// idempotent; repeated calls must not duplicate registrations.
    fn load_all(&mut self, hooks: &mut HookRegistry) -> anyhow::Result<()>;
}

impl<T: PluginHost + ?Sized> PluginHost for &mut T {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn load_all(&mut self, hooks: &mut HookRegistry) -> anyhow::Result<()> {
        (**self).load_all(hooks)
    }
}

/// No-op host used when no plugin runtime is embedded.
#[derive(Default)]
pub struct NoopPluginHost {
    loaded: bool,
}

impl NoopPluginHost {
    pub fn new() -> Self {
        Self { loaded: false }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

impl PluginHost for NoopPluginHost {
    fn name(&self) -> &'static str {
        "noop-plugin-host"
    }
    fn load_all(&mut self, _hooks: &mut HookRegistry) -> anyhow::Result<()> {
        self.loaded = true;
        Ok(())
    }
}
