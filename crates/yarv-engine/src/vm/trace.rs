//! Execution trace hooks
//!
//! Some instructions can dispatch trace events (the `line` event of
//! `putobject`). A hook observes them; it has no access to the stack.

use std::fmt;

/// Event dispatched to a [`TraceHook`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// A new source line begins at the instruction about to run
    Line {
        /// Mnemonic of the dispatching instruction
        instruction: &'static str,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Line { instruction } => write!(f, "line ({})", instruction),
        }
    }
}

/// Observer of trace events
pub trait TraceHook: Send + Sync {
    /// Called synchronously when an instruction dispatches `event`
    fn on_event(&self, event: &TraceEvent);
}

impl<F> TraceHook for F
where
    F: Fn(&TraceEvent) + Send + Sync,
{
    fn on_event(&self, event: &TraceEvent) {
        self(event)
    }
}
