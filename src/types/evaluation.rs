use std::fmt;

use super::node::ActionDescriptor;
use super::trace::{StopKind, TraceEntry};

/// The result of one interpreter run: the recommended actions and the full
/// execution trace, in order.
///
/// A run that hit a safety stop still produces a valid `Evaluation`; the
/// terminal trace entry carries the stop kind and reason, and
/// [`stopped()`](Evaluation::stopped) reports it directly.
#[derive(Debug, Clone)]
#[must_use]
pub struct Evaluation {
    actions: Vec<ActionDescriptor>,
    trace: Vec<TraceEntry>,
    stopped: Option<StopKind>,
}

impl Evaluation {
    pub(crate) fn new(
        actions: Vec<ActionDescriptor>,
        trace: Vec<TraceEntry>,
        stopped: Option<StopKind>,
    ) -> Self {
        Self {
            actions,
            trace,
            stopped,
        }
    }

    /// Recommended actions, in emission order. Empty only for an abstain or
    /// safety-stop-only outcome.
    #[must_use]
    pub fn actions(&self) -> &[ActionDescriptor] {
        &self.actions
    }

    /// The complete execution trace.
    #[must_use]
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// The safety stop that terminated the run, if any.
    #[must_use]
    pub fn stopped(&self) -> Option<StopKind> {
        self.stopped
    }

    /// Whether the run ended in a safety stop rather than an action node.
    #[must_use]
    pub fn is_safety_stopped(&self) -> bool {
        self.stopped.is_some()
    }

    /// Consume the evaluation, yielding owned actions and trace.
    #[must_use]
    pub fn into_parts(self) -> (Vec<ActionDescriptor>, Vec<TraceEntry>) {
        (self.actions, self.trace)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stopped {
            Some(kind) => write!(f, "safety stop ({kind:?})")?,
            None => write!(f, "terminated")?,
        }
        write!(
            f,
            ", {} actions, {} trace entries",
            self.actions.len(),
            self.trace.len()
        )
    }
}
