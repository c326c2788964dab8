//! Scheduler observer trait and the diagnostics it receives.

use std::fmt;
use std::time::Duration;

use pt_core::{Cycle, TaskId, Timestamp};

// ── DeactivationReason ────────────────────────────────────────────────────────

/// Why a task left the active slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeactivationReason {
    /// A higher-priority task became viable.
    Preempted,
    /// The task reported itself complete.
    Completed,
    /// The task stopped being viable.
    NotViable,
    /// The scheduler was stopped.
    Stopped,
    /// The task faulted and was forcibly deactivated.
    Fault,
}

impl DeactivationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DeactivationReason::Preempted => "preempted",
            DeactivationReason::Completed => "completed",
            DeactivationReason::NotViable => "not_viable",
            DeactivationReason::Stopped   => "stopped",
            DeactivationReason::Fault     => "fault",
        }
    }
}

impl fmt::Display for DeactivationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Diagnostic ────────────────────────────────────────────────────────────────

/// The task method a fault came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FaultPhase {
    Viability,
    Activate,
    Tick,
    Deactivate,
}

/// Non-fatal conditions surfaced to the host.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A task method returned an error.  The task was deactivated (if it was
    /// active) and sits out the next cycle.
    TaskFault {
        task:    TaskId,
        name:    String,
        phase:   FaultPhase,
        message: String,
    },

    /// A task has faulted in `consecutive` evaluations in a row.
    PersistentFault {
        task:        TaskId,
        name:        String,
        consecutive: u32,
    },

    /// The spatial snapshot is older than the configured freshness bound.
    /// Raised once per transition into staleness.
    StaleData {
        age:   Duration,
        bound: Duration,
    },

    /// A deactivated task left movement holds behind; the scheduler released
    /// them.
    OrphanedHold {
        task:     TaskId,
        name:     String,
        released: u32,
    },
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Callbacks invoked by [`Scheduler`][crate::Scheduler] at key points of a
/// cycle.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — fault counter
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct FaultCounter(u32);
///
/// impl SchedulerObserver for FaultCounter {
///     fn on_diagnostic(&mut self, _cycle: Cycle, d: &Diagnostic) {
///         if matches!(d, Diagnostic::TaskFault { .. }) {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SchedulerObserver {
    /// Called at the start of each cycle, before any task is evaluated.
    fn on_cycle_start(&mut self, _cycle: Cycle, _now: Timestamp) {}

    /// Called when a task enters the active slot, just before `on_activate`.
    fn on_activated(&mut self, _cycle: Cycle, _task: TaskId, _name: &str) {}

    /// Called after a task's `on_deactivate` and hold cleanup.
    fn on_deactivated(
        &mut self,
        _cycle:  Cycle,
        _task:   TaskId,
        _name:   &str,
        _reason: DeactivationReason,
    ) {}

    fn on_diagnostic(&mut self, _cycle: Cycle, _diagnostic: &Diagnostic) {}

    /// Called at the end of each cycle with the task left active.
    fn on_cycle_end(&mut self, _cycle: Cycle, _active: Option<TaskId>) {}
}

/// A [`SchedulerObserver`] that does nothing.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl SchedulerObserver for NoopObserver {}

// ── EventLog ──────────────────────────────────────────────────────────────────

/// One recorded observer callback.
#[derive(Clone, Debug, PartialEq)]
pub enum SchedEvent {
    CycleStart(Cycle),
    Activated {
        cycle: Cycle,
        task:  TaskId,
        name:  String,
    },
    Deactivated {
        cycle:  Cycle,
        task:   TaskId,
        name:   String,
        reason: DeactivationReason,
    },
    Diagnostic(Cycle, Diagnostic),
    CycleEnd {
        cycle:  Cycle,
        active: Option<TaskId>,
    },
}

/// Observer that records every callback in order.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<SchedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded diagnostics, oldest first.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.events.iter().filter_map(|e| match e {
            SchedEvent::Diagnostic(_, d) => Some(d),
            _ => None,
        })
    }

    /// Names of activated tasks, in activation order.
    pub fn activations(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SchedEvent::Activated { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `(name, reason)` for every deactivation, in order.
    pub fn deactivations(&self) -> Vec<(&str, DeactivationReason)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SchedEvent::Deactivated { name, reason, .. } => Some((name.as_str(), *reason)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl SchedulerObserver for EventLog {
    fn on_cycle_start(&mut self, cycle: Cycle, _now: Timestamp) {
        self.events.push(SchedEvent::CycleStart(cycle));
    }

    fn on_activated(&mut self, cycle: Cycle, task: TaskId, name: &str) {
        self.events.push(SchedEvent::Activated { cycle, task, name: name.to_owned() });
    }

    fn on_deactivated(&mut self, cycle: Cycle, task: TaskId, name: &str, reason: DeactivationReason) {
        self.events.push(SchedEvent::Deactivated { cycle, task, name: name.to_owned(), reason });
    }

    fn on_diagnostic(&mut self, cycle: Cycle, diagnostic: &Diagnostic) {
        self.events.push(SchedEvent::Diagnostic(cycle, diagnostic.clone()));
    }

    fn on_cycle_end(&mut self, cycle: Cycle, active: Option<TaskId>) {
        self.events.push(SchedEvent::CycleEnd { cycle, active });
    }
}
