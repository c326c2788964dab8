//! The `Task` trait — the unit of behavior the scheduler arbitrates.

use std::fmt;

use pt_core::Timestamp;
use pt_nav::{HoldTag, Navigator};

use crate::{TaskResult, WorldContext};

// ── Priority ──────────────────────────────────────────────────────────────────

/// Ordering key.  Lower value = more urgent.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Priority(pub u32);

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// ── TaskContext ───────────────────────────────────────────────────────────────

/// What a task may touch while active: the cycle's world snapshot (read)
/// and the navigation intent channel (write).
pub struct TaskContext<'a> {
    pub world: &'a WorldContext<'a>,
    pub nav:   &'a mut dyn Navigator,
}

impl<'a> TaskContext<'a> {
    #[inline]
    pub fn new(world: &'a WorldContext<'a>, nav: &'a mut dyn Navigator) -> Self {
        Self { world, nav }
    }

    #[inline]
    pub fn now(&self) -> Timestamp {
        self.world.now
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// A prioritized candidate behavior.
///
/// # Call protocol (driven by the scheduler)
///
/// 1. Every cycle, in priority order until a candidate is found:
///    [`is_complete`][Self::is_complete], then [`is_viable`][Self::is_viable].
/// 2. On becoming the active task: [`on_activate`][Self::on_activate], once.
/// 3. Each cycle while active: [`tick`][Self::tick], always after
///    `on_activate`.
/// 4. On leaving the active slot (preempted, no longer viable, complete,
///    faulted, or scheduler stopped): [`on_deactivate`][Self::on_deactivate],
///    once.  It must cancel any open activity.
///
/// # Faults
///
/// Returning `Err` from any method makes the scheduler deactivate the task
/// and skip it for one cycle.  The scheduler itself keeps running.
///
/// # Holds
///
/// Activities opened by a task should use [`hold_tag`][Self::hold_tag] so the
/// scheduler can reclaim anything left behind after deactivation.
pub trait Task: Send + 'static {
    /// Stable, unique name.  Used in logs, diagnostics and as the hold tag.
    fn name(&self) -> &str;

    /// Task kind (`"party_wait"`, `"rest"`, …).
    fn kind(&self) -> &'static str;

    fn priority(&self) -> Priority;

    /// Reconfigure the ordering key.  Only honored between scheduler runs.
    fn set_priority(&mut self, priority: Priority);

    /// Whether the task wants to run given the current world.
    ///
    /// Must be cheap and must not change the task's state.
    fn is_viable(&self, world: &WorldContext<'_>) -> TaskResult<bool>;

    /// Called once on transition to active.
    fn on_activate(&mut self, _ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        Ok(())
    }

    /// Called once on transition away from active.
    fn on_deactivate(&mut self, nav: &mut dyn Navigator) -> TaskResult<()>;

    /// One increment of work.  Must not block.
    fn tick(&mut self, ctx: &mut TaskContext<'_>) -> TaskResult<()>;

    /// `true` once the task has finished its work.  A complete task is
    /// skipped even if [`is_viable`][Self::is_viable] still says yes.
    fn is_complete(&self) -> bool {
        false
    }

    /// Clear completion.  The scheduler calls this when a complete task is
    /// observed not viable, so it can run again once it becomes viable on a
    /// later cycle.
    ///
    /// Returns `true` if the task is eligible again.  One-shot tasks keep the
    /// default, which never re-arms.
    fn rearm(&mut self) -> bool {
        false
    }

    fn hold_tag(&self) -> HoldTag {
        HoldTag::new(self.name())
    }
}
