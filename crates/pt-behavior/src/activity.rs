//! `Activity` — "wait until C holds, optionally with a timeout".
//!
//! # Lifecycle
//!
//! ```text
//!            open()            condition holds
//!   ─────────────────▶ Pending ─────────────────▶ Resolved
//!     hold_position      │  │      cancel()          ▲
//!                        │  └────────────────────────┘
//!                        │  deadline passed
//!                        └──────────────────▶ TimedOut
//! ```
//!
//! Both terminal transitions release the hold exactly once.  Terminal states
//! are sticky: further polls and cancels return the same state and emit
//! nothing.
//!
//! An activity without a timeout waits indefinitely.  Tasks that want a
//! fallback bound pass one explicitly.

use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use pt_core::Timestamp;
use pt_nav::{HoldTag, Navigator};

use crate::{ActivityError, ActivityResult, WorldContext};

// ── Resolution ────────────────────────────────────────────────────────────────

/// Where an activity is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    Pending,
    Resolved,
    TimedOut,
}

impl Resolution {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Resolution::Pending)
    }
}

// ── Condition ─────────────────────────────────────────────────────────────────

type Predicate = Box<dyn Fn(&WorldContext<'_>) -> bool + Send>;

/// The predicate an activity waits on.
pub enum Condition {
    /// Never holds.  Only valid together with a timeout, where it turns the
    /// activity into a plain timed pause.
    Never,
    /// Holds when the predicate returns `true` for the current world.
    When(Predicate),
}

impl Condition {
    pub fn when<F>(f: F) -> Self
    where
        F: Fn(&WorldContext<'_>) -> bool + Send + 'static,
    {
        Condition::When(Box::new(f))
    }

    #[inline]
    pub fn holds(&self, world: &WorldContext<'_>) -> bool {
        match self {
            Condition::Never   => false,
            Condition::When(f) => f(world),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Never   => f.write_str("Never"),
            Condition::When(_) => f.write_str("When(..)"),
        }
    }
}

// ── Activity ──────────────────────────────────────────────────────────────────

/// A pending wait that holds the agent in place while open.
///
/// Owned by exactly one task.  The owner must either poll it to a terminal
/// state or [`cancel`][Self::cancel] it before dropping it; dropping an
/// activity that still holds is logged and leaves the hold for the
/// scheduler to clean up.
#[derive(Debug)]
pub struct Activity {
    tag:       HoldTag,
    condition: Condition,
    opened_at: Timestamp,
    deadline:  Option<Timestamp>,
    state:     Resolution,
    holding:   bool,
}

impl Activity {
    /// Begin waiting on `condition`, placing a hold under `tag`.
    ///
    /// Fails with [`ActivityError::InvalidCondition`] for
    /// [`Condition::Never`] without a timeout: it could never end.
    pub fn open(
        tag:       HoldTag,
        condition: Condition,
        timeout:   Option<Duration>,
        now:       Timestamp,
        nav:       &mut dyn Navigator,
    ) -> ActivityResult<Self> {
        if matches!(condition, Condition::Never) && timeout.is_none() {
            return Err(ActivityError::InvalidCondition(tag.to_string()));
        }
        nav.hold_position(&tag);
        debug!(%tag, %now, ?timeout, "activity opened");
        Ok(Self {
            tag,
            condition,
            opened_at: now,
            deadline: timeout.map(|t| now + t),
            state: Resolution::Pending,
            holding: true,
        })
    }

    /// Re-evaluate against `world`.
    ///
    /// `Pending → Resolved` if the condition now holds, otherwise
    /// `Pending → TimedOut` once the deadline has been reached.  Terminal
    /// states are returned unchanged.
    pub fn poll(&mut self, world: &WorldContext<'_>, nav: &mut dyn Navigator) -> Resolution {
        if self.state.is_terminal() {
            return self.state;
        }
        if self.condition.holds(world) {
            self.finish(Resolution::Resolved, nav);
        } else if self.deadline.is_some_and(|d| world.now >= d) {
            self.finish(Resolution::TimedOut, nav);
        }
        self.state
    }

    /// Force resolution regardless of the condition.  Releases the hold if
    /// the activity was still pending.
    pub fn cancel(&mut self, nav: &mut dyn Navigator) {
        if !self.state.is_terminal() {
            self.finish(Resolution::Resolved, nav);
        }
    }

    #[inline]
    pub fn state(&self) -> Resolution {
        self.state
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.state == Resolution::Pending
    }

    /// `true` while this activity's hold is in place.
    #[inline]
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    pub fn tag(&self) -> &HoldTag {
        &self.tag
    }

    pub fn opened_at(&self) -> Timestamp {
        self.opened_at
    }

    pub fn deadline(&self) -> Option<Timestamp> {
        self.deadline
    }

    fn finish(&mut self, state: Resolution, nav: &mut dyn Navigator) {
        self.state = state;
        if self.holding {
            nav.release_hold(&self.tag);
            self.holding = false;
        }
        debug!(tag = %self.tag, ?state, "activity finished");
    }
}

impl Drop for Activity {
    fn drop(&mut self) {
        if self.holding {
            warn!(tag = %self.tag, "activity dropped while still holding position");
        }
    }
}

/// Cancel and discard the activity in `slot`, if any.
///
/// The usual body of a task's `on_deactivate`.
pub fn cancel_pending(slot: &mut Option<Activity>, nav: &mut dyn Navigator) {
    if let Some(mut activity) = slot.take() {
        activity.cancel(nav);
    }
}
