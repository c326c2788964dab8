//! The `Navigator` trait — intents the controller may emit.

use std::borrow::Borrow;
use std::fmt;

use pt_core::Position;

// ── HoldTag ───────────────────────────────────────────────────────────────────

/// Reason tag attached to a movement hold.  By convention the owning task's
/// name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HoldTag(String);

impl HoldTag {
    pub fn new(tag: impl Into<String>) -> Self {
        HoldTag(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HoldTag {
    fn from(s: &str) -> Self {
        HoldTag(s.to_owned())
    }
}

impl Borrow<str> for HoldTag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HoldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── NavIntent ─────────────────────────────────────────────────────────────────

/// One navigation intent, as recorded by [`NavRecorder`][crate::NavRecorder].
#[derive(Clone, Debug, PartialEq)]
pub enum NavIntent {
    /// Stop and stay put until released.
    Hold(HoldTag),
    /// Drop one hold previously placed under this tag.
    Release(HoldTag),
    /// Head toward `target` (e.g. a resource node), leaving the route.
    MoveToward(Position),
    /// Resume playback of the current route.
    FollowRoute,
}

// ── Navigator ─────────────────────────────────────────────────────────────────

/// Consumer of navigation intents, implemented by the host's movement
/// subsystem.
///
/// # Contract
///
/// - Calls are fire-and-forget: they must not block.
/// - Holds nest per tag.  Movement of any kind is suppressed while at least
///   one hold is outstanding.
pub trait Navigator {
    fn hold_position(&mut self, tag: &HoldTag);

    fn release_hold(&mut self, tag: &HoldTag);

    fn move_toward(&mut self, target: Position);

    fn follow_route(&mut self);
}

/// A [`Navigator`] that drops every intent.
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn hold_position(&mut self, _tag: &HoldTag) {}

    fn release_hold(&mut self, _tag: &HoldTag) {}

    fn move_toward(&mut self, _target: Position) {}

    fn follow_route(&mut self) {}
}
