//! `NavRecorder` — a navigator that remembers what it was told.

use pt_core::Position;

use crate::{HoldTag, NavIntent, Navigator};

/// Records every intent in arrival order.
///
/// Serves as the navigation fake in tests and as a trace sink in the demo.
#[derive(Debug, Default)]
pub struct NavRecorder {
    pub intents: Vec<NavIntent>,
}

impl NavRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `Hold` intents recorded.
    pub fn holds(&self) -> usize {
        self.intents.iter().filter(|i| matches!(i, NavIntent::Hold(_))).count()
    }

    /// Number of `Release` intents recorded.
    pub fn releases(&self) -> usize {
        self.intents.iter().filter(|i| matches!(i, NavIntent::Release(_))).count()
    }

    /// Holds minus releases, per the whole recording.
    pub fn net_holds(&self) -> isize {
        self.holds() as isize - self.releases() as isize
    }

    /// Take and clear the recording.
    pub fn drain(&mut self) -> Vec<NavIntent> {
        std::mem::take(&mut self.intents)
    }

    pub fn last(&self) -> Option<&NavIntent> {
        self.intents.last()
    }
}

impl Navigator for NavRecorder {
    fn hold_position(&mut self, tag: &HoldTag) {
        self.intents.push(NavIntent::Hold(tag.clone()));
    }

    fn release_hold(&mut self, tag: &HoldTag) {
        self.intents.push(NavIntent::Release(tag.clone()));
    }

    fn move_toward(&mut self, target: Position) {
        self.intents.push(NavIntent::MoveToward(target));
    }

    fn follow_route(&mut self) {
        self.intents.push(NavIntent::FollowRoute);
    }
}
