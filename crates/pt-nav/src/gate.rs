//! `HoldGate` — hold bookkeeping in front of the host navigator.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use pt_core::Position;

use crate::{HoldTag, Navigator};

/// Wraps the host's [`Navigator`] and counts outstanding holds per tag.
///
/// Releases without a matching hold are dropped instead of forwarded, so the
/// host never sees more releases than holds for a tag.
pub struct HoldGate<N: Navigator> {
    inner:       N,
    outstanding: BTreeMap<HoldTag, u32>,
}

impl<N: Navigator> HoldGate<N> {
    pub fn new(inner: N) -> Self {
        Self { inner, outstanding: BTreeMap::new() }
    }

    /// Holds currently placed under `tag`.
    pub fn outstanding(&self, tag: &str) -> u32 {
        self.outstanding.get(tag).copied().unwrap_or(0)
    }

    /// Total holds across all tags.
    pub fn total_outstanding(&self) -> u32 {
        self.outstanding.values().sum()
    }

    /// `true` while any hold is outstanding.
    pub fn is_holding(&self) -> bool {
        !self.outstanding.is_empty()
    }

    /// Release every hold under `tag`, forwarding one release per hold.
    /// Returns how many were released.
    pub fn release_all(&mut self, tag: &HoldTag) -> u32 {
        let n = self.outstanding.remove(tag.as_str()).unwrap_or(0);
        for _ in 0..n {
            self.inner.release_hold(tag);
        }
        n
    }

    pub fn inner(&self) -> &N {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut N {
        &mut self.inner
    }

    pub fn into_inner(self) -> N {
        self.inner
    }
}

impl<N: Navigator> Navigator for HoldGate<N> {
    fn hold_position(&mut self, tag: &HoldTag) {
        let n = self.outstanding.entry(tag.clone()).or_insert(0);
        *n += 1;
        debug!(%tag, outstanding = *n, "hold position");
        self.inner.hold_position(tag);
    }

    fn release_hold(&mut self, tag: &HoldTag) {
        let Some(n) = self.outstanding.get_mut(tag.as_str()) else {
            warn!(%tag, "release without matching hold dropped");
            return;
        };
        *n -= 1;
        let left = *n;
        if left == 0 {
            self.outstanding.remove(tag.as_str());
        }
        debug!(%tag, outstanding = left, "release hold");
        self.inner.release_hold(tag);
    }

    fn move_toward(&mut self, target: Position) {
        if self.is_holding() {
            debug!(%target, "move_toward while holding; navigation will defer it");
        }
        self.inner.move_toward(target);
    }

    fn follow_route(&mut self) {
        self.inner.follow_route();
    }
}
