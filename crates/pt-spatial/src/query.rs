//! The `SpatialQuery` trait — the only view of the world tasks get.

use std::time::Duration;

use pt_core::{Position, Timestamp};

use crate::{EntityFilter, NearbyEntity};

/// Read-only, point-in-time proximity queries over tracked entities.
///
/// Implementations are refreshed by their owner on a cadence the controller
/// does not know about.  Callers must tolerate results that are empty or a
/// little old; [`refreshed_at`][Self::refreshed_at] lets them judge how old.
///
/// # Contract
///
/// - Results are ordered by ascending distance from `origin`, ties by id.
/// - Queries never mutate the snapshot and never block.
pub trait SpatialQuery {
    /// Entities accepted by `filter`, measured from `origin`.
    fn nearby_entities(&self, origin: Position, filter: &EntityFilter) -> Vec<NearbyEntity>;

    /// Host time of the snapshot being served, or `None` if the collaborator
    /// has never been refreshed.
    fn refreshed_at(&self) -> Option<Timestamp>;

    /// Age of the snapshot at `now`, or `None` if never refreshed.
    fn age(&self, now: Timestamp) -> Option<Duration> {
        self.refreshed_at().map(|t| now.saturating_since(t))
    }

    /// `true` if the snapshot is older than `bound` at `now`.  A never
    /// refreshed snapshot is not stale; it is simply empty.
    fn is_stale(&self, now: Timestamp, bound: Duration) -> bool {
        self.age(now).is_some_and(|age| age > bound)
    }
}

/// A [`SpatialQuery`] with nothing in it.
///
/// Useful as a placeholder for hosts without trackers and in tests that only
/// exercise agent-state driven tasks.
pub struct EmptyWorld;

impl SpatialQuery for EmptyWorld {
    fn nearby_entities(&self, _origin: Position, _filter: &EntityFilter) -> Vec<NearbyEntity> {
        vec![]
    }

    fn refreshed_at(&self) -> Option<Timestamp> {
        None
    }
}
