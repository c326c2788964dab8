//! Read-only world snapshot passed to every task callback.

use std::time::Duration;

use pt_core::{Cycle, Position, Timestamp};
use pt_spatial::{EntityFilter, NearbyEntity, SpatialQuery};

/// The controlled agent's own state, as sampled by the host this cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    pub position: Position,
    /// Health as a fraction in `[0.0, 1.0]`.
    pub health:   f32,
}

impl AgentState {
    /// A full-health agent at `position`.
    pub fn at(position: Position) -> Self {
        Self { position, health: 1.0 }
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health.clamp(0.0, 1.0);
        self
    }
}

/// A read-only snapshot of the world for one scheduler cycle.
///
/// Built by the host, stamped with the cycle number and freshness bound by
/// the scheduler, and shared immutably with every task evaluated that cycle.
///
/// # Lifetimes
///
/// Both borrows live for one cycle.  The host must not refresh the spatial
/// collaborator while a cycle is in progress; the borrow checker enforces
/// this for single-threaded hosts.
#[derive(Clone, Copy)]
pub struct WorldContext<'a> {
    /// Host time of this cycle.
    pub now: Timestamp,

    /// Scheduler cycle number (zero until the scheduler stamps it).
    pub cycle: Cycle,

    pub agent: &'a AgentState,

    pub spatial: &'a dyn SpatialQuery,

    /// Spatial data older than this counts as stale.
    pub stale_after: Duration,
}

impl<'a> WorldContext<'a> {
    pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(1);

    #[inline]
    pub fn new(now: Timestamp, agent: &'a AgentState, spatial: &'a dyn SpatialQuery) -> Self {
        Self {
            now,
            cycle: Cycle::ZERO,
            agent,
            spatial,
            stale_after: Self::DEFAULT_STALE_AFTER,
        }
    }

    /// Copy of `self` stamped for a given cycle and freshness bound.
    #[inline]
    pub fn stamped(self, cycle: Cycle, stale_after: Duration) -> Self {
        Self { cycle, stale_after, ..self }
    }

    /// Entities accepted by `filter`, measured from the agent.
    pub fn nearby(&self, filter: &EntityFilter) -> Vec<NearbyEntity> {
        self.spatial.nearby_entities(self.agent.position, filter)
    }

    /// Age of the spatial snapshot, or `None` if it was never refreshed.
    pub fn spatial_age(&self) -> Option<Duration> {
        self.spatial.age(self.now)
    }

    /// `true` if the spatial snapshot is older than `stale_after`.
    ///
    /// Stale data is valid but uncertain.  Tasks should lean toward
    /// inaction on it rather than ignoring it outright.
    pub fn is_spatial_stale(&self) -> bool {
        self.spatial.is_stale(self.now, self.stale_after)
    }
}
