//! Reference tracker: an R-tree indexed snapshot of nearby entities.
//!
//! # Refresh model
//!
//! The host calls [`EntityTracker::refresh`] with a complete scan whenever
//! [`EntityTracker::is_refresh_due`] says so.  Each refresh replaces the
//! previous snapshot wholesale and rebuilds the index with a bulk load, which
//! is cheaper than incremental updates at the sizes involved (tens to a few
//! hundred entities).
//!
//! The tracker's refresh interval is independent of the scheduler cadence;
//! the scheduler may evaluate several times against one snapshot.

use std::collections::HashSet;
use std::time::Duration;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use tracing::trace;

use pt_core::{EntityId, Position, Timestamp};

use crate::{Entity, EntityFilter, NearbyEntity, SpatialError, SpatialQuery, SpatialResult};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: the entity's position and its index into the
/// snapshot `Vec`.
#[derive(Clone)]
struct EntityEntry {
    point: [f32; 3],
    slot:  usize,
}

impl RTreeObject for EntityEntry {
    type Envelope = AABB<[f32; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for EntityEntry {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        Position::from(self.point).distance_sq(Position::from(*point))
    }
}

// ── EntityTracker ─────────────────────────────────────────────────────────────

/// Snapshot of nearby entities with its own refresh cadence.
pub struct EntityTracker {
    entities:         Vec<Entity>,
    index:            RTree<EntityEntry>,
    refreshed_at:     Option<Timestamp>,
    refresh_interval: Duration,
}

impl EntityTracker {
    /// An empty tracker that wants a refresh every `refresh_interval`.
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            entities: Vec::new(),
            index: RTree::new(),
            refreshed_at: None,
            refresh_interval,
        }
    }

    /// Replace the snapshot with `entities`, captured at `now`.
    ///
    /// Fails without touching the current snapshot if an id repeats.
    pub fn refresh(&mut self, entities: Vec<Entity>, now: Timestamp) -> SpatialResult<()> {
        let mut seen = HashSet::with_capacity(entities.len());
        if let Some(dup) = entities.iter().find(|e| !seen.insert(e.id)) {
            return Err(SpatialError::DuplicateEntity(dup.id));
        }

        let entries = entities
            .iter()
            .enumerate()
            .map(|(slot, e)| EntityEntry { point: e.position.to_array(), slot })
            .collect();
        self.index = RTree::bulk_load(entries);
        self.entities = entities;
        self.refreshed_at = Some(now);
        trace!(count = self.entities.len(), %now, "tracker refreshed");
        Ok(())
    }

    /// `true` when the snapshot is at least one refresh interval old (or was
    /// never taken).
    pub fn is_refresh_due(&self, now: Timestamp) -> bool {
        match self.refreshed_at {
            None       => true,
            Some(last) => now.saturating_since(last) >= self.refresh_interval,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn set_refresh_interval(&mut self, interval: Duration) {
        self.refresh_interval = interval;
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up an entity in the current snapshot.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// All entities in the current snapshot, in refresh order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    fn to_nearby(entity: &Entity, origin: Position) -> NearbyEntity {
        NearbyEntity {
            id:             entity.id,
            position:       entity.position,
            distance:       origin.distance(entity.position),
            classification: entity.classification,
        }
    }
}

impl SpatialQuery for EntityTracker {
    fn nearby_entities(&self, origin: Position, filter: &EntityFilter) -> Vec<NearbyEntity> {
        let mut out: Vec<NearbyEntity> = match filter.max_distance {
            Some(d) => self
                .index
                .locate_within_distance(origin.to_array(), d * d)
                .map(|entry| &self.entities[entry.slot])
                .filter(|e| filter.matches(e))
                .map(|e| Self::to_nearby(e, origin))
                .collect(),
            None => self
                .entities
                .iter()
                .filter(|e| filter.matches(e))
                .map(|e| Self::to_nearby(e, origin))
                .collect(),
        };
        out.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        out
    }

    fn refreshed_at(&self) -> Option<Timestamp> {
        self.refreshed_at
    }
}
