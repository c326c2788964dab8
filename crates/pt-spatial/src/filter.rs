//! Entity filters for proximity queries.
//!
//! Mirrors the two query shapes hosts typically expose: creatures within a
//! distance, narrowed by level range, elite status and reaction; and resource
//! nodes within a distance, of one type, up to a maximum level.

use std::ops::RangeInclusive;

use pt_core::{EntityId, Position};

use crate::{Classification, Entity};

/// Criteria an entity must meet to appear in a query result.
///
/// The default filter matches every non-elite entity at any distance;
/// [`any`][Self::any] includes elites.
#[derive(Clone, Debug, Default)]
pub struct EntityFilter {
    /// Accepted classifications.  Empty means "any".
    pub classifications: Vec<Classification>,

    /// Maximum distance from the query origin (inclusive).
    pub max_distance: Option<f32>,

    /// Accepted level range (inclusive).
    pub levels: Option<RangeInclusive<u32>>,

    /// When `false`, elite entities are skipped.
    pub include_elite: bool,

    /// Entities to leave out regardless of the other criteria.
    pub exclude: Vec<EntityId>,
}

impl EntityFilter {
    /// Match everything (elites included).
    pub fn any() -> Self {
        Self { include_elite: true, ..Self::default() }
    }

    /// Match entities of a single classification.
    pub fn of(classification: Classification) -> Self {
        Self::any().classifications([classification])
    }

    pub fn classifications<I>(mut self, iter: I) -> Self
    where
        I: IntoIterator<Item = Classification>,
    {
        self.classifications = iter.into_iter().collect();
        self
    }

    pub fn within(mut self, distance: f32) -> Self {
        self.max_distance = Some(distance);
        self
    }

    pub fn levels(mut self, range: RangeInclusive<u32>) -> Self {
        self.levels = Some(range);
        self
    }

    pub fn include_elite(mut self, include: bool) -> Self {
        self.include_elite = include;
        self
    }

    pub fn excluding<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = EntityId>,
    {
        self.exclude = ids.into_iter().collect();
        self
    }

    /// All non-distance criteria.
    pub fn matches(&self, entity: &Entity) -> bool {
        (self.classifications.is_empty() || self.classifications.contains(&entity.classification))
            && self.levels.as_ref().is_none_or(|r| r.contains(&entity.level))
            && (self.include_elite || !entity.elite)
            && !self.exclude.contains(&entity.id)
    }

    /// All criteria, measured from `origin`.
    pub fn accepts(&self, entity: &Entity, origin: Position) -> bool {
        self.matches(entity)
            && self.max_distance.is_none_or(|d| origin.within(entity.position, d))
    }
}
