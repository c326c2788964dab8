//! Tracked entity types.

use std::fmt;
use std::str::FromStr;

use pt_core::{EntityId, Position};

use crate::SpatialError;

// ── Classification ────────────────────────────────────────────────────────────

/// What kind of thing an entity is, from the agent's point of view.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Classification {
    /// A designated party member the agent must not outrun.
    Companion,
    Friendly,
    Neutral,
    Hostile,
    /// A gatherable mining node.
    MiningNode,
    /// A gatherable herb node.
    HerbNode,
}

impl Classification {
    pub const ALL: [Classification; 6] = [
        Classification::Companion,
        Classification::Friendly,
        Classification::Neutral,
        Classification::Hostile,
        Classification::MiningNode,
        Classification::HerbNode,
    ];

    /// `true` for gatherable points of interest.
    #[inline]
    pub fn is_resource(self) -> bool {
        matches!(self, Classification::MiningNode | Classification::HerbNode)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Companion  => "companion",
            Classification::Friendly   => "friendly",
            Classification::Neutral    => "neutral",
            Classification::Hostile    => "hostile",
            Classification::MiningNode => "mining",
            Classification::HerbNode   => "herb",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Classification {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Classification::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SpatialError::UnknownClassification(s.to_owned()))
    }
}

// ── Entity ────────────────────────────────────────────────────────────────────

/// One entity as captured by the most recent tracker refresh.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub id:             EntityId,
    pub position:       Position,
    pub classification: Classification,
    /// Creature level, or required skill tier for resource nodes.
    pub level:          u32,
    pub elite:          bool,
}

impl Entity {
    pub fn new(id: EntityId, position: Position, classification: Classification) -> Self {
        Self { id, position, classification, level: 1, elite: false }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_elite(mut self, elite: bool) -> Self {
        self.elite = elite;
        self
    }
}

// ── NearbyEntity ──────────────────────────────────────────────────────────────

/// A query result row: an entity plus its distance from the query origin.
#[derive(Clone, Debug, PartialEq)]
pub struct NearbyEntity {
    pub id:             EntityId,
    pub position:       Position,
    pub distance:       f32,
    pub classification: Classification,
}
