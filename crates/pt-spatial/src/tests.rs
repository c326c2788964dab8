//! Unit tests for pt-spatial.

use std::time::Duration;

use pt_core::{EntityId, Position, Timestamp};

use crate::{
    Classification, EmptyWorld, Entity, EntityFilter, EntityTracker, SpatialError, SpatialQuery,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn ent(id: u64, x: f32, class: Classification) -> Entity {
    Entity::new(EntityId(id), Position::new(x, 0.0, 0.0), class)
}

/// Tracker with two companions, a hostile elite, and a mining node on the
/// x axis.
fn populated() -> EntityTracker {
    let mut t = EntityTracker::new(Duration::from_millis(500));
    t.refresh(
        vec![
            ent(1, 10.0, Classification::Companion),
            ent(2, 25.0, Classification::Companion),
            ent(3, 5.0, Classification::Hostile).with_level(12).with_elite(true),
            ent(4, 15.0, Classification::MiningNode).with_level(3),
        ],
        Timestamp(1_000),
    )
    .unwrap();
    t
}

fn ids(rows: &[crate::NearbyEntity]) -> Vec<u64> {
    rows.iter().map(|r| r.id.0).collect()
}

// ── Classification ────────────────────────────────────────────────────────────

#[cfg(test)]
mod classification {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Companion".parse::<Classification>().unwrap(), Classification::Companion);
        assert_eq!(" herb ".parse::<Classification>().unwrap(), Classification::HerbNode);
    }

    #[test]
    fn unknown_is_an_error() {
        let err = "dragon".parse::<Classification>().unwrap_err();
        assert!(matches!(err, SpatialError::UnknownClassification(s) if s == "dragon"));
    }

    #[test]
    fn resources() {
        assert!(Classification::MiningNode.is_resource());
        assert!(!Classification::Hostile.is_resource());
    }
}

// ── EntityFilter ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod filter {
    use super::*;

    #[test]
    fn default_skips_elites() {
        let elite = ent(1, 0.0, Classification::Hostile).with_elite(true);
        assert!(!EntityFilter::default().matches(&elite));
        assert!(EntityFilter::any().matches(&elite));
    }

    #[test]
    fn level_range_is_inclusive() {
        let f = EntityFilter::any().levels(10..=12);
        assert!(f.matches(&ent(1, 0.0, Classification::Hostile).with_level(12)));
        assert!(!f.matches(&ent(1, 0.0, Classification::Hostile).with_level(13)));
    }

    #[test]
    fn exclusion_wins() {
        let f = EntityFilter::of(Classification::MiningNode).excluding([EntityId(4)]);
        assert!(!f.matches(&ent(4, 0.0, Classification::MiningNode)));
        assert!(f.matches(&ent(5, 0.0, Classification::MiningNode)));
    }

    #[test]
    fn accepts_checks_distance() {
        let f = EntityFilter::any().within(10.0);
        assert!(f.accepts(&ent(1, 10.0, Classification::Neutral), Position::ORIGIN));
        assert!(!f.accepts(&ent(1, 10.5, Classification::Neutral), Position::ORIGIN));
    }
}

// ── EntityTracker ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tracker {
    use super::*;

    #[test]
    fn results_sorted_by_distance() {
        let t = populated();
        let rows = t.nearby_entities(Position::ORIGIN, &EntityFilter::any());
        assert_eq!(ids(&rows), vec![3, 1, 4, 2]);
        assert!((rows[1].distance - 10.0).abs() < 1e-5);
    }

    #[test]
    fn radius_query_uses_index() {
        let t = populated();
        let rows = t.nearby_entities(Position::ORIGIN, &EntityFilter::any().within(12.0));
        assert_eq!(ids(&rows), vec![3, 1]);
    }

    #[test]
    fn classification_filter() {
        let t = populated();
        let rows = t.nearby_entities(Position::ORIGIN, &EntityFilter::of(Classification::Companion));
        assert_eq!(ids(&rows), vec![1, 2]);
        assert!(rows.iter().all(|r| r.classification == Classification::Companion));
    }

    #[test]
    fn distance_measured_from_origin_argument() {
        let t = populated();
        let rows = t.nearby_entities(
            Position::new(25.0, 0.0, 0.0),
            &EntityFilter::of(Classification::Companion).within(5.0),
        );
        assert_eq!(ids(&rows), vec![2]);
        assert!(rows[0].distance.abs() < 1e-5);
    }

    #[test]
    fn ties_broken_by_id() {
        let mut t = EntityTracker::new(Duration::from_secs(1));
        t.refresh(
            vec![ent(9, 3.0, Classification::Neutral), ent(2, -3.0, Classification::Neutral)],
            Timestamp::ZERO,
        )
        .unwrap();
        let rows = t.nearby_entities(Position::ORIGIN, &EntityFilter::any());
        assert_eq!(ids(&rows), vec![2, 9]);
    }

    #[test]
    fn duplicate_ids_rejected_and_snapshot_kept() {
        let mut t = populated();
        let err = t
            .refresh(
                vec![ent(7, 0.0, Classification::Neutral), ent(7, 1.0, Classification::Neutral)],
                Timestamp(2_000),
            )
            .unwrap_err();
        assert!(matches!(err, SpatialError::DuplicateEntity(EntityId(7))));
        assert_eq!(t.len(), 4);
        assert_eq!(t.refreshed_at(), Some(Timestamp(1_000)));
    }

    #[test]
    fn refresh_replaces_snapshot() {
        let mut t = populated();
        t.refresh(vec![ent(8, 1.0, Classification::Friendly)], Timestamp(1_500)).unwrap();
        assert_eq!(t.len(), 1);
        assert!(t.get(EntityId(1)).is_none());
        assert!(t.get(EntityId(8)).is_some());
    }

    #[test]
    fn refresh_due_follows_interval() {
        let t = populated();
        assert!(!t.is_refresh_due(Timestamp(1_400)));
        assert!(t.is_refresh_due(Timestamp(1_500)));
        assert!(EntityTracker::new(Duration::from_secs(5)).is_refresh_due(Timestamp::ZERO));
    }

    #[test]
    fn staleness_against_bound() {
        let t = populated();
        assert_eq!(t.age(Timestamp(1_750)), Some(Duration::from_millis(750)));
        assert!(!t.is_stale(Timestamp(1_750), Duration::from_secs(1)));
        assert!(t.is_stale(Timestamp(2_001), Duration::from_secs(1)));
    }
}

// ── EmptyWorld ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod empty_world {
    use super::*;

    #[test]
    fn never_returns_entities_and_is_never_stale() {
        assert!(EmptyWorld.nearby_entities(Position::ORIGIN, &EntityFilter::any()).is_empty());
        assert_eq!(EmptyWorld.refreshed_at(), None);
        assert!(!EmptyWorld.is_stale(Timestamp(1_000_000), Duration::ZERO));
    }
}
