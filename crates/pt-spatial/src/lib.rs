//! `pt-spatial` — the Spatial Query Interface consumed by tasks.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`entity`]  | `Entity`, `Classification`, `NearbyEntity`                        |
//! | [`filter`]  | `EntityFilter` — classification / distance / level / elite filter |
//! | [`query`]   | `SpatialQuery` trait, `EmptyWorld`                                |
//! | [`tracker`] | `EntityTracker` — R-tree backed snapshot with its own refresh cadence |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                                |
//!
//! The controller only ever *reads* a tracker through [`SpatialQuery`].
//! Scanning, caching, and refresh timing belong to the host, which owns the
//! tracker mutably and refreshes it on a cadence of its own.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod entity;
pub mod error;
pub mod filter;
pub mod query;
pub mod tracker;

#[cfg(test)]
mod tests;

pub use entity::{Classification, Entity, NearbyEntity};
pub use error::{SpatialError, SpatialResult};
pub use filter::EntityFilter;
pub use query::{EmptyWorld, SpatialQuery};
pub use tracker::EntityTracker;
