//! `pt-core` — foundational types for the `rust_pather` behavior controller.
//!
//! This crate is a dependency of every other `pt-*` crate.  It has no `pt-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `EntityId`, `TaskId`                                  |
//! | [`geo`]         | `Position`, Euclidean distance                        |
//! | [`time`]        | `Timestamp`, `Cycle`, `CycleClock`                    |
//! | [`config`]      | `ControllerConfig`                                    |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::ControllerConfig;
pub use error::{CoreError, CoreResult};
pub use geo::Position;
pub use ids::{EntityId, TaskId};
pub use time::{Cycle, CycleClock, Timestamp};
