//! `pt-tasks` — the concrete behaviors and how they are configured.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                   |
//! |-------------------|------------------------------------------------------------|
//! | [`party_wait`]    | `PartyWait` — stop while a companion is too far behind     |
//! | [`rest`]          | `Rest` — hold until health recovers                        |
//! | [`approach`]      | `Approach` — walk to the nearest target, interact, move on |
//! | [`wait`]          | `Wait` — one-shot timed pause                              |
//! | [`follow_route`]  | `FollowRoute` — always-viable fallback                     |
//! | [`spec`]          | `TaskSpec`, `TaskKind`, `TaskParams`                       |
//! | [`factory`]       | `build_task`, `build_tasks`                                |
//! | [`loader`]        | `load_specs_csv`, `load_specs_reader`                      |
//! | [`error`]         | `TaskConfigError`, `TaskConfigResult<T>`                   |
//!
//! A typical setup, most urgent first:
//!
//! ```text
//! name,kind,priority,max_distance,interact_range,threshold,resume_at,timeout_ms,targets
//! rest,rest,1,,,0.35,0.9,30000,
//! party,party_wait,3,20,,,,,
//! gather,approach,5,60,4,,,2500,mining|herb
//! route,follow_route,10,,,,,,
//! ```

pub mod approach;
pub mod error;
pub mod factory;
pub mod follow_route;
pub mod loader;
pub mod party_wait;
pub mod rest;
pub mod spec;
pub mod wait;


pub use approach::Approach;
pub use error::{TaskConfigError, TaskConfigResult};
pub use factory::{build_task, build_tasks};
pub use follow_route::FollowRoute;
pub use loader::{load_specs_csv, load_specs_reader};
pub use party_wait::PartyWait;
pub use rest::Rest;
pub use spec::{TaskKind, TaskParams, TaskSpec};
pub use wait::Wait;
