//! `pt-behavior` — the task contract and its suspension primitive.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                         |
//! |--------------|------------------------------------------------------------------|
//! | [`context`]  | `AgentState`, `WorldContext<'a>` — read-only cycle snapshot       |
//! | [`activity`] | `Activity`, `Condition`, `Resolution` — "wait until C" with hold  |
//! | [`task`]     | `Task` trait, `TaskContext<'a>`, `Priority`                       |
//! | [`error`]    | `ActivityError`, `TaskFault`, `TaskResult<T>`                     |
//!
//! # Design notes
//!
//! A task is evaluated by the scheduler every cycle.  It never blocks: when
//! it has to wait for the world to change it opens an [`Activity`], which
//! places a movement hold on open and releases it exactly once when it
//! resolves, times out, or is cancelled.  The task carries the activity
//! across cycles and polls it from `tick`.
//!
//! Everything a task reads comes through `&WorldContext`; everything it
//! emits goes through the `&mut dyn Navigator` in [`TaskContext`].  Tasks
//! hold no references to collaborators, so they are trivially testable with
//! fake snapshots.

pub mod activity;
pub mod context;
pub mod error;
pub mod task;


pub use activity::{cancel_pending, Activity, Condition, Resolution};
pub use context::{AgentState, WorldContext};
pub use error::{ActivityError, ActivityResult, TaskFault, TaskResult};
pub use task::{Priority, Task, TaskContext};
