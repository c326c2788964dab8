//! `pt-nav` — the intent channel between the controller and navigation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`navigator`] | `Navigator` trait, `HoldTag`, `NavIntent`, `NoopNavigator`      |
//! | [`gate`]      | `HoldGate<N>` — counts outstanding holds per tag                |
//! | [`recorder`]  | `NavRecorder` — records every intent in order                   |
//!
//! # Hold model
//!
//! A *movement hold* tells the navigation subsystem to stop and stay put.
//! Holds are tagged with the name of the task that placed them.  Navigation
//! resumes route playback only when no holds are outstanding; the controller
//! never issues raw motion commands.
//!
//! Every `hold_position(tag)` must eventually be matched by one
//! `release_hold(tag)`.  [`HoldGate`] keeps the per-tag count so the
//! scheduler can detect and clean up holds a task forgot to release.

pub mod gate;
pub mod navigator;
pub mod recorder;


pub use gate::HoldGate;
pub use navigator::{HoldTag, NavIntent, Navigator, NoopNavigator};
pub use recorder::NavRecorder;
