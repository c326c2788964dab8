//! `pt-sched` — the priority task scheduler.
//!
//! # Cycle
//!
//! ```text
//! tick(world):                         (no-op unless Running)
//!   ① Stamp   — advance the cycle counter, stamp the world snapshot,
//!               report stale spatial data on the transition into staleness.
//!   ② Select  — walk tasks in (priority, registration) order, skipping
//!               quarantined and complete ones; the first viable task is
//!               the candidate.  A complete task that is no longer viable
//!               is re-armed.
//!   ③ Switch  — candidate differs from the active task:
//!                 on_deactivate(outgoing), reclaim its leftover holds,
//!                 then on_activate(candidate).
//!   ④ Tick    — tick the active task, if any.
//! ```
//!
//! A fault from any task method deactivates that task, quarantines it for
//! the rest of the cycle and the whole next cycle, and is reported through
//! [`SchedulerObserver::on_diagnostic`].  Faults never stop the scheduler.
//! When the faulting task was about to run (`on_activate` or `tick`),
//! selection resumes below it and the next viable task runs in the same
//! cycle.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use pt_core::ControllerConfig;
//! use pt_nav::NoopNavigator;
//! use pt_sched::SchedulerBuilder;
//!
//! let specs = pt_tasks::load_specs_csv(Path::new("tasks.csv"))?;
//! let mut sched = SchedulerBuilder::new(ControllerConfig::default(), NoopNavigator)
//!     .specs(&specs)?
//!     .build()?;
//! sched.start();
//! loop {
//!     let world = WorldContext::new(now(), &agent, &tracker);
//!     sched.tick_if_due(&world);
//! }
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod scheduler;
pub mod shared;

#[cfg(test)]
mod tests;

pub use builder::SchedulerBuilder;
pub use error::{SchedError, SchedResult};
pub use observer::{DeactivationReason, Diagnostic, EventLog, FaultPhase, NoopObserver, SchedEvent, SchedulerObserver};
pub use scheduler::{CycleOutcome, Scheduler};
pub use shared::SharedScheduler;
