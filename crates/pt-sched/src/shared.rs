//! `SharedScheduler` — serialized access for multi-threaded hosts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pt_behavior::WorldContext;
use pt_core::TaskId;
use pt_nav::Navigator;

use crate::{CycleOutcome, NoopObserver, SchedResult, Scheduler, SchedulerObserver};

/// A cloneable handle that runs every scheduler entry point under one lock,
/// so each cycle, start and stop is atomic with respect to the others.
///
/// A panic inside a task poisons the lock; the handle keeps going with the
/// inner state, since the scheduler's own invariants hold between calls.
pub struct SharedScheduler<N: Navigator, O: SchedulerObserver = NoopObserver> {
    inner: Arc<Mutex<Scheduler<N, O>>>,
}

impl<N: Navigator, O: SchedulerObserver> Clone for SharedScheduler<N, O> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<N: Navigator, O: SchedulerObserver> SharedScheduler<N, O> {
    pub fn new(scheduler: Scheduler<N, O>) -> Self {
        Self { inner: Arc::new(Mutex::new(scheduler)) }
    }

    fn lock(&self) -> MutexGuard<'_, Scheduler<N, O>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start(&self) {
        self.lock().start();
    }

    pub fn stop(&self) {
        self.lock().stop();
    }

    pub fn tick(&self, world: &WorldContext<'_>) -> Option<CycleOutcome> {
        self.lock().tick(world)
    }

    pub fn tick_if_due(&self, world: &WorldContext<'_>) -> Option<CycleOutcome> {
        self.lock().tick_if_due(world)
    }

    pub fn set_cadence(&self, cadence: Duration) -> SchedResult<()> {
        self.lock().set_cadence(cadence)
    }

    pub fn is_running(&self) -> bool {
        self.lock().is_running()
    }

    pub fn current_active_task(&self) -> Option<TaskId> {
        self.lock().current_active_task()
    }

    /// Run `f` with exclusive access to the scheduler.
    pub fn with<R>(&self, f: impl FnOnce(&mut Scheduler<N, O>) -> R) -> R {
        f(&mut *self.lock())
    }
}
