//! The scheduler state machine.

use std::time::Duration;

use tracing::{debug, info, warn};

use pt_behavior::{Priority, Task, TaskContext, TaskFault, WorldContext};
use pt_core::{ControllerConfig, CoreError, Cycle, TaskId, Timestamp};
use pt_nav::{HoldGate, Navigator};

use crate::builder::check_unique_priorities;
use crate::{
    DeactivationReason, Diagnostic, FaultPhase, NoopObserver, SchedError, SchedResult,
    SchedulerObserver,
};

// ── Slot ──────────────────────────────────────────────────────────────────────

/// A registered task plus the scheduler's bookkeeping for it.
pub(crate) struct Slot {
    id:                 TaskId,
    task:               Box<dyn Task>,
    /// Skipped through this cycle, inclusive.
    quarantined_until:  Option<Cycle>,
    consecutive_faults: u32,
    evaluated_at:       Option<Cycle>,
    faulted_at:         Option<Cycle>,
}

impl Slot {
    pub(crate) fn new(id: TaskId, task: Box<dyn Task>) -> Self {
        Self {
            id,
            task,
            quarantined_until:  None,
            consecutive_faults: 0,
            evaluated_at:       None,
            faulted_at:         None,
        }
    }

    #[inline]
    fn is_quarantined(&self, cycle: Cycle) -> bool {
        self.quarantined_until.is_some_and(|until| cycle <= until)
    }
}

// ── CycleOutcome ──────────────────────────────────────────────────────────────

/// Summary of one executed cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CycleOutcome {
    pub cycle:    Cycle,
    /// Task active at the end of the cycle.
    pub active:   Option<TaskId>,
    /// The active task at the end differs from the one at the start.
    pub switched: bool,
    /// Faults contained during the cycle.
    pub faults:   u32,
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// Priority scheduler over a fixed set of tasks.
///
/// Created stopped by [`SchedulerBuilder`][crate::SchedulerBuilder].  The
/// host calls [`start`][Self::start], then [`tick`][Self::tick] (or
/// [`tick_if_due`][Self::tick_if_due]) on its own loop, and finally
/// [`stop`][Self::stop].  All intents go to the host navigator through a
/// [`HoldGate`], which lets the scheduler release holds a task leaves behind.
///
/// Not internally synchronized.  Multi-threaded hosts wrap it in a
/// [`SharedScheduler`][crate::SharedScheduler].
pub struct Scheduler<N: Navigator, O: SchedulerObserver = NoopObserver> {
    config:            ControllerConfig,
    /// Evaluation order: `(priority, registration)` ascending.
    slots:             Vec<Slot>,
    /// Index into `slots`.
    active:            Option<usize>,
    running:           bool,
    cycle:             Cycle,
    last_cycle_at:     Option<Timestamp>,
    stale_reported:    bool,
    faults_this_cycle: u32,
    nav:               HoldGate<N>,
    observer:          O,
}

impl<N: Navigator, O: SchedulerObserver> Scheduler<N, O> {
    pub(crate) fn from_parts(
        config:   ControllerConfig,
        slots:    Vec<Slot>,
        nav:      HoldGate<N>,
        observer: O,
    ) -> Self {
        let mut sched = Self {
            config,
            slots,
            active: None,
            running: false,
            cycle: Cycle::ZERO,
            last_cycle_at: None,
            stale_reported: false,
            faults_this_cycle: 0,
            nav,
            observer,
        };
        sched.sort_slots();
        sched
    }

    // ── Host control ──────────────────────────────────────────────────────

    /// `Stopped -> Running`.  Clears the active task, quarantines and fault
    /// counts.  No-op if already running.
    pub fn start(&mut self) {
        if self.running {
            debug!("start ignored: already running");
            return;
        }
        self.active = None;
        for slot in &mut self.slots {
            slot.quarantined_until = None;
            slot.consecutive_faults = 0;
        }
        self.last_cycle_at = None;
        self.stale_reported = false;
        self.running = true;
        info!(tasks = self.slots.len(), cadence_ms = self.config.cadence_ms, "scheduler started");
    }

    /// `Running -> Stopped`.  Deactivates the active task first, so its
    /// activities are cancelled and holds released.  No-op if stopped.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        if let Some(idx) = self.active {
            self.deactivate(idx, DeactivationReason::Stopped);
        }
        self.running = false;
        info!(cycle = %self.cycle, "scheduler stopped");
    }

    /// Run one cycle against `world`.  Returns `None` while stopped.
    pub fn tick(&mut self, world: &WorldContext<'_>) -> Option<CycleOutcome> {
        if !self.running {
            return None;
        }

        // ── ① Stamp ───────────────────────────────────────────────────────
        self.cycle = self.cycle.next();
        let cycle = self.cycle;
        let world = world.stamped(cycle, self.config.stale_after());
        self.last_cycle_at = Some(world.now);
        self.faults_this_cycle = 0;
        let before = self.current_active_task();

        self.observer.on_cycle_start(cycle, world.now);
        self.check_staleness(&world);

        // ── ② Select ──────────────────────────────────────────────────────
        let (mut candidate, outgoing) = self.select(&world, 0);

        // ── ③ Switch: deactivate before activate ─────────────────────────
        if candidate != self.active {
            if let Some(idx) = self.active {
                self.deactivate(idx, outgoing.unwrap_or(DeactivationReason::Preempted));
            }
        }

        // ── ④ Tick ────────────────────────────────────────────────────────
        // A task faulting in `on_activate` or `tick` hands the cycle to the
        // next candidate below it.  Each fault quarantines one slot, so this
        // runs at most once per task.
        while let Some(idx) = candidate {
            if self.active != Some(idx) && !self.activate(idx, &world) {
                candidate = self.select(&world, idx + 1).0;
                continue;
            }
            let result = self.slots[idx].task.tick(&mut TaskContext::new(&world, &mut self.nav));
            match result {
                Ok(()) => break,
                Err(fault) => {
                    self.fault(idx, FaultPhase::Tick, fault);
                    candidate = self.select(&world, idx + 1).0;
                }
            }
        }

        self.settle_fault_counts(cycle);
        let active = self.current_active_task();
        self.observer.on_cycle_end(cycle, active);

        Some(CycleOutcome {
            cycle,
            active,
            switched: active != before,
            faults: self.faults_this_cycle,
        })
    }

    /// [`tick`][Self::tick] if running and at least one cadence interval has
    /// passed since the previous cycle (by `world.now`).
    pub fn tick_if_due(&mut self, world: &WorldContext<'_>) -> Option<CycleOutcome> {
        if !self.is_due(world.now) {
            return None;
        }
        self.tick(world)
    }

    /// `true` if a cycle should run at `now`.
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.running
            && self
                .last_cycle_at
                .is_none_or(|last| now.saturating_since(last) >= self.config.cadence())
    }

    /// Change the cycle interval.  Allowed while running; takes effect from
    /// the next [`tick_if_due`][Self::tick_if_due].
    pub fn set_cadence(&mut self, cadence: Duration) -> SchedResult<()> {
        let ms = u64::try_from(cadence.as_millis()).unwrap_or(u64::MAX);
        if ms == 0 {
            return Err(CoreError::ZeroCadence.into());
        }
        self.config.cadence_ms = ms;
        debug!(cadence_ms = ms, "cadence changed");
        Ok(())
    }

    /// Re-prioritize a task.  Only while stopped.
    pub fn set_priority(&mut self, id: TaskId, priority: Priority) -> SchedResult<()> {
        if self.running {
            return Err(SchedError::Running);
        }
        let idx = self
            .slots
            .iter()
            .position(|s| s.id == id)
            .ok_or(SchedError::UnknownTask(id))?;

        if self.config.unique_priorities {
            check_unique_priorities(self.slots.iter().enumerate().map(|(i, s)| {
                let p = if i == idx { priority } else { s.task.priority() };
                (p, s.task.name())
            }))?;
        }

        self.slots[idx].task.set_priority(priority);
        self.sort_slots();
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn cadence(&self) -> Duration {
        self.config.cadence()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The most recently executed cycle (`C0` before the first).
    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn current_active_task(&self) -> Option<TaskId> {
        self.active.map(|idx| self.slots[idx].id)
    }

    pub fn active_task_name(&self) -> Option<&str> {
        self.active.map(|idx| self.slots[idx].task.name())
    }

    /// Task names in evaluation order.
    pub fn task_names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.task.name()).collect()
    }

    pub fn task_id(&self, name: &str) -> Option<TaskId> {
        self.slots.iter().find(|s| s.task.name() == name).map(|s| s.id)
    }

    pub fn task(&self, id: TaskId) -> Option<&dyn Task> {
        self.slots.iter().find(|s| s.id == id).map(|s| &*s.task)
    }

    pub fn navigator(&self) -> &HoldGate<N> {
        &self.nav
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    // ── Cycle internals ───────────────────────────────────────────────────

    /// First viable task in evaluation order, starting at `from`, and why the
    /// active task would leave if it was passed over.
    fn select(
        &mut self,
        world: &WorldContext<'_>,
        from: usize,
    ) -> (Option<usize>, Option<DeactivationReason>) {
        let cycle = self.cycle;
        let mut outgoing = None;

        for idx in from..self.slots.len() {
            if self.slots[idx].is_quarantined(cycle) {
                continue;
            }
            self.slots[idx].evaluated_at = Some(cycle);
            let is_active = self.active == Some(idx);

            if self.slots[idx].task.is_complete() {
                if is_active {
                    outgoing = Some(DeactivationReason::Completed);
                }
                self.try_rearm(idx, world);
                continue;
            }

            let viable = match self.slots[idx].task.is_viable(world) {
                Ok(viable) => viable,
                Err(fault) => {
                    self.fault(idx, FaultPhase::Viability, fault);
                    continue;
                }
            };
            if viable {
                return (Some(idx), outgoing);
            }
            if is_active {
                outgoing = Some(DeactivationReason::NotViable);
            }
        }
        (None, outgoing)
    }

    /// Re-arm a complete task once it reports not viable.  The task is out of
    /// the running this cycle, so an error here only means "not re-armed".
    fn try_rearm(&mut self, idx: usize, world: &WorldContext<'_>) {
        let cycle = self.cycle;
        let task = &mut self.slots[idx].task;
        match task.is_viable(world) {
            Ok(true) => {}
            Ok(false) => {
                if task.rearm() {
                    debug!(%cycle, task = %task.name(), "re-armed");
                }
            }
            Err(fault) => {
                debug!(%cycle, task = %task.name(), error = %fault, "complete task not re-armed");
            }
        }
    }

    /// Make `idx` the active task.  `false` if `on_activate` faulted, in
    /// which case the slot is empty again.
    fn activate(&mut self, idx: usize, world: &WorldContext<'_>) -> bool {
        let cycle = self.cycle;
        self.active = Some(idx);

        let slot = &mut self.slots[idx];
        debug!(%cycle, task = %slot.task.name(), priority = %slot.task.priority(), "activate");
        self.observer.on_activated(cycle, slot.id, slot.task.name());

        let result = slot.task.on_activate(&mut TaskContext::new(world, &mut self.nav));
        match result {
            Ok(()) => true,
            Err(fault) => {
                self.fault(idx, FaultPhase::Activate, fault);
                false
            }
        }
    }

    /// Clear the active slot, run `on_deactivate`, then reclaim any holds
    /// still registered under the task's tag.
    fn deactivate(&mut self, idx: usize, reason: DeactivationReason) {
        let cycle = self.cycle;
        self.active = None;

        let result = self.slots[idx].task.on_deactivate(&mut self.nav);
        if let Err(fault) = result {
            self.record_fault(idx, FaultPhase::Deactivate, fault);
        }
        self.reclaim_holds(idx);

        let slot = &self.slots[idx];
        debug!(%cycle, task = %slot.task.name(), %reason, "deactivate");
        self.observer.on_deactivated(cycle, slot.id, slot.task.name(), reason);
    }

    fn reclaim_holds(&mut self, idx: usize) {
        let tag = self.slots[idx].task.hold_tag();
        if self.nav.outstanding(tag.as_str()) == 0 {
            return;
        }
        let released = self.nav.release_all(&tag);

        let slot = &self.slots[idx];
        warn!(cycle = %self.cycle, task = %slot.task.name(), released, "orphaned holds released");
        let diagnostic = Diagnostic::OrphanedHold {
            task: slot.id,
            name: slot.task.name().to_owned(),
            released,
        };
        self.observer.on_diagnostic(self.cycle, &diagnostic);
    }

    /// Record `fault` and force the task out of the active slot.
    fn fault(&mut self, idx: usize, phase: FaultPhase, fault: TaskFault) {
        self.record_fault(idx, phase, fault);
        if self.active == Some(idx) {
            self.deactivate(idx, DeactivationReason::Fault);
        }
    }

    /// Quarantine the task through the next cycle, count the fault, and
    /// report it.  At most one fault per task per cycle counts toward the
    /// persistent-fault threshold.
    fn record_fault(&mut self, idx: usize, phase: FaultPhase, fault: TaskFault) {
        let cycle = self.cycle;
        let threshold = self.config.fault_report_threshold;
        self.faults_this_cycle += 1;

        let slot = &mut self.slots[idx];
        slot.quarantined_until = Some(cycle.next());
        let first_this_cycle = slot.faulted_at != Some(cycle);
        slot.faulted_at = Some(cycle);
        if first_this_cycle {
            slot.consecutive_faults += 1;
        }

        warn!(
            %cycle,
            task = %slot.task.name(),
            ?phase,
            error = %fault,
            consecutive = slot.consecutive_faults,
            "task fault contained"
        );
        let diagnostic = Diagnostic::TaskFault {
            task:    slot.id,
            name:    slot.task.name().to_owned(),
            phase,
            message: fault.to_string(),
        };
        let persistent = (first_this_cycle && slot.consecutive_faults == threshold).then(|| {
            Diagnostic::PersistentFault {
                task:        slot.id,
                name:        slot.task.name().to_owned(),
                consecutive: slot.consecutive_faults,
            }
        });

        self.observer.on_diagnostic(cycle, &diagnostic);
        if let Some(persistent) = persistent {
            warn!(%cycle, ?persistent, "persistent task fault");
            self.observer.on_diagnostic(cycle, &persistent);
        }
    }

    /// Tasks evaluated without faulting this cycle start counting afresh.
    fn settle_fault_counts(&mut self, cycle: Cycle) {
        for slot in &mut self.slots {
            if slot.evaluated_at == Some(cycle) && slot.faulted_at != Some(cycle) {
                slot.consecutive_faults = 0;
            }
        }
    }

    fn check_staleness(&mut self, world: &WorldContext<'_>) {
        let Some(age) = world.spatial_age() else {
            self.stale_reported = false;
            return;
        };
        let bound = world.stale_after;
        if age <= bound {
            self.stale_reported = false;
        } else if !self.stale_reported {
            self.stale_reported = true;
            warn!(cycle = %self.cycle, age_ms = age.as_millis() as u64, "spatial data stale");
            self.observer.on_diagnostic(self.cycle, &Diagnostic::StaleData { age, bound });
        }
    }

    fn sort_slots(&mut self) {
        self.slots.sort_by_key(|s| (s.task.priority(), s.id));
    }
}
