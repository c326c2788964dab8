//! Unit tests for pt-sched.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use pt_behavior::{AgentState, Priority, Task, TaskContext, TaskFault, TaskResult, WorldContext};
use pt_core::{ControllerConfig, CoreError, Cycle, EntityId, Position, TaskId, Timestamp};
use pt_nav::{HoldTag, NavIntent, NavRecorder, Navigator};
use pt_spatial::{Classification, EmptyWorld, Entity, EntityTracker, SpatialQuery};
use pt_tasks::TaskSpec;

use crate::{
    CycleOutcome, DeactivationReason, Diagnostic, EventLog, FaultPhase, SchedError, SchedEvent,
    Scheduler, SchedulerBuilder, SharedScheduler,
};

// ── Probe task ────────────────────────────────────────────────────────────────

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Default)]
struct Knobs {
    viable:    bool,
    complete:  bool,
    fail:      Option<FaultPhase>,
    leak_hold: bool,
    no_rearm:  bool,
    rearms:    u32,
}

type Shared = Arc<Mutex<Knobs>>;

/// Scripted task: viability, completion and faults are set from the test,
/// every contract call is logged as `"name:call"`.
struct Probe {
    name:     String,
    priority: Priority,
    log:      Log,
    knobs:    Shared,
    leaked:   bool,
}

impl Probe {
    fn note(&self, call: &str) {
        self.log.lock().unwrap().push(format!("{}:{call}", self.name));
    }

    fn check(&self, phase: FaultPhase) -> TaskResult<()> {
        if self.knobs.lock().unwrap().fail == Some(phase) {
            return Err(TaskFault::failed(format!("{} failed in {phase:?}", self.name)));
        }
        Ok(())
    }
}

impl Task for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "probe"
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    fn is_viable(&self, _world: &WorldContext<'_>) -> TaskResult<bool> {
        self.check(FaultPhase::Viability)?;
        Ok(self.knobs.lock().unwrap().viable)
    }

    fn on_activate(&mut self, _ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        self.note("activate");
        self.check(FaultPhase::Activate)
    }

    fn on_deactivate(&mut self, _nav: &mut dyn Navigator) -> TaskResult<()> {
        self.note("deactivate");
        self.leaked = false;
        self.check(FaultPhase::Deactivate)
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        self.note("tick");
        self.check(FaultPhase::Tick)?;
        let leak = self.knobs.lock().unwrap().leak_hold;
        if leak && !self.leaked {
            ctx.nav.hold_position(&self.hold_tag());
            self.leaked = true;
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.knobs.lock().unwrap().complete
    }

    fn rearm(&mut self) -> bool {
        let mut knobs = self.knobs.lock().unwrap();
        if knobs.no_rearm {
            return false;
        }
        knobs.complete = false;
        knobs.rearms += 1;
        true
    }
}

fn probe(name: &str, priority: u32, viable: bool, log: &Log) -> (Box<dyn Task>, Shared) {
    let knobs = Arc::new(Mutex::new(Knobs { viable, ..Knobs::default() }));
    let task = Probe {
        name:     name.to_owned(),
        priority: Priority(priority),
        log:      Arc::clone(log),
        knobs:    Arc::clone(&knobs),
        leaked:   false,
    };
    (Box::new(task), knobs)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

type TestSched = Scheduler<NavRecorder, EventLog>;

fn build(config: ControllerConfig, tasks: Vec<Box<dyn Task>>) -> TestSched {
    SchedulerBuilder::new(config, NavRecorder::new())
        .tasks(tasks)
        .observer(EventLog::new())
        .build()
        .unwrap()
}

fn started(tasks: Vec<Box<dyn Task>>) -> TestSched {
    let mut s = build(ControllerConfig::default(), tasks);
    s.start();
    s
}

fn from_specs(specs: &[TaskSpec]) -> TestSched {
    let mut s = SchedulerBuilder::new(ControllerConfig::default(), NavRecorder::new())
        .specs(specs)
        .unwrap()
        .observer(EventLog::new())
        .build()
        .unwrap();
    s.start();
    s
}

fn tick_with(s: &mut TestSched, spatial: &dyn SpatialQuery, agent: &AgentState, t: u64) -> Option<CycleOutcome> {
    s.tick(&WorldContext::new(Timestamp(t), agent, spatial))
}

/// One cycle against an empty world with a full-health agent.
fn run(s: &mut TestSched, t: u64) -> Option<CycleOutcome> {
    let agent = AgentState::at(Position::ORIGIN);
    tick_with(s, &EmptyWorld, &agent, t)
}

fn set(knobs: &Shared, f: impl FnOnce(&mut Knobs)) {
    f(&mut knobs.lock().unwrap());
}

fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.lock().unwrap())
}

fn intents(s: &TestSched) -> &[NavIntent] {
    &s.navigator().inner().intents
}

fn companion(x: f32) -> Entity {
    Entity::new(EntityId(1), Position::new(x, 0.0, 0.0), Classification::Companion)
}

fn hold(tag: &str) -> NavIntent {
    NavIntent::Hold(HoldTag::from(tag))
}

fn release(tag: &str) -> NavIntent {
    NavIntent::Release(HoldTag::from(tag))
}

/// At most one task active at any point of the event stream, and every
/// cycle ends with the task the stream says is active.
fn assert_single_active(log: &EventLog) {
    let mut active = None;
    for event in &log.events {
        match event {
            SchedEvent::Activated { task, .. } => {
                assert_eq!(active, None, "activated while another task was active");
                active = Some(*task);
            }
            SchedEvent::Deactivated { task, .. } => {
                assert_eq!(active, Some(*task), "deactivated a task that was not active");
                active = None;
            }
            SchedEvent::CycleEnd { active: end, .. } => assert_eq!(*end, active),
            _ => {}
        }
    }
}

// ── Scenarios with the stock tasks ────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use super::*;

    fn party_rest_route() -> [TaskSpec; 3] {
        [
            TaskSpec::party_wait("party", 1, 20.0),
            TaskSpec::rest("rest", 2, 0.3, 0.9),
            TaskSpec::follow_route("route", 3),
        ]
    }

    #[test]
    fn companion_wait_then_fallback() {
        let mut s = from_specs(&party_rest_route());
        let agent = AgentState::at(Position::ORIGIN);
        let mut tracker = EntityTracker::new(Duration::from_millis(100));

        tracker.refresh(vec![companion(25.0)], Timestamp(0)).unwrap();
        tick_with(&mut s, &tracker, &agent, 0);
        assert_eq!(s.active_task_name(), Some("party"));
        assert_eq!(intents(&s), [hold("party")]);

        tracker.refresh(vec![companion(10.0)], Timestamp(100)).unwrap();
        tick_with(&mut s, &tracker, &agent, 100);
        assert_eq!(s.active_task_name(), Some("route"));
        assert_eq!(intents(&s), [hold("party"), release("party"), NavIntent::FollowRoute]);
        assert_eq!(s.observer().deactivations(), vec![("party", DeactivationReason::NotViable)]);
        assert_eq!(s.navigator().total_outstanding(), 0);
    }

    #[test]
    fn stop_mid_activity_releases_exactly_once() {
        let mut s = from_specs(&party_rest_route());
        let wounded = AgentState::at(Position::ORIGIN).with_health(0.2);

        tick_with(&mut s, &EmptyWorld, &wounded, 0);
        assert_eq!(s.active_task_name(), Some("rest"));
        assert_eq!(intents(&s), [hold("rest")]);

        s.stop();
        assert!(!s.is_running());
        assert_eq!(s.current_active_task(), None);
        assert_eq!(intents(&s), [hold("rest"), release("rest")]);
        assert_eq!(s.observer().deactivations(), vec![("rest", DeactivationReason::Stopped)]);

        assert_eq!(tick_with(&mut s, &EmptyWorld, &wounded, 100), None);
        assert_eq!(tick_with(&mut s, &EmptyWorld, &wounded, 200), None);
        assert_eq!(intents(&s).len(), 2);
        assert_eq!(s.cycle(), Cycle(1));
    }

    #[test]
    fn empty_entity_list_falls_back() {
        let mut s = from_specs(&party_rest_route());
        let agent = AgentState::at(Position::ORIGIN);
        let mut tracker = EntityTracker::new(Duration::from_millis(100));
        tracker.refresh(vec![], Timestamp(0)).unwrap();

        tick_with(&mut s, &tracker, &agent, 0);
        assert_eq!(s.active_task_name(), Some("route"));
        assert_eq!(intents(&s), [NavIntent::FollowRoute]);
    }

    #[test]
    fn wait_timeout_completes_and_stays_off_until_rearmed() {
        let specs = [
            TaskSpec::party_wait("party", 1, 20.0).with_timeout_ms(200),
            TaskSpec::follow_route("route", 2),
        ];
        let mut s = from_specs(&specs);
        let agent = AgentState::at(Position::ORIGIN);
        let mut tracker = EntityTracker::new(Duration::from_millis(100));
        tracker.refresh(vec![companion(40.0)], Timestamp(0)).unwrap();

        tick_with(&mut s, &tracker, &agent, 0);
        tick_with(&mut s, &tracker, &agent, 100);
        tick_with(&mut s, &tracker, &agent, 200); // times out
        assert_eq!(s.active_task_name(), Some("party"));

        tick_with(&mut s, &tracker, &agent, 300);
        assert_eq!(s.active_task_name(), Some("route"));
        assert_eq!(s.observer().deactivations(), vec![("party", DeactivationReason::Completed)]);

        // Still far away: complete and viable, so it stays off.
        tick_with(&mut s, &tracker, &agent, 400);
        assert_eq!(s.active_task_name(), Some("route"));

        // Companion returns: not viable, re-armed.  Leaves again: waits again.
        tracker.refresh(vec![companion(5.0)], Timestamp(500)).unwrap();
        tick_with(&mut s, &tracker, &agent, 500);
        tracker.refresh(vec![companion(40.0)], Timestamp(600)).unwrap();
        tick_with(&mut s, &tracker, &agent, 600);
        assert_eq!(s.active_task_name(), Some("party"));
        assert_eq!(s.observer().activations(), vec!["party", "route", "party"]);
    }
}

// ── Selection and preemption ──────────────────────────────────────────────────

#[cfg(test)]
mod preemption {
    use super::*;

    #[test]
    fn deactivate_before_activate() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, false, &log);
        let (b, _) = probe("b", 2, true, &log);
        let mut s = started(vec![a, b]);

        run(&mut s, 0);
        assert_eq!(drain(&log), ["b:activate", "b:tick"]);

        set(&ka, |k| k.viable = true);
        let outcome = run(&mut s, 100).unwrap();
        assert_eq!(drain(&log), ["b:deactivate", "a:activate", "a:tick"]);
        assert!(outcome.switched);
        assert_eq!(outcome.active, s.task_id("a"));
        assert_eq!(s.observer().deactivations(), vec![("b", DeactivationReason::Preempted)]);
    }

    #[test]
    fn active_task_is_not_reactivated() {
        let log = Log::default();
        let (a, _) = probe("a", 1, true, &log);
        let mut s = started(vec![a]);

        for t in 0..3 {
            run(&mut s, t * 100);
        }
        assert_eq!(drain(&log), ["a:activate", "a:tick", "a:tick", "a:tick"]);
    }

    #[test]
    fn nothing_viable_leaves_slot_empty() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let mut s = started(vec![a]);

        run(&mut s, 0);
        set(&ka, |k| k.viable = false);
        let outcome = run(&mut s, 100).unwrap();
        assert_eq!(outcome.active, None);
        assert_eq!(drain(&log), ["a:activate", "a:tick", "a:deactivate"]);
    }

    #[test]
    fn single_active_under_churn() {
        let log = Log::default();
        let probes: Vec<_> = (0..4).map(|i| probe(&format!("t{i}"), i, false, &log)).collect();
        let knobs: Vec<Shared> = probes.iter().map(|(_, k)| Arc::clone(k)).collect();
        let mut s = started(probes.into_iter().map(|(t, _)| t).collect());

        for cycle in 0..60u32 {
            for (i, k) in knobs.iter().enumerate() {
                let i = i as u32;
                set(k, |k| k.viable = (cycle * (i + 3) + i) % 5 < 2);
            }
            run(&mut s, u64::from(cycle) * 100);
        }
        assert_single_active(s.observer());
        assert!(s.observer().activations().len() > 4);
    }

    #[test]
    fn ties_break_by_registration_order() {
        let log = Log::default();
        let (x, _) = probe("x", 5, true, &log);
        let (y, _) = probe("y", 5, true, &log);
        let (z, kz) = probe("z", 1, true, &log);
        let mut s = started(vec![x, y, z]);
        assert_eq!(s.task_names(), ["z", "x", "y"]);

        run(&mut s, 0);
        assert_eq!(s.active_task_name(), Some("z"));
        set(&kz, |k| k.viable = false);
        run(&mut s, 100);
        assert_eq!(s.active_task_name(), Some("x"));
    }
}

// ── Completion ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod completion {
    use super::*;

    #[test]
    fn complete_task_skipped_until_rearmed() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let (b, _) = probe("b", 2, true, &log);
        let mut s = started(vec![a, b]);

        run(&mut s, 0);
        assert_eq!(s.active_task_name(), Some("a"));

        set(&ka, |k| k.complete = true);
        run(&mut s, 100);
        assert_eq!(s.active_task_name(), Some("b"));
        assert_eq!(s.observer().deactivations(), vec![("a", DeactivationReason::Completed)]);
        assert_eq!(ka.lock().unwrap().rearms, 0, "still viable, stays complete");

        run(&mut s, 200);
        assert_eq!(s.active_task_name(), Some("b"));

        set(&ka, |k| k.viable = false);
        run(&mut s, 300);
        assert_eq!(ka.lock().unwrap().rearms, 1);
        assert_eq!(s.active_task_name(), Some("b"));

        set(&ka, |k| k.viable = true);
        run(&mut s, 400);
        assert_eq!(s.active_task_name(), Some("a"));
    }

    #[test]
    fn complete_task_viability_error_is_not_a_fault() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let (b, _) = probe("b", 2, true, &log);
        let mut s = started(vec![a, b]);

        run(&mut s, 0);
        set(&ka, |k| {
            k.complete = true;
            k.fail = Some(FaultPhase::Viability);
        });
        let c2 = run(&mut s, 100).unwrap();

        assert_eq!(c2.faults, 0);
        assert_eq!(s.active_task_name(), Some("b"));
        assert_eq!(s.observer().deactivations(), vec![("a", DeactivationReason::Completed)]);
        assert_eq!(s.observer().diagnostics().count(), 0);
        assert_eq!(ka.lock().unwrap().rearms, 0);
        assert!(ka.lock().unwrap().complete);

        // Not quarantined: once it reports not viable it is re-armed.
        set(&ka, |k| {
            k.fail = None;
            k.viable = false;
        });
        run(&mut s, 200);
        assert_eq!(ka.lock().unwrap().rearms, 1);
    }

    #[test]
    fn one_shot_task_stays_complete() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let (b, _) = probe("b", 2, true, &log);
        set(&ka, |k| k.no_rearm = true);
        let mut s = started(vec![a, b]);

        run(&mut s, 0);
        set(&ka, |k| {
            k.complete = true;
            k.viable = false;
        });
        for t in 1..5 {
            run(&mut s, t * 100);
        }
        set(&ka, |k| k.viable = true);
        run(&mut s, 500);

        assert!(ka.lock().unwrap().complete);
        assert_eq!(ka.lock().unwrap().rearms, 0);
        assert_eq!(s.active_task_name(), Some("b"));
        assert_eq!(s.observer().activations(), vec!["a", "b"]);
    }

    #[test]
    fn complete_fallback_leaves_nothing_active() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let mut s = started(vec![a]);

        run(&mut s, 0);
        set(&ka, |k| k.complete = true);
        assert_eq!(run(&mut s, 100).unwrap().active, None);
        assert_eq!(run(&mut s, 200).unwrap().active, None);
        assert_eq!(drain(&log), ["a:activate", "a:tick", "a:deactivate"]);
    }
}

// ── Fault containment ─────────────────────────────────────────────────────────

#[cfg(test)]
mod faults {
    use super::*;

    fn task_faults(log: &EventLog) -> Vec<(String, FaultPhase)> {
        log.diagnostics()
            .filter_map(|d| match d {
                Diagnostic::TaskFault { name, phase, .. } => Some((name.clone(), *phase)),
                _ => None,
            })
            .collect()
    }

    fn persistent(log: &EventLog) -> Vec<u32> {
        log.diagnostics()
            .filter_map(|d| match d {
                Diagnostic::PersistentFault { consecutive, .. } => Some(*consecutive),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tick_fault_deactivates_and_quarantines() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let (b, _) = probe("b", 2, true, &log);
        set(&ka, |k| k.fail = Some(FaultPhase::Tick));
        let mut s = started(vec![a, b]);

        let c1 = run(&mut s, 0).unwrap();
        assert_eq!(c1.faults, 1);
        assert_eq!(c1.active, s.task_id("b"), "b takes over within the cycle");
        assert_eq!(drain(&log), ["a:activate", "a:tick", "a:deactivate", "b:activate", "b:tick"]);
        assert_eq!(s.observer().deactivations(), vec![("a", DeactivationReason::Fault)]);

        run(&mut s, 100);
        assert_eq!(s.active_task_name(), Some("b"), "a sits out one cycle");
        assert_eq!(drain(&log), ["b:tick"]);

        run(&mut s, 200);
        assert_eq!(
            drain(&log),
            ["b:deactivate", "a:activate", "a:tick", "a:deactivate", "b:activate", "b:tick"],
            "a preempts again, faults again, b resumes",
        );
        assert_eq!(s.active_task_name(), Some("b"));
        assert!(s.is_running());
        assert_eq!(task_faults(s.observer()).len(), 2);
        assert_single_active(s.observer());
    }

    #[test]
    fn persistent_fault_reported_once_at_threshold() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let (b, _) = probe("b", 2, true, &log);
        set(&ka, |k| k.fail = Some(FaultPhase::Tick));
        let config = ControllerConfig { fault_report_threshold: 3, ..ControllerConfig::default() };
        let mut s = build(config, vec![a, b]);
        s.start();

        // Faults on cycles 1, 3, 5, 7.
        for t in 0..7 {
            run(&mut s, t * 100);
        }
        assert_eq!(task_faults(s.observer()).len(), 4);
        assert_eq!(persistent(s.observer()), vec![3]);
    }

    #[test]
    fn clean_cycle_resets_fault_count() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let config = ControllerConfig { fault_report_threshold: 2, ..ControllerConfig::default() };
        let mut s = build(config, vec![a]);
        s.start();

        set(&ka, |k| k.fail = Some(FaultPhase::Tick));
        run(&mut s, 0);
        set(&ka, |k| k.fail = None);
        run(&mut s, 100); // quarantined
        run(&mut s, 200); // clean
        set(&ka, |k| k.fail = Some(FaultPhase::Tick));
        run(&mut s, 300);
        assert_eq!(task_faults(s.observer()).len(), 2);
        assert!(persistent(s.observer()).is_empty());
    }

    #[test]
    fn viability_fault_falls_through_to_next_task() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let (b, _) = probe("b", 2, true, &log);
        set(&ka, |k| k.fail = Some(FaultPhase::Viability));
        let mut s = started(vec![a, b]);

        run(&mut s, 0);
        assert_eq!(s.active_task_name(), Some("b"));
        let c3 = {
            run(&mut s, 100);
            run(&mut s, 200).unwrap()
        };
        assert!(!c3.switched);
        assert_eq!(
            task_faults(s.observer()),
            vec![("a".to_owned(), FaultPhase::Viability), ("a".to_owned(), FaultPhase::Viability)],
        );
        assert!(!drain(&log).iter().any(|l| l.starts_with("a:")));
    }

    #[test]
    fn viability_fault_of_active_task_forces_deactivation() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let (b, _) = probe("b", 2, true, &log);
        let mut s = started(vec![a, b]);

        run(&mut s, 0);
        drain(&log);
        set(&ka, |k| k.fail = Some(FaultPhase::Viability));
        run(&mut s, 100);
        assert_eq!(drain(&log), ["a:deactivate", "b:activate", "b:tick"]);
        assert_eq!(s.observer().deactivations(), vec![("a", DeactivationReason::Fault)]);
    }

    #[test]
    fn activate_fault_hands_cycle_to_next_task() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let (b, _) = probe("b", 2, true, &log);
        set(&ka, |k| k.fail = Some(FaultPhase::Activate));
        let mut s = started(vec![a, b]);

        let c1 = run(&mut s, 0).unwrap();
        assert_eq!(c1.active, s.task_id("b"));
        assert_eq!(c1.faults, 1);
        assert_eq!(drain(&log), ["a:activate", "a:deactivate", "b:activate", "b:tick"]);
        assert_single_active(s.observer());
    }

    #[test]
    fn every_candidate_faulting_leaves_slot_empty() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        let (b, kb) = probe("b", 2, true, &log);
        let (c, _) = probe("c", 3, false, &log);
        set(&ka, |k| k.fail = Some(FaultPhase::Tick));
        set(&kb, |k| k.fail = Some(FaultPhase::Activate));
        let mut s = started(vec![a, b, c]);

        let c1 = run(&mut s, 0).unwrap();
        assert_eq!(c1.active, None);
        assert_eq!(c1.faults, 2);
        assert_eq!(
            drain(&log),
            ["a:activate", "a:tick", "a:deactivate", "b:activate", "b:deactivate"],
        );
        assert_eq!(
            s.observer().deactivations(),
            vec![("a", DeactivationReason::Fault), ("b", DeactivationReason::Fault)],
        );
        assert!(s.is_running());
    }

    #[test]
    fn deactivate_fault_does_not_block_switch() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, false, &log);
        let (b, kb) = probe("b", 2, true, &log);
        let mut s = started(vec![a, b]);

        run(&mut s, 0);
        set(&kb, |k| k.fail = Some(FaultPhase::Deactivate));
        set(&ka, |k| k.viable = true);
        run(&mut s, 100);

        assert_eq!(s.active_task_name(), Some("a"));
        assert_eq!(task_faults(s.observer()), vec![("b".to_owned(), FaultPhase::Deactivate)]);
        assert_eq!(s.observer().deactivations(), vec![("b", DeactivationReason::Preempted)]);
    }
}

// ── Hold bookkeeping ──────────────────────────────────────────────────────────

#[cfg(test)]
mod holds {
    use super::*;

    #[test]
    fn leaked_hold_released_on_deactivation() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        set(&ka, |k| k.leak_hold = true);
        let mut s = started(vec![a]);

        run(&mut s, 0);
        assert_eq!(s.navigator().outstanding("a"), 1);

        set(&ka, |k| k.viable = false);
        run(&mut s, 100);
        assert_eq!(s.navigator().outstanding("a"), 0);
        assert_eq!(intents(&s), [hold("a"), release("a")]);

        let orphaned: Vec<_> = s.observer().diagnostics().cloned().collect();
        assert_eq!(
            orphaned,
            vec![Diagnostic::OrphanedHold { task: TaskId(0), name: "a".into(), released: 1 }],
        );
    }

    #[test]
    fn stop_reclaims_leaked_hold() {
        let log = Log::default();
        let (a, ka) = probe("a", 1, true, &log);
        set(&ka, |k| k.leak_hold = true);
        let mut s = started(vec![a]);

        run(&mut s, 0);
        s.stop();
        assert_eq!(s.navigator().total_outstanding(), 0);
        assert_eq!(s.navigator().inner().net_holds(), 0);
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use super::*;

    fn try_build(config: ControllerConfig, tasks: Vec<Box<dyn Task>>) -> Option<SchedError> {
        SchedulerBuilder::new(config, NavRecorder::new()).tasks(tasks).build().err()
    }

    #[test]
    fn empty_task_set_rejected() {
        assert!(matches!(try_build(ControllerConfig::default(), vec![]), Some(SchedError::NoTasks)));
    }

    #[test]
    fn duplicate_names_rejected() {
        let log = Log::default();
        let tasks = vec![probe("x", 1, true, &log).0, probe("x", 2, true, &log).0];
        let err = try_build(ControllerConfig::default(), tasks);
        assert!(matches!(err, Some(SchedError::DuplicateName(n)) if n == "x"));
    }

    #[test]
    fn duplicate_priority_rejected_only_when_unique_required() {
        let log = Log::default();
        let tasks = || vec![probe("x", 4, true, &log).0, probe("y", 4, true, &log).0];

        assert!(try_build(ControllerConfig::default(), tasks()).is_none());

        let strict = ControllerConfig { unique_priorities: true, ..ControllerConfig::default() };
        let err = try_build(strict, tasks());
        assert!(matches!(
            err,
            Some(SchedError::DuplicatePriority { priority: Priority(4), ref first, ref second })
                if first == "x" && second == "y"
        ));
    }

    #[test]
    fn bad_controller_config_rejected() {
        let log = Log::default();
        let zero = ControllerConfig { cadence_ms: 0, ..ControllerConfig::default() };
        assert!(matches!(try_build(zero, vec![probe("x", 1, true, &log).0]), Some(SchedError::Core(CoreError::ZeroCadence))));

        let never = ControllerConfig { fault_report_threshold: 0, ..ControllerConfig::default() };
        assert!(matches!(try_build(never, vec![probe("x", 1, true, &log).0]), Some(SchedError::Core(CoreError::Config(_)))));
    }

    #[test]
    fn invalid_spec_rejected() {
        let result = SchedulerBuilder::new(ControllerConfig::default(), NavRecorder::new())
            .specs(&[TaskSpec::wait("pause", 1, 0)]);
        assert!(matches!(result, Err(SchedError::TaskConfig(_))));
    }

    #[test]
    fn set_priority_only_while_stopped() {
        let log = Log::default();
        let (x, _) = probe("x", 1, true, &log);
        let (y, _) = probe("y", 2, true, &log);
        let mut s = started(vec![x, y]);
        let y_id = s.task_id("y").unwrap();

        assert!(matches!(s.set_priority(y_id, Priority(0)), Err(SchedError::Running)));

        s.stop();
        s.set_priority(y_id, Priority(0)).unwrap();
        assert_eq!(s.task_names(), ["y", "x"]);
        assert_eq!(s.task(y_id).map(|t| t.priority()), Some(Priority(0)));
        assert!(matches!(
            s.set_priority(TaskId(9), Priority(3)),
            Err(SchedError::UnknownTask(TaskId(9)))
        ));

        s.start();
        run(&mut s, 0);
        assert_eq!(s.active_task_name(), Some("y"));
    }

    #[test]
    fn set_priority_respects_uniqueness() {
        let log = Log::default();
        let strict = ControllerConfig { unique_priorities: true, ..ControllerConfig::default() };
        let mut s = build(strict, vec![probe("x", 1, true, &log).0, probe("y", 2, true, &log).0]);
        let y_id = s.task_id("y").unwrap();

        assert!(matches!(
            s.set_priority(y_id, Priority(1)),
            Err(SchedError::DuplicatePriority { .. })
        ));
        assert_eq!(s.task_names(), ["x", "y"]);
    }
}

// ── Cadence and run state ─────────────────────────────────────────────────────

#[cfg(test)]
mod cadence {
    use super::*;

    fn world_at(t: u64, agent: &AgentState) -> WorldContext<'_> {
        WorldContext::new(Timestamp(t), agent, &EmptyWorld)
    }

    #[test]
    fn tick_if_due_follows_cadence() {
        let log = Log::default();
        let mut s = started(vec![probe("a", 1, true, &log).0]);
        let agent = AgentState::at(Position::ORIGIN);
        assert_eq!(s.cadence(), Duration::from_millis(100));

        assert!(s.tick_if_due(&world_at(0, &agent)).is_some());
        assert!(s.tick_if_due(&world_at(50, &agent)).is_none());
        assert!(s.tick_if_due(&world_at(100, &agent)).is_some());

        s.set_cadence(Duration::from_millis(250)).unwrap();
        assert!(s.tick_if_due(&world_at(300, &agent)).is_none());
        assert!(s.tick_if_due(&world_at(350, &agent)).is_some());
        assert_eq!(s.cycle(), Cycle(3));
    }

    #[test]
    fn sub_millisecond_cadence_rejected() {
        let log = Log::default();
        let mut s = started(vec![probe("a", 1, true, &log).0]);
        assert!(matches!(s.set_cadence(Duration::ZERO), Err(SchedError::Core(CoreError::ZeroCadence))));
        assert!(matches!(s.set_cadence(Duration::from_micros(500)), Err(SchedError::Core(CoreError::ZeroCadence))));
        assert_eq!(s.cadence(), Duration::from_millis(100));
    }

    #[test]
    fn nothing_happens_before_start() {
        let log = Log::default();
        let mut s = build(ControllerConfig::default(), vec![probe("a", 1, true, &log).0]);
        assert!(!s.is_running());
        assert_eq!(run(&mut s, 0), None);
        assert_eq!(s.cycle(), Cycle::ZERO);
        assert!(drain(&log).is_empty());
        assert!(s.observer().events.is_empty());
    }

    #[test]
    fn restart_begins_with_empty_slot() {
        let log = Log::default();
        let mut s = started(vec![probe("a", 1, true, &log).0]);
        run(&mut s, 0);
        s.stop();
        s.start();
        run(&mut s, 100);
        assert_eq!(drain(&log), ["a:activate", "a:tick", "a:deactivate", "a:activate", "a:tick"]);
    }
}

// ── Stale data ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod stale {
    use super::*;

    fn stale_reports(log: &EventLog) -> Vec<Cycle> {
        log.events
            .iter()
            .filter_map(|e| match e {
                SchedEvent::Diagnostic(cycle, Diagnostic::StaleData { .. }) => Some(*cycle),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn reported_once_per_transition() {
        let log = Log::default();
        let mut s = started(vec![probe("a", 1, true, &log).0]);
        let agent = AgentState::at(Position::ORIGIN);
        let mut tracker = EntityTracker::new(Duration::from_millis(500));
        tracker.refresh(vec![], Timestamp(0)).unwrap();

        tick_with(&mut s, &tracker, &agent, 500);
        tick_with(&mut s, &tracker, &agent, 1_500); // C2: stale
        tick_with(&mut s, &tracker, &agent, 1_600);
        tracker.refresh(vec![], Timestamp(1_700)).unwrap();
        tick_with(&mut s, &tracker, &agent, 1_800);
        tick_with(&mut s, &tracker, &agent, 3_000); // C5: stale again

        assert_eq!(stale_reports(s.observer()), vec![Cycle(2), Cycle(5)]);
    }

    #[test]
    fn never_refreshed_snapshot_not_reported() {
        let log = Log::default();
        let mut s = started(vec![probe("a", 1, true, &log).0]);
        run(&mut s, 60_000);
        assert!(stale_reports(s.observer()).is_empty());
    }
}

// ── SharedScheduler ───────────────────────────────────────────────────────────

#[cfg(test)]
mod shared {
    use super::*;

    #[test]
    fn drives_from_another_thread() {
        let log = Log::default();
        let shared = SharedScheduler::new(started(vec![probe("a", 1, true, &log).0]));
        let worker = shared.clone();

        std::thread::spawn(move || {
            let agent = AgentState::at(Position::ORIGIN);
            for t in 0..5 {
                worker.tick(&WorldContext::new(Timestamp(t * 100), &agent, &EmptyWorld));
            }
        })
        .join()
        .unwrap();

        assert_eq!(shared.with(|s| s.cycle()), Cycle(5));
        assert_eq!(shared.current_active_task(), Some(TaskId(0)));
        shared.stop();
        assert!(!shared.is_running());
        assert_eq!(drain(&log).last().map(String::as_str), Some("a:deactivate"));
    }
}
