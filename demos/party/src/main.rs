//! party — scripted run of the behavior controller.
//!
//! One agent follows a straight route along +x with a companion trailing
//! behind.  Along the way it gathers a herb node, waits for the companion
//! when it goes AFK, and rests after taking damage.  The host side (movement,
//! companion, health) is a few lines of arithmetic per cycle; everything
//! else is the real scheduler.
//!
//! `RUST_LOG=debug cargo run -p party` shows every activation and hold.

use std::io::Cursor;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pt_behavior::{AgentState, WorldContext};
use pt_core::{ControllerConfig, Cycle, CycleClock, EntityId, Position, TaskId, Timestamp};
use pt_nav::{HoldGate, HoldTag, Navigator};
use pt_sched::{DeactivationReason, Diagnostic, SchedulerBuilder, SchedulerObserver};
use pt_spatial::{Classification, Entity, EntityTracker};
use pt_tasks::load_specs_reader;

// ── Constants ─────────────────────────────────────────────────────────────────

const CYCLES:          u64 = 60;
const CADENCE_MS:      u64 = 100;
/// Tracker refresh, deliberately slower than the scheduler cadence.
const REFRESH_MS:      u64 = 200;
/// Distance covered per cycle while moving.
const SPEED:           f32 = 2.0;
/// Companion trailing distance while it keeps up.
const TRAIL:           f32 = 6.0;
/// Cycles during which the companion stands still.
const COMPANION_AFK:   std::ops::Range<u64> = 14..30;
const DAMAGE_AT:       u64 = 40;
const REGEN_PER_CYCLE: f32 = 0.08;

const COMPANION: EntityId = EntityId(1);
const HERB:      EntityId = EntityId(100);

// ── Task specs ────────────────────────────────────────────────────────────────

const SPECS_CSV: &str = "\
name,kind,priority,max_distance,interact_range,threshold,resume_at,timeout_ms,targets\n\
rest,rest,1,,,0.35,0.9,5000,\n\
party,party_wait,2,20,,,,,\n\
gather,approach,5,60,4,,,800,herb\n\
route,follow_route,10,,,,,,\n\
";

// ── Host navigation ───────────────────────────────────────────────────────────

/// What the host's movement layer was last asked to do.  Holds are counted
/// by the scheduler's `HoldGate` in front of this.
#[derive(Default)]
struct HostNav {
    target:    Option<Position>,
    following: bool,
}

impl Navigator for HostNav {
    fn hold_position(&mut self, tag: &HoldTag) {
        info!(%tag, "nav: hold");
    }

    fn release_hold(&mut self, tag: &HoldTag) {
        info!(%tag, "nav: release");
    }

    fn move_toward(&mut self, target: Position) {
        self.target = Some(target);
        self.following = false;
    }

    fn follow_route(&mut self) {
        info!("nav: follow route");
        self.target = None;
        self.following = true;
    }
}

/// One cycle of host movement: stand still while any hold is outstanding.
fn move_agent(agent: &mut AgentState, nav: &HoldGate<HostNav>) {
    if nav.is_holding() {
        return;
    }
    let here = agent.position;
    if let Some(target) = nav.inner().target {
        let d = here.distance(target);
        agent.position = if d <= SPEED {
            target
        } else {
            let k = SPEED / d;
            Position::new(
                here.x + (target.x - here.x) * k,
                here.y + (target.y - here.y) * k,
                here.z + (target.z - here.z) * k,
            )
        };
    } else if nav.inner().following {
        agent.position = Position::new(here.x + SPEED, here.y, here.z);
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RunSummary {
    activations: usize,
    diagnostics: usize,
}

impl SchedulerObserver for RunSummary {
    fn on_activated(&mut self, cycle: Cycle, _task: TaskId, name: &str) {
        self.activations += 1;
        info!(%cycle, task = name, "activated");
    }

    fn on_deactivated(&mut self, cycle: Cycle, _task: TaskId, name: &str, reason: DeactivationReason) {
        info!(%cycle, task = name, %reason, "deactivated");
    }

    fn on_diagnostic(&mut self, cycle: Cycle, diagnostic: &Diagnostic) {
        self.diagnostics += 1;
        warn!(%cycle, ?diagnostic, "diagnostic");
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let specs = load_specs_reader(Cursor::new(SPECS_CSV))?;
    let config = ControllerConfig { cadence_ms: CADENCE_MS, ..ControllerConfig::default() };
    let mut sched = SchedulerBuilder::new(config, HostNav::default())
        .specs(&specs)?
        .observer(RunSummary::default())
        .build()?;
    info!(tasks = ?sched.task_names(), "scheduler built");

    let mut clock = CycleClock::new(Timestamp::ZERO, Duration::from_millis(CADENCE_MS));
    let mut tracker = EntityTracker::new(Duration::from_millis(REFRESH_MS));
    let mut agent = AgentState::at(Position::ORIGIN);
    let mut companion = Position::new(-TRAIL, 0.0, 0.0);
    let herb = Position::new(14.0, 3.0, 0.0);

    sched.start();
    for step in 0..CYCLES {
        let now = clock.now();

        // ── Host world update ─────────────────────────────────────────────
        if !COMPANION_AFK.contains(&step) {
            companion = Position::new(agent.position.x - TRAIL, agent.position.y, 0.0);
        }
        if step == DAMAGE_AT {
            agent = agent.clone().with_health(0.25);
            info!(health = agent.health, "agent took damage");
        }
        if tracker.is_refresh_due(now) {
            tracker.refresh(
                vec![
                    Entity::new(COMPANION, companion, Classification::Companion),
                    Entity::new(HERB, herb, Classification::HerbNode),
                ],
                now,
            )?;
        }

        // ── Controller cycle ──────────────────────────────────────────────
        let world = WorldContext::new(now, &agent, &tracker);
        if let Some(outcome) = sched.tick_if_due(&world) {
            if outcome.switched {
                info!(cycle = %outcome.cycle, active = ?sched.active_task_name(), x = agent.position.x, "switched");
            }
        }

        // ── Host reacts to the intents ────────────────────────────────────
        let resting = sched.active_task_name() == Some("rest");
        move_agent(&mut agent, sched.navigator());
        if resting && sched.navigator().is_holding() {
            agent = agent.clone().with_health(agent.health + REGEN_PER_CYCLE);
        }
        clock.advance();
    }
    sched.stop();

    let summary = sched.observer();
    info!(
        cycles = %sched.cycle(),
        activations = summary.activations,
        diagnostics = summary.diagnostics,
        x = agent.position.x,
        health = agent.health,
        "run complete"
    );
    Ok(())
}
