//! `Approach` — walk to the nearest target, interact with it, move on.
//!
//! Covers looting and gathering: targets are entity classifications
//! (`mining`, `herb`, `hostile` corpses, …).  The nearest matching entity
//! within `max_distance` is approached with `move_toward` intents; once
//! within `interact_range` the agent holds for `interact` while the host
//! performs the interaction.  The entity is then remembered as finished and
//! never targeted again.
//!
//! Unlike [`PartyWait`][crate::PartyWait], this task refuses to act on stale
//! spatial data: chasing a target that may have moved or despawned is the
//! aggressive failure mode.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::debug;

use pt_behavior::{
    cancel_pending, Activity, Condition, Priority, Task, TaskContext, TaskResult, WorldContext,
};
use pt_core::EntityId;
use pt_nav::Navigator;
use pt_spatial::{Classification, EntityFilter};

/// How many finished targets are remembered.
const FINISHED_MEMORY: usize = 64;

pub struct Approach {
    name:           String,
    priority:       Priority,
    targets:        Vec<Classification>,
    max_distance:   f32,
    interact_range: f32,
    interact:       Duration,
    target:         Option<EntityId>,
    interacting:    Option<Activity>,
    finished:       VecDeque<EntityId>,
}

impl Approach {
    pub fn new(
        name:           impl Into<String>,
        priority:       Priority,
        targets:        Vec<Classification>,
        max_distance:   f32,
        interact_range: f32,
        interact:       Duration,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            targets,
            max_distance,
            interact_range,
            interact,
            target: None,
            interacting: None,
            finished: VecDeque::new(),
        }
    }

    /// The entity currently being approached or interacted with.
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Entities already dealt with, oldest first.
    pub fn finished(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.finished.iter().copied()
    }

    fn filter(&self) -> EntityFilter {
        EntityFilter::default()
            .classifications(self.targets.iter().copied())
            .within(self.max_distance)
            .excluding(self.finished.iter().copied())
    }

    fn finish_target(&mut self) {
        if let Some(id) = self.target.take() {
            if self.finished.len() == FINISHED_MEMORY {
                self.finished.pop_front();
            }
            self.finished.push_back(id);
            debug!(task = %self.name, target = %id, "target finished");
        }
    }
}

impl Task for Approach {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "approach"
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    fn is_viable(&self, world: &WorldContext<'_>) -> TaskResult<bool> {
        if self.interacting.is_some() {
            return Ok(true);
        }
        if world.is_spatial_stale() {
            return Ok(false);
        }
        Ok(!world.nearby(&self.filter()).is_empty())
    }

    fn on_activate(&mut self, _ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        self.target = None;
        Ok(())
    }

    fn on_deactivate(&mut self, nav: &mut dyn Navigator) -> TaskResult<()> {
        cancel_pending(&mut self.interacting, nav);
        self.target = None;
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        if let Some(activity) = self.interacting.as_mut() {
            if activity.poll(ctx.world, ctx.nav).is_terminal() {
                self.interacting = None;
                self.finish_target();
            }
            return Ok(());
        }

        let Some(nearest) = ctx.world.nearby(&self.filter()).into_iter().next() else {
            self.target = None;
            return Ok(());
        };
        self.target = Some(nearest.id);

        if nearest.distance <= self.interact_range {
            let activity = Activity::open(
                self.hold_tag(),
                Condition::Never,
                Some(self.interact),
                ctx.now(),
                ctx.nav,
            )?;
            debug!(task = %self.name, target = %nearest.id, "interacting");
            self.interacting = Some(activity);
        } else {
            ctx.nav.move_toward(nearest.position);
        }
        Ok(())
    }
}
