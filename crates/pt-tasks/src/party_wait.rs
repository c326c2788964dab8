//! `PartyWait` — don't outrun the party.
//!
//! While any companion is farther than `max_distance`, the agent stops and
//! waits.  Once everyone is back in range the task is done until a companion
//! falls behind again.
//!
//! Companion positions come from the spatial collaborator and may be up to
//! one tracker refresh old.  Stale positions are still used: the failure
//! mode of trusting them is waiting a little too long, which is the safe
//! direction.

use std::time::Duration;

use tracing::debug;

use pt_behavior::{
    cancel_pending, Activity, Condition, Priority, Resolution, Task, TaskContext, TaskResult,
    WorldContext,
};
use pt_nav::Navigator;
use pt_spatial::{Classification, EntityFilter};

pub struct PartyWait {
    name:         String,
    priority:     Priority,
    max_distance: f32,
    timeout:      Option<Duration>,
    filter:       EntityFilter,
    wait:         Option<Activity>,
    done:         bool,
}

impl PartyWait {
    pub fn new(name: impl Into<String>, priority: Priority, max_distance: f32) -> Self {
        Self {
            name: name.into(),
            priority,
            max_distance,
            timeout: None,
            filter: EntityFilter::of(Classification::Companion),
            wait: None,
            done: false,
        }
    }

    /// Give up waiting after `timeout` even if a companion is still behind.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// `true` while an activity is holding the agent.
    pub fn is_waiting(&self) -> bool {
        self.wait.is_some()
    }

    /// Distance of the farthest companion, or `None` without companion data.
    fn farthest(world: &WorldContext<'_>, filter: &EntityFilter) -> Option<f32> {
        world.nearby(filter).last().map(|c| c.distance)
    }
}

impl Task for PartyWait {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "party_wait"
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    fn is_viable(&self, world: &WorldContext<'_>) -> TaskResult<bool> {
        Ok(Self::farthest(world, &self.filter).is_some_and(|d| d > self.max_distance))
    }

    fn on_deactivate(&mut self, nav: &mut dyn Navigator) -> TaskResult<()> {
        cancel_pending(&mut self.wait, nav);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        if self.wait.is_none() {
            let filter = self.filter.clone();
            let max = self.max_distance;
            let all_in_range =
                Condition::when(move |w| Self::farthest(w, &filter).is_none_or(|d| d <= max));
            let activity =
                Activity::open(self.hold_tag(), all_in_range, self.timeout, ctx.now(), ctx.nav)?;
            debug!(task = %self.name, max, "companion out of range, waiting");
            self.wait = Some(activity);
            return Ok(());
        }
        let Some(wait) = self.wait.as_mut() else {
            return Ok(());
        };

        match wait.poll(ctx.world, ctx.nav) {
            Resolution::Pending => {}
            state => {
                debug!(task = %self.name, ?state, "party wait over");
                self.wait = None;
                self.done = true;
            }
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.done
    }

    fn rearm(&mut self) -> bool {
        std::mem::replace(&mut self.done, false)
    }
}
