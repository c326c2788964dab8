//! `Rest` — stop and recover when health runs low.
//!
//! Starts below `threshold`, keeps going until `resume_at` (hysteresis so
//! the agent doesn't stutter around the threshold), optionally bounded by a
//! timeout.

use std::time::Duration;

use tracing::debug;

use pt_behavior::{
    cancel_pending, Activity, Condition, Priority, Task, TaskContext, TaskResult, WorldContext,
};
use pt_nav::Navigator;

pub struct Rest {
    name:      String,
    priority:  Priority,
    threshold: f32,
    resume_at: f32,
    timeout:   Option<Duration>,
    wait:      Option<Activity>,
    done:      bool,
}

impl Rest {
    /// `threshold <= resume_at` is the caller's responsibility; the factory
    /// checks it.
    pub fn new(name: impl Into<String>, priority: Priority, threshold: f32, resume_at: f32) -> Self {
        Self {
            name: name.into(),
            priority,
            threshold,
            resume_at,
            timeout: None,
            wait: None,
            done: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_resting(&self) -> bool {
        self.wait.is_some()
    }
}

impl Task for Rest {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "rest"
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    fn is_viable(&self, world: &WorldContext<'_>) -> TaskResult<bool> {
        let health = world.agent.health;
        Ok(health < self.threshold || (self.is_resting() && health < self.resume_at))
    }

    fn on_deactivate(&mut self, nav: &mut dyn Navigator) -> TaskResult<()> {
        cancel_pending(&mut self.wait, nav);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        if self.wait.is_none() {
            let resume_at = self.resume_at;
            let recovered = Condition::when(move |w| w.agent.health >= resume_at);
            let activity =
                Activity::open(self.hold_tag(), recovered, self.timeout, ctx.now(), ctx.nav)?;
            debug!(task = %self.name, health = ctx.world.agent.health, "resting");
            self.wait = Some(activity);
        }

        if let Some(wait) = self.wait.as_mut() {
            let state = wait.poll(ctx.world, ctx.nav);
            if state.is_terminal() {
                debug!(task = %self.name, ?state, health = ctx.world.agent.health, "rest over");
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
