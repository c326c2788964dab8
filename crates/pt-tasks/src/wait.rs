//! `Wait` — pause once for a fixed time, then never again.

use std::time::Duration;

use pt_behavior::{
    cancel_pending, Activity, Condition, Priority, Task, TaskContext, TaskResult, WorldContext,
};
use pt_nav::Navigator;

pub struct Wait {
    name:     String,
    priority: Priority,
    pause:    Duration,
    wait:     Option<Activity>,
    done:     bool,
}

impl Wait {
    pub fn new(name: impl Into<String>, priority: Priority, pause: Duration) -> Self {
        Self { name: name.into(), priority, pause, wait: None, done: false }
    }
}

impl Task for Wait {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "wait"
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    fn is_viable(&self, _world: &WorldContext<'_>) -> TaskResult<bool> {
        Ok(!self.done)
    }

    // Preempted mid-pause: the pause starts over on the next activation.
    fn on_deactivate(&mut self, nav: &mut dyn Navigator) -> TaskResult<()> {
        cancel_pending(&mut self.wait, nav);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        if self.wait.is_none() {
            let activity =
                Activity::open(self.hold_tag(), Condition::Never, Some(self.pause), ctx.now(), ctx.nav)?;
            self.wait = Some(activity);
        }
        let finished = self
            .wait
            .as_mut()
            .is_some_and(|wait| wait.poll(ctx.world, ctx.nav).is_terminal());
        if finished {
            self.wait = None;
            self.done = true;
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        self.done
    }
}
