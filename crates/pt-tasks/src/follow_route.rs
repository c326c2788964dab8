//! `FollowRoute` — the fallback: when nothing else is viable, keep walking
//! the route.

use pt_behavior::{Priority, Task, TaskContext, TaskResult, WorldContext};
use pt_nav::Navigator;

pub struct FollowRoute {
    name:     String,
    priority: Priority,
}

impl FollowRoute {
    pub fn new(name: impl Into<String>, priority: Priority) -> Self {
        Self { name: name.into(), priority }
    }
}

impl Task for FollowRoute {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &'static str {
        "follow_route"
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn set_priority(&mut self, priority: Priority) {
        self.priority = priority;
    }

    fn is_viable(&self, _world: &WorldContext<'_>) -> TaskResult<bool> {
        Ok(true)
    }

    fn on_activate(&mut self, ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        ctx.nav.follow_route();
        Ok(())
    }

    fn on_deactivate(&mut self, _nav: &mut dyn Navigator) -> TaskResult<()> {
        Ok(())
    }

    // Route playback is owned by navigation; nothing to do per cycle.
    fn tick(&mut self, _ctx: &mut TaskContext<'_>) -> TaskResult<()> {
        Ok(())
    }
}
