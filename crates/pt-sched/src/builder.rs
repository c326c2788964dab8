//! Fluent builder for constructing a [`Scheduler`].

use std::collections::{HashMap, HashSet};

use pt_behavior::{Priority, Task};
use pt_core::{ControllerConfig, TaskId};
use pt_nav::{HoldGate, Navigator};
use pt_tasks::{build_tasks, TaskSpec};

use crate::scheduler::Slot;
use crate::{NoopObserver, SchedError, SchedResult, Scheduler, SchedulerObserver};

/// Fluent builder for [`Scheduler<N, O>`].
///
/// # Required inputs
///
/// - [`ControllerConfig`] — cadence, freshness bound, fault threshold, …
/// - `N: Navigator` — the host's navigation collaborator
/// - at least one task, via [`task`][Self::task], [`tasks`][Self::tasks] or
///   [`specs`][Self::specs]
///
/// # Optional inputs (have defaults)
///
/// | Method           | Default         |
/// |------------------|-----------------|
/// | `.observer(o)`   | `NoopObserver`  |
///
/// Tasks keep their registration order; it breaks ties between equal
/// priorities.
///
/// # Example
///
/// ```rust,ignore
/// let mut sched = SchedulerBuilder::new(config, navigator)
///     .specs(&specs)?
///     .task(Box::new(MyTask::new()))
///     .observer(EventLog::new())
///     .build()?;
/// ```
pub struct SchedulerBuilder<N: Navigator, O: SchedulerObserver = NoopObserver> {
    config:    ControllerConfig,
    navigator: N,
    tasks:     Vec<Box<dyn Task>>,
    observer:  O,
}

impl<N: Navigator> SchedulerBuilder<N, NoopObserver> {
    pub fn new(config: ControllerConfig, navigator: N) -> Self {
        Self {
            config,
            navigator,
            tasks:    Vec::new(),
            observer: NoopObserver,
        }
    }
}

impl<N: Navigator, O: SchedulerObserver> SchedulerBuilder<N, O> {
    /// Register one task.
    pub fn task(mut self, task: Box<dyn Task>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Register several tasks, in iteration order.
    pub fn tasks(mut self, tasks: impl IntoIterator<Item = Box<dyn Task>>) -> Self {
        self.tasks.extend(tasks);
        self
    }

    /// Build and register a task per spec, in order.
    pub fn specs(mut self, specs: &[TaskSpec]) -> SchedResult<Self> {
        self.tasks.extend(build_tasks(specs)?);
        Ok(self)
    }

    /// Replace the observer.
    pub fn observer<O2: SchedulerObserver>(self, observer: O2) -> SchedulerBuilder<N, O2> {
        SchedulerBuilder {
            config:    self.config,
            navigator: self.navigator,
            tasks:     self.tasks,
            observer,
        }
    }

    /// Validate the configuration and task set and return a stopped
    /// [`Scheduler`].
    pub fn build(self) -> SchedResult<Scheduler<N, O>> {
        self.config.validate()?;
        if self.tasks.is_empty() {
            return Err(SchedError::NoTasks);
        }

        // ── Names double as hold tags, so they must be unique ─────────────
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            let name = task.name();
            if name.trim().is_empty() {
                return Err(SchedError::Config("task name must not be empty".into()));
            }
            if !seen.insert(name) {
                return Err(SchedError::DuplicateName(name.to_owned()));
            }
        }

        if self.config.unique_priorities {
            check_unique_priorities(self.tasks.iter().map(|t| (t.priority(), t.name())))?;
        }

        let slots = self
            .tasks
            .into_iter()
            .enumerate()
            .map(|(i, task)| {
                let id = TaskId::try_from(i)
                    .map_err(|_| SchedError::Config(format!("too many tasks ({})", i + 1)))?;
                Ok(Slot::new(id, task))
            })
            .collect::<SchedResult<Vec<_>>>()?;

        Ok(Scheduler::from_parts(self.config, slots, HoldGate::new(self.navigator), self.observer))
    }
}

/// Fails on the first `(priority, name)` pair whose priority was already
/// seen.
pub(crate) fn check_unique_priorities<'a>(
    tasks: impl IntoIterator<Item = (Priority, &'a str)>,
) -> SchedResult<()> {
    let mut by_priority = HashMap::new();
    for (priority, name) in tasks {
        if let Some(first) = by_priority.insert(priority, name) {
            return Err(SchedError::DuplicatePriority {
                priority,
                first:  first.to_owned(),
                second: name.to_owned(),
            });
        }
    }
    Ok(())
}
