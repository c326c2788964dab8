//! Task specifications: what to build, before anything is built.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use pt_behavior::Priority;
use pt_spatial::Classification;

use crate::TaskConfigError;

// ── TaskKind ──────────────────────────────────────────────────────────────────

/// The closed set of task kinds this crate can build.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    PartyWait,
    Rest,
    Approach,
    Wait,
    FollowRoute,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::PartyWait,
        TaskKind::Rest,
        TaskKind::Approach,
        TaskKind::Wait,
        TaskKind::FollowRoute,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::PartyWait   => "party_wait",
            TaskKind::Rest        => "rest",
            TaskKind::Approach    => "approach",
            TaskKind::Wait        => "wait",
            TaskKind::FollowRoute => "follow_route",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = TaskConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TaskKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TaskConfigError::UnknownKind(s.to_owned()))
    }
}

// ── TaskParams ────────────────────────────────────────────────────────────────

/// Per-kind parameters.  Which ones are required depends on the kind; see
/// [`build_task`][crate::build_task].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskParams {
    /// `party_wait`: companion distance that triggers waiting.
    /// `approach`: search radius.
    pub max_distance:   Option<f32>,

    /// `approach`: distance at which the target can be interacted with.
    pub interact_range: Option<f32>,

    /// `rest`: health fraction below which resting starts.
    pub threshold:      Option<f32>,

    /// `rest`: health fraction at which resting ends.
    pub resume_at:      Option<f32>,

    /// `wait`, `approach`: pause / interaction length.
    /// `party_wait`, `rest`: optional upper bound on one wait.
    pub timeout_ms:     Option<u64>,

    /// `approach`: what to walk to.
    pub targets:        Vec<Classification>,
}

impl TaskParams {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

// ── TaskSpec ──────────────────────────────────────────────────────────────────

/// One configured task.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskSpec {
    pub name:     String,
    pub kind:     TaskKind,
    pub priority: Priority,
    pub params:   TaskParams,
}

impl TaskSpec {
    pub fn new(name: impl Into<String>, kind: TaskKind, priority: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            priority: Priority(priority),
            params: TaskParams::default(),
        }
    }

    pub fn party_wait(name: impl Into<String>, priority: u32, max_distance: f32) -> Self {
        let mut spec = Self::new(name, TaskKind::PartyWait, priority);
        spec.params.max_distance = Some(max_distance);
        spec
    }

    pub fn rest(name: impl Into<String>, priority: u32, threshold: f32, resume_at: f32) -> Self {
        let mut spec = Self::new(name, TaskKind::Rest, priority);
        spec.params.threshold = Some(threshold);
        spec.params.resume_at = Some(resume_at);
        spec
    }

    pub fn approach<I>(
        name:           impl Into<String>,
        priority:       u32,
        targets:        I,
        max_distance:   f32,
        interact_range: f32,
        interact_ms:    u64,
    ) -> Self
    where
        I: IntoIterator<Item = Classification>,
    {
        let mut spec = Self::new(name, TaskKind::Approach, priority);
        spec.params.targets = targets.into_iter().collect();
        spec.params.max_distance = Some(max_distance);
        spec.params.interact_range = Some(interact_range);
        spec.params.timeout_ms = Some(interact_ms);
        spec
    }

    pub fn wait(name: impl Into<String>, priority: u32, pause_ms: u64) -> Self {
        let mut spec = Self::new(name, TaskKind::Wait, priority);
        spec.params.timeout_ms = Some(pause_ms);
        spec
    }

    pub fn follow_route(name: impl Into<String>, priority: u32) -> Self {
        Self::new(name, TaskKind::FollowRoute, priority)
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.params.timeout_ms = Some(ms);
        self
    }
}
