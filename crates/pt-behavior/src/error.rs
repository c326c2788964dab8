use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("activity {0:?} waits on a condition that can never hold and has no timeout")]
    InvalidCondition(String),
}

pub type ActivityResult<T> = Result<T, ActivityError>;

/// An unexpected failure inside a task's contract method.
///
/// The scheduler contains these: the task is forcibly deactivated and sits
/// out a cycle.  They are never surfaced to the host as scheduler errors.
#[derive(Debug, Error)]
pub enum TaskFault {
    #[error(transparent)]
    Activity(#[from] ActivityError),

    #[error("{0}")]
    Failed(String),
}

impl TaskFault {
    pub fn failed(msg: impl Into<String>) -> Self {
        TaskFault::Failed(msg.into())
    }
}

pub type TaskResult<T> = Result<T, TaskFault>;
