use pt_behavior::Priority;
use pt_core::{CoreError, TaskId};
use pt_tasks::TaskConfigError;
use thiserror::Error;

/// Setup and reconfiguration failures.  Runtime task faults are never
/// reported through this type.
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("scheduler configuration error: {0}")]
    Config(String),

    #[error("tasks {first:?} and {second:?} share priority {priority}")]
    DuplicatePriority {
        priority: Priority,
        first:    String,
        second:   String,
    },

    #[error("task name {0:?} is registered more than once")]
    DuplicateName(String),

    #[error("no tasks registered")]
    NoTasks,

    #[error("cannot reconfigure tasks while the scheduler is running")]
    Running,

    #[error("no task with id {0}")]
    UnknownTask(TaskId),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    TaskConfig(#[from] TaskConfigError),
}

pub type SchedResult<T> = Result<T, SchedError>;
