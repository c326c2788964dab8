use pt_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskConfigError {
    #[error("unknown task kind {0:?}")]
    UnknownKind(String),

    #[error("task {task:?}: missing parameter `{param}`")]
    MissingParam { task: String, param: &'static str },

    #[error("task {task:?}: invalid `{param}`: {reason}")]
    InvalidParam {
        task:   String,
        param:  &'static str,
        reason: String,
    },

    #[error("task spec parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TaskConfigResult<T> = Result<T, TaskConfigError>;
