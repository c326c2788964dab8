//! Spatial-subsystem error type.

use thiserror::Error;

use pt_core::EntityId;

/// Errors produced by `pt-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("entity {0} appears more than once in one refresh")]
    DuplicateEntity(EntityId),

    #[error("unknown classification {0:?}")]
    UnknownClassification(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
