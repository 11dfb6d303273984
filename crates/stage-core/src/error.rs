//! Data model errors

use uuid::Uuid;

/// Errors raised when mutating the scene data model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Instance already exists: {0}")]
    DuplicateInstance(Uuid),

    #[error("Instance not found: {0}")]
    InstanceNotFound(Uuid),

    #[error("Object already exists: {0}")]
    DuplicateObject(String),
}
