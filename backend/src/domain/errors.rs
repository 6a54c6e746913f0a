//! Error taxonomy for the domain layer.
//!
//! Services distinguish three recoverable kinds so a transport layer can
//! map them without inspecting messages: `Validation` for malformed
//! input, `Conflict` for operations that collide with existing state, and
//! `NotFound` for entities that are missing or not owned by the caller
//! (the two cases are deliberately indistinguishable). Anything else is
//! an `Internal` storage failure.

use crate::storage::traits::StorageConflict;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        DomainError::Conflict(message.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        DomainError::NotFound { entity }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Map a repository error onto the domain taxonomy. Constraint violations
/// raised by the storage backstop surface as the same `Conflict` the
/// primary validation path produces; everything else is internal.
pub fn map_storage_error(err: anyhow::Error) -> DomainError {
    if let Some(conflict) = err.downcast_ref::<StorageConflict>() {
        return DomainError::Conflict(conflict.0.clone());
    }
    DomainError::Internal(err)
}
