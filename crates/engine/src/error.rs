//! The module contains the error the engine can throw.
//!
//! Every variant belongs to one of four classes, see [`ErrorKind`]:
//!
//! - validation: the caller sent a missing or invalid field.
//! - not found: a referenced id does not resolve.
//! - conflict: a structural rule would be violated (e.g. [`HasChildren`]).
//! - internal: the storage failed for reasons unrelated to the input.
//!
//!  [`HasChildren`]: EngineError::HasChildren
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Coarse classification of an [`EngineError`], used by the transport layer
/// to pick a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} is required")]
    MissingField(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Invalid parent: {0}")]
    InvalidParent(String),
    #[error("category {0} is not global")]
    NotGlobal(i64),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("cannot delete category with children: {0}")]
    HasChildren(String),
    #[error("still in use: {0}")]
    InUse(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_)
            | Self::InvalidAmount(_)
            | Self::InvalidName(_)
            | Self::InvalidFilter(_)
            | Self::InvalidParent(_)
            | Self::NotGlobal(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::ExistingKey(_) | Self::HasChildren(_) | Self::InUse(_) => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Translate constraint violations raised by the store into conflicts.
    ///
    /// `label` names the row the caller was writing, e.g. `"person 'Alice'"`.
    pub(crate) fn from_constraint(err: DbErr, label: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::ExistingKey(label.to_string()),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => Self::InUse(label.to_string()),
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidFilter(a), Self::InvalidFilter(b)) => a == b,
            (Self::InvalidParent(a), Self::InvalidParent(b)) => a == b,
            (Self::NotGlobal(a), Self::NotGlobal(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::HasChildren(a), Self::HasChildren(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_error_classes() {
        assert_eq!(
            EngineError::MissingField("wallet_id".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(EngineError::NotGlobal(3).kind(), ErrorKind::Validation);
        assert_eq!(
            EngineError::KeyNotFound("wallet".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            EngineError::HasChildren("Food".to_string()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            EngineError::Database(DbErr::Custom("boom".to_string())).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn missing_field_message() {
        let err = EngineError::MissingField("wallet_id".to_string());
        assert_eq!(err.to_string(), "wallet_id is required");
    }
}
