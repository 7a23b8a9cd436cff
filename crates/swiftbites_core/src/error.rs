//! Typed failures returned across the store boundary.
//!
//! # Invariants
//! - Mutations and queries return these as values; nothing panics across
//!   the boundary.
//! - Only `StoreError::Db` raised while opening is fatal to callers.

use crate::db::DbError;
use crate::model::schema::EntityKind;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// A unique field collides with another entity of the same kind.
    DuplicateKey {
        kind: EntityKind,
        field: &'static str,
        value: String,
    },
    Validation(ValidationError),
    /// The referenced entity does not exist (or is not owned by the given parent).
    NotFound { kind: EntityKind, id: Uuid },
    /// Delete refused while other entities still reference the target.
    InUse {
        kind: EntityKind,
        id: Uuid,
        referenced_by: EntityKind,
        count: usize,
    },
    Db(DbError),
    /// Persisted row cannot be decoded into a valid entity.
    InvalidData(String),
}

impl StoreError {
    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// Short stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateKey { .. } => "duplicate_key",
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::InUse { .. } => "in_use",
            Self::Db(_) => "db",
            Self::InvalidData(_) => "invalid_data",
        }
    }

    /// Whether the caller can recover locally (show a message, ignore).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Db(_) | Self::InvalidData(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKey { kind, field, value } => {
                write!(f, "{kind} with {field} `{value}` already exists")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InUse {
                kind,
                id,
                referenced_by,
                count,
            } => write!(
                f,
                "{kind} {id} is still referenced by {count} {referenced_by} row(s)"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::DuplicateKey { .. } => None,
            Self::NotFound { .. } => None,
            Self::InUse { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
