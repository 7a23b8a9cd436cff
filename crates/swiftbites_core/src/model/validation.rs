//! Field-level validation failures.

use crate::model::schema::EntityKind;
use crate::model::text::fold_key;
use crate::query::SortKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A required field is missing or malformed, or a request is ill-formed.
///
/// Always recoverable; callers surface it as a form message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is blank after trimming.
    EmptyName(EntityKind),
    /// Recipe ingredient quantity is blank after trimming.
    EmptyQuantity,
    /// Recipe serving must be at least one.
    ZeroServing,
    /// The requested sort key does not exist on this kind.
    UnsupportedSortKey { kind: EntityKind, key: SortKey },
    /// The kind has no searchable fields and cannot be listed.
    UnsupportedListKind(EntityKind),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName(kind) => write!(f, "{kind} name must not be blank"),
            Self::EmptyQuantity => write!(f, "ingredient quantity must not be blank"),
            Self::ZeroServing => write!(f, "recipe serving must be at least 1"),
            Self::UnsupportedSortKey { kind, key } => {
                write!(f, "{kind} cannot be sorted by {}", key.as_str())
            }
            Self::UnsupportedListKind(kind) => write!(f, "{kind} cannot be listed"),
        }
    }
}

impl Error for ValidationError {}

/// Rejects names whose folded key is empty: blank, or only combining
/// marks and whitespace.
pub(crate) fn require_name(kind: EntityKind, name: &str) -> Result<(), ValidationError> {
    if fold_key(name).is_empty() {
        return Err(ValidationError::EmptyName(kind));
    }
    Ok(())
}

pub(crate) fn require_quantity(quantity: &str) -> Result<(), ValidationError> {
    if quantity.trim().is_empty() {
        return Err(ValidationError::EmptyQuantity);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{require_name, require_quantity, ValidationError};
    use crate::model::schema::EntityKind;

    #[test]
    fn names_without_letters_are_rejected() {
        for name in ["", "   ", "\u{301}", " \u{300}\u{301} "] {
            assert_eq!(
                require_name(EntityKind::Category, name),
                Err(ValidationError::EmptyName(EntityKind::Category))
            );
        }
        assert!(require_name(EntityKind::Category, "\u{e9}").is_ok());
    }

    #[test]
    fn blank_quantity_is_rejected() {
        assert_eq!(require_quantity(" \t"), Err(ValidationError::EmptyQuantity));
        assert!(require_quantity("2 cups").is_ok());
    }
}
