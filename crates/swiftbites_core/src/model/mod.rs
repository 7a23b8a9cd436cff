//! Domain model for the recipe store.
//!
//! # Responsibility
//! - Define category, ingredient, recipe and recipe line records.
//! - Describe the schema (unique keys, relationships) in one place.
//!
//! # Invariants
//! - Every entity is identified by a uuid generated at construction and
//!   never changed afterwards.
//! - Relationships are id fields, never object references.

pub mod category;
pub mod ingredient;
pub mod recipe;
pub mod schema;
pub mod text;
pub mod validation;

use schema::EntityKind;
use uuid::Uuid;
use validation::ValidationError;

/// Common surface the mutation engine needs from a top-level entity.
pub trait Entity {
    const KIND: EntityKind;

    fn uuid(&self) -> Uuid;

    /// Raw value of a unique field declared in the schema.
    fn unique_value(&self, field: &str) -> Option<&str>;

    fn validate(&self) -> Result<(), ValidationError>;
}
