//! Ingredient entity.

use crate::model::schema::EntityKind;
use crate::model::validation::{require_name, ValidationError};
use crate::model::Entity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type IngredientId = Uuid;

/// Shared ingredient catalog entry.
///
/// Its lifetime is independent of every recipe line that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub uuid: IngredientId,
    pub name: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(uuid: IngredientId, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }
}

impl Entity for Ingredient {
    const KIND: EntityKind = EntityKind::Ingredient;

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn unique_value(&self, field: &str) -> Option<&str> {
        match field {
            "name" => Some(self.name.as_str()),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_name(Self::KIND, &self.name)
    }
}
