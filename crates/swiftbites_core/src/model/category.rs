//! Category entity.

use crate::model::schema::EntityKind;
use crate::model::validation::{require_name, ValidationError};
use crate::model::Entity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CategoryId = Uuid;

/// Named grouping for recipes.
///
/// Recipes point at their category; the inverse set is derived by query
/// (`RecipeStore::recipes_in_category`) rather than stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub uuid: CategoryId,
    pub name: String,
}

impl Category {
    /// Creates a category with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    pub fn with_id(uuid: CategoryId, name: impl Into<String>) -> Self {
        Self {
            uuid,
            name: name.into(),
        }
    }
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Category;

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
