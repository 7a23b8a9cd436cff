//! Recipe entity and its owned ingredient lines.
//!
//! # Invariants
//! - A `RecipeIngredient` belongs to exactly one recipe (`recipe_uuid`)
//!   and never outlives it.
//! - `RecipeIngredient::ingredient_uuid` is a shared reference; the
//!   ingredient survives the line.
//! - `serving >= 1`; `time` is minutes.

use crate::model::category::CategoryId;
use crate::model::ingredient::IngredientId;
use crate::model::schema::EntityKind;
use crate::model::validation::{require_name, require_quantity, ValidationError};
use crate::model::Entity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RecipeId = Uuid;
pub type RecipeIngredientId = Uuid;

/// One ingredient line owned by a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub uuid: RecipeIngredientId,
    /// Owning recipe.
    pub recipe_uuid: RecipeId,
    /// Referenced (not owned) catalog ingredient.
    pub ingredient_uuid: IngredientId,
    /// Free-form amount, e.g. `2 cups`.
    pub quantity: String,
}

/// Ingredient line input used when creating or replacing recipe lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub ingredient_uuid: IngredientId,
    pub quantity: String,
}

impl IngredientLine {
    pub fn new(ingredient_uuid: IngredientId, quantity: impl Into<String>) -> Self {
        Self {
            ingredient_uuid,
            quantity: quantity.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_quantity(&self.quantity)
    }
}

/// A recipe with its ordered ingredient lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub uuid: RecipeId,
    pub name: String,
    pub summary: String,
    /// Nullified when the category is deleted.
    pub category_uuid: Option<CategoryId>,
    pub serving: u32,
    /// Preparation time in minutes.
    pub time: u32,
    pub instructions: String,
    pub image_data: Option<Vec<u8>>,
    /// Owned lines in insertion order. Read-only on update; use the line
    /// operations on the store to change them.
    pub ingredients: Vec<RecipeIngredient>,
}

impl Entity for Recipe {
    const KIND: EntityKind = EntityKind::Recipe;

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
        require_name(Self::KIND, &self.name)?;
        if self.serving == 0 {
            return Err(ValidationError::ZeroServing);
        }
        Ok(())
    }
}

/// Input for creating a recipe together with its initial lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    pub summary: String,
    pub category_uuid: Option<CategoryId>,
    pub serving: u32,
    pub time: u32,
    pub instructions: String,
    pub image_data: Option<Vec<u8>>,
    pub ingredients: Vec<IngredientLine>,
}

impl RecipeDraft {
    /// Starts a draft with the required scalar fields; everything else empty.
    pub fn new(name: impl Into<String>, serving: u32, time: u32) -> Self {
        Self {
            name: name.into(),
            summary: String::new(),
            category_uuid: None,
            serving,
            time,
            instructions: String::new(),
            image_data: None,
            ingredients: Vec::new(),
        }
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn category(mut self, category_uuid: CategoryId) -> Self {
        self.category_uuid = Some(category_uuid);
        self
    }

    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn image(mut self, image_data: Vec<u8>) -> Self {
        self.image_data = Some(image_data);
        self
    }

    pub fn ingredient(mut self, ingredient_uuid: IngredientId, quantity: impl Into<String>) -> Self {
        self.ingredients
            .push(IngredientLine::new(ingredient_uuid, quantity));
        self
    }

    /// Materializes the recipe with a fresh id; lines get ids on insert.
    pub(crate) fn into_recipe(self) -> (Recipe, Vec<IngredientLine>) {
        let recipe = Recipe {
            uuid: Uuid::new_v4(),
            name: self.name,
            summary: self.summary,
            category_uuid: self.category_uuid,
            serving: self.serving,
            time: self.time,
            instructions: self.instructions,
            image_data: self.image_data,
            ingredients: Vec::new(),
        };
        (recipe, self.ingredients)
    }
}

#[cfg(test)]
mod tests {
    use super::{IngredientLine, RecipeDraft};
    use crate::model::schema::EntityKind;
    use crate::model::validation::ValidationError;
    use crate::model::Entity;
    use uuid::Uuid;

    #[test]
    fn draft_builds_recipe_with_fresh_id() {
        let ingredient = Uuid::new_v4();
        let (recipe, lines) = RecipeDraft::new("Pancakes", 4, 20)
            .summary("Fluffy")
            .ingredient(ingredient, "2 cups")
            .into_recipe();

        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.summary, "Fluffy");
        assert!(recipe.ingredients.is_empty());
        assert_eq!(lines, vec![IngredientLine::new(ingredient, "2 cups")]);
    }

    #[test]
    fn recipe_validation_rejects_blank_name_and_zero_serving() {
        let (mut recipe, _) = RecipeDraft::new("  ", 2, 10).into_recipe();
        assert_eq!(
            recipe.validate(),
            Err(ValidationError::EmptyName(EntityKind::Recipe))
        );

        recipe.name = "Soup".to_string();
        recipe.serving = 0;
        assert_eq!(recipe.validate(), Err(ValidationError::ZeroServing));
    }

    #[test]
    fn blank_quantity_is_rejected() {
        let line = IngredientLine::new(Uuid::new_v4(), " \t");
        assert_eq!(line.validate(), Err(ValidationError::EmptyQuantity));
    }
}
