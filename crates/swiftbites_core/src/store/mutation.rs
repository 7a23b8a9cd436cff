//! Create/update/delete entry points.
//!
//! Each public method is one transaction: validation, uniqueness,
//! relationship policy and read-back all happen under the write lock.
//! Line operations also report `Recipe` as changed, since every recipe
//! read embeds its lines.

use super::RecipeStore;
use crate::error::{StoreError, StoreResult};
use crate::model::category::{Category, CategoryId};
use crate::model::ingredient::{Ingredient, IngredientId};
use crate::model::recipe::{
    IngredientLine, Recipe, RecipeDraft, RecipeId, RecipeIngredient, RecipeIngredientId,
};
use crate::model::schema::EntityKind;
use crate::model::Entity;
use crate::repo::cascade::delete_entity;
use crate::repo::named_repo::{NamedEntity, NamedRepo};
use crate::repo::recipe_repo::RecipeRepo;
use rusqlite::Connection;

impl RecipeStore {
    /// Creates a category with a fresh id.
    ///
    /// Fails with `DuplicateKey` when another category folds to the same name.
    pub fn create_category(&self, name: impl Into<String>) -> StoreResult<Category> {
        let category = Category::new(name);
        self.write("create_category", |conn, changes| {
            let created = insert_named(conn, &category)?;
            changes.touch(EntityKind::Category);
            Ok(created)
        })
    }

    pub fn update_category(&self, category: &Category) -> StoreResult<Category> {
        self.write("update_category", |conn, changes| {
            let updated = update_named(conn, category)?;
            changes.touch(EntityKind::Category);
            Ok(updated)
        })
    }

    /// Deletes a category; its recipes survive with `category_uuid = None`.
    pub fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        self.write("delete_category", |conn, changes| {
            delete_entity(conn, EntityKind::Category, id, changes)
        })
    }

    pub fn create_ingredient(&self, name: impl Into<String>) -> StoreResult<Ingredient> {
        let ingredient = Ingredient::new(name);
        self.write("create_ingredient", |conn, changes| {
            let created = insert_named(conn, &ingredient)?;
            changes.touch(EntityKind::Ingredient);
            Ok(created)
        })
    }

    pub fn update_ingredient(&self, ingredient: &Ingredient) -> StoreResult<Ingredient> {
        self.write("update_ingredient", |conn, changes| {
            let updated = update_named(conn, ingredient)?;
            changes.touch(EntityKind::Ingredient);
            Ok(updated)
        })
    }

    /// Deletes an ingredient that no recipe line references.
    ///
    /// Fails with `InUse` (and changes nothing) while any line still
    /// points at it.
    pub fn delete_ingredient(&self, id: IngredientId) -> StoreResult<()> {
        self.write("delete_ingredient", |conn, changes| {
            delete_entity(conn, EntityKind::Ingredient, id, changes)
        })
    }

    /// Creates a recipe and all of its initial lines atomically.
    pub fn create_recipe(&self, draft: RecipeDraft) -> StoreResult<Recipe> {
        let (recipe, lines) = draft.into_recipe();
        self.write("create_recipe", |conn, changes| {
            let repo = RecipeRepo::new(conn);
            repo.insert(&recipe)?;
            changes.touch(EntityKind::Recipe);
            for line in &lines {
                repo.insert_line(recipe.uuid, line)?;
                changes.touch(EntityKind::RecipeIngredient);
            }
            read_back_recipe(&repo, recipe.uuid)
        })
    }

    /// Rewrites the recipe's scalar fields, category and image.
    ///
    /// `recipe.ingredients` is ignored; lines change only through the line
    /// operations below.
    pub fn update_recipe(&self, recipe: &Recipe) -> StoreResult<Recipe> {
        self.write("update_recipe", |conn, changes| {
            let repo = RecipeRepo::new(conn);
            repo.update(recipe)?;
            changes.touch(EntityKind::Recipe);
            read_back_recipe(&repo, recipe.uuid)
        })
    }

    /// Deletes a recipe and every line it owns; ingredients are untouched.
    pub fn delete_recipe(&self, id: RecipeId) -> StoreResult<()> {
        self.write("delete_recipe", |conn, changes| {
            delete_entity(conn, EntityKind::Recipe, id, changes)
        })
    }

    /// Appends a line owned by `recipe_id` referencing `ingredient_id`.
    ///
    /// Fails with `Validation(EmptyQuantity)` for a blank quantity.
    pub fn add_ingredient_to_recipe(
        &self,
        recipe_id: RecipeId,
        ingredient_id: IngredientId,
        quantity: impl Into<String>,
    ) -> StoreResult<RecipeIngredient> {
        let line = IngredientLine::new(ingredient_id, quantity);
        self.write("add_ingredient_to_recipe", |conn, changes| {
            let created = RecipeRepo::new(conn).insert_line(recipe_id, &line)?;
            changes.touch(EntityKind::RecipeIngredient);
            changes.touch(EntityKind::Recipe);
            Ok(created)
        })
    }

    /// Deletes one line owned by `recipe_id`; the ingredient survives.
    ///
    /// A line owned by another recipe is reported as `NotFound`.
    pub fn remove_ingredient_from_recipe(
        &self,
        recipe_id: RecipeId,
        line_id: RecipeIngredientId,
    ) -> StoreResult<()> {
        self.write("remove_ingredient_from_recipe", |conn, changes| {
            let repo = RecipeRepo::new(conn);
            if !repo.owns_line(recipe_id, line_id)? {
                return Err(StoreError::not_found(EntityKind::RecipeIngredient, line_id));
            }
            delete_entity(conn, EntityKind::RecipeIngredient, line_id, changes)?;
            changes.touch(EntityKind::Recipe);
            Ok(())
        })
    }

    /// Replaces the recipe's whole ordered line list in one transaction.
    pub fn set_recipe_ingredients(
        &self,
        recipe_id: RecipeId,
        lines: &[IngredientLine],
    ) -> StoreResult<Recipe> {
        self.write("set_recipe_ingredients", |conn, changes| {
            let repo = RecipeRepo::new(conn);
            for line in lines {
                line.validate()?;
            }
            for line_id in repo.line_ids(recipe_id)? {
                delete_entity(conn, EntityKind::RecipeIngredient, line_id, changes)?;
            }
            for line in lines {
                repo.insert_line(recipe_id, line)?;
                changes.touch(EntityKind::RecipeIngredient);
            }
            changes.touch(EntityKind::Recipe);
            read_back_recipe(&repo, recipe_id)
        })
    }
}

fn insert_named<E: NamedEntity>(conn: &Connection, entity: &E) -> StoreResult<E> {
    let repo = NamedRepo::<E>::new(conn);
    repo.insert(entity)?;
    read_back_named(&repo, entity)
}

fn update_named<E: NamedEntity>(conn: &Connection, entity: &E) -> StoreResult<E> {
    let repo = NamedRepo::<E>::new(conn);
    repo.update(entity)?;
    read_back_named(&repo, entity)
}

fn read_back_named<E: NamedEntity>(repo: &NamedRepo<'_, E>, entity: &E) -> StoreResult<E> {
    repo.get(entity.uuid())?.ok_or_else(|| {
        StoreError::InvalidData(format!("{} {} missing after write", E::KIND, entity.uuid()))
    })
}

fn read_back_recipe(repo: &RecipeRepo<'_>, id: RecipeId) -> StoreResult<Recipe> {
    repo.get(id)?
        .ok_or_else(|| StoreError::not_found(EntityKind::Recipe, id))
}
