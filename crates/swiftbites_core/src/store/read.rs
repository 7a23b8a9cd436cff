//! Snapshot reads: lookups by id, filtered/sorted lists, inverse lookups.
//!
//! Results are plain vectors reflecting the store at call time; callers
//! re-query after a change notice.

use super::RecipeStore;
use crate::error::StoreResult;
use crate::model::category::{Category, CategoryId};
use crate::model::ingredient::{Ingredient, IngredientId};
use crate::model::recipe::{Recipe, RecipeId};
use crate::model::schema::EntityKind;
use crate::model::validation::ValidationError;
use crate::query::{EntityRecord, ListQuery};
use crate::repo::count_rows;
use crate::repo::named_repo::NamedRepo;
use crate::repo::recipe_repo::RecipeRepo;
use log::debug;
use std::time::Instant;

impl RecipeStore {
    pub fn get_category(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        self.read(|conn| NamedRepo::<Category>::new(conn).get(id))
    }

    pub fn get_ingredient(&self, id: IngredientId) -> StoreResult<Option<Ingredient>> {
        self.read(|conn| NamedRepo::<Ingredient>::new(conn).get(id))
    }

    /// Loads a recipe with its lines in display order.
    pub fn get_recipe(&self, id: RecipeId) -> StoreResult<Option<Recipe>> {
        self.read(|conn| RecipeRepo::new(conn).get(id))
    }

    /// Lists entities of `kind` matching `query.filter`, ordered by
    /// `query.sort`/`query.direction` with ties broken by uuid.
    ///
    /// Recipe lines are not listable on their own.
    pub fn list(&self, kind: EntityKind, query: &ListQuery) -> StoreResult<Vec<EntityRecord>> {
        let started_at = Instant::now();
        let records = match kind {
            EntityKind::Category => self
                .list_categories(query)?
                .into_iter()
                .map(EntityRecord::Category)
                .collect::<Vec<_>>(),
            EntityKind::Ingredient => self
                .list_ingredients(query)?
                .into_iter()
                .map(EntityRecord::Ingredient)
                .collect(),
            EntityKind::Recipe => self
                .list_recipes(query)?
                .into_iter()
                .map(EntityRecord::Recipe)
                .collect(),
            EntityKind::RecipeIngredient => {
                return Err(ValidationError::UnsupportedListKind(kind).into());
            }
        };
        debug!(
            "event=store_list module=store kind={} filtered={} sort={} rows={} duration_ms={}",
            kind,
            !query.filter.trim().is_empty(),
            query.sort.as_str(),
            records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(records)
    }

    pub fn list_categories(&self, query: &ListQuery) -> StoreResult<Vec<Category>> {
        self.read(|conn| NamedRepo::<Category>::new(conn).list(query))
    }

    pub fn list_ingredients(&self, query: &ListQuery) -> StoreResult<Vec<Ingredient>> {
        self.read(|conn| NamedRepo::<Ingredient>::new(conn).list(query))
    }

    pub fn list_recipes(&self, query: &ListQuery) -> StoreResult<Vec<Recipe>> {
        self.read(|conn| RecipeRepo::new(conn).list(query))
    }

    /// The category's recipe back-references, by name.
    pub fn recipes_in_category(&self, id: CategoryId) -> StoreResult<Vec<Recipe>> {
        self.read(|conn| RecipeRepo::new(conn).list_in_category(id))
    }

    /// Recipes with a line referencing the ingredient, by name.
    pub fn recipes_using_ingredient(&self, id: IngredientId) -> StoreResult<Vec<Recipe>> {
        self.read(|conn| RecipeRepo::new(conn).list_using_ingredient(id))
    }

    /// Number of stored entities of `kind`.
    pub fn count(&self, kind: EntityKind) -> StoreResult<u64> {
        self.read(|conn| count_rows(conn, kind))
    }
}
