//! Recipe and recipe-line persistence.
//!
//! # Responsibility
//! - CRUD for `recipes` and the owned `recipe_ingredients` lines.
//! - Inverse lookups (recipes by category, recipes by ingredient).
//!
//! # Invariants
//! - Lines are always read in `position ASC, uuid ASC` order.
//! - A line is only ever addressed through its owning recipe.
//! - Referenced category and ingredients must exist at write time.

use crate::error::{StoreError, StoreResult};
use crate::model::category::CategoryId;
use crate::model::ingredient::IngredientId;
use crate::model::recipe::{IngredientLine, Recipe, RecipeId, RecipeIngredient, RecipeIngredientId};
use crate::model::schema::EntityKind;
use crate::model::text::fold_key;
use crate::model::Entity;
use crate::query::{build_list_clause, ListQuery};
use crate::repo::unique::ensure_unique;
use crate::repo::{parse_uuid, require_exists, NOW_MS_SQL};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const RECIPE_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    summary,
    category_uuid,
    serving,
    time_minutes,
    instructions,
    image_data
FROM recipes";

const LINE_SELECT_SQL: &str = "SELECT
    uuid,
    recipe_uuid,
    ingredient_uuid,
    quantity
FROM recipe_ingredients";

pub(crate) struct RecipeRepo<'conn> {
    conn: &'conn Connection,
}

impl<'conn> RecipeRepo<'conn> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts the recipe row only; lines go through `insert_line`.
    pub(crate) fn insert(&self, recipe: &Recipe) -> StoreResult<()> {
        self.check_writable(recipe)?;

        self.conn.execute(
            "INSERT INTO recipes (
                uuid,
                name,
                name_key,
                summary,
                summary_key,
                category_uuid,
                serving,
                time_minutes,
                instructions,
                image_data
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                recipe.uuid.to_string(),
                recipe.name.trim(),
                fold_key(&recipe.name),
                recipe.summary.as_str(),
                fold_key(&recipe.summary),
                recipe.category_uuid.map(|id| id.to_string()),
                recipe.serving,
                recipe.time,
                recipe.instructions.as_str(),
                recipe.image_data.as_deref(),
            ],
        )?;
        Ok(())
    }

    /// Rewrites the scalar fields and category reference; lines untouched.
    pub(crate) fn update(&self, recipe: &Recipe) -> StoreResult<()> {
        self.check_writable(recipe)?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE recipes
                 SET
                    name = ?2,
                    name_key = ?3,
                    summary = ?4,
                    summary_key = ?5,
                    category_uuid = ?6,
                    serving = ?7,
                    time_minutes = ?8,
                    instructions = ?9,
                    image_data = ?10,
                    updated_at = {NOW_MS_SQL}
                 WHERE uuid = ?1;"
            ),
            params![
                recipe.uuid.to_string(),
                recipe.name.trim(),
                fold_key(&recipe.name),
                recipe.summary.as_str(),
                fold_key(&recipe.summary),
                recipe.category_uuid.map(|id| id.to_string()),
                recipe.serving,
                recipe.time,
                recipe.instructions.as_str(),
                recipe.image_data.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::not_found(EntityKind::Recipe, recipe.uuid));
        }
        Ok(())
    }

    fn check_writable(&self, recipe: &Recipe) -> StoreResult<()> {
        recipe.validate()?;
        ensure_unique(self.conn, recipe)?;
        if let Some(category_uuid) = recipe.category_uuid {
            require_exists(self.conn, EntityKind::Category, category_uuid)?;
        }
        Ok(())
    }

    pub(crate) fn get(&self, id: RecipeId) -> StoreResult<Option<Recipe>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECIPE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_recipe_row(row)?));
        }
        Ok(None)
    }

    pub(crate) fn list(&self, query: &ListQuery) -> StoreResult<Vec<Recipe>> {
        let clause = build_list_clause(EntityKind::Recipe.schema(), query)?;
        self.collect(&format!("{RECIPE_SELECT_SQL}{};", clause.sql), clause.params)
    }

    /// Recipes whose category is `category_uuid`, by name.
    pub(crate) fn list_in_category(&self, category_uuid: CategoryId) -> StoreResult<Vec<Recipe>> {
        self.collect(
            &format!(
                "{RECIPE_SELECT_SQL}
                 WHERE category_uuid = ?1
                 ORDER BY name_key ASC, uuid ASC;"
            ),
            vec![Value::Text(category_uuid.to_string())],
        )
    }

    /// Recipes with at least one line referencing `ingredient_uuid`, by name.
    pub(crate) fn list_using_ingredient(
        &self,
        ingredient_uuid: IngredientId,
    ) -> StoreResult<Vec<Recipe>> {
        self.collect(
            &format!(
                "{RECIPE_SELECT_SQL}
                 WHERE EXISTS (
                    SELECT 1
                    FROM recipe_ingredients ri
                    WHERE ri.recipe_uuid = recipes.uuid
                      AND ri.ingredient_uuid = ?1
                 )
                 ORDER BY name_key ASC, uuid ASC;"
            ),
            vec![Value::Text(ingredient_uuid.to_string())],
        )
    }

    fn collect(&self, sql: &str, bind_values: Vec<Value>) -> StoreResult<Vec<Recipe>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut recipes = Vec::new();
        while let Some(row) = rows.next()? {
            recipes.push(self.parse_recipe_row(row)?);
        }
        Ok(recipes)
    }

    /// Appends one owned line after the recipe's current last line.
    pub(crate) fn insert_line(
        &self,
        recipe_uuid: RecipeId,
        line: &IngredientLine,
    ) -> StoreResult<RecipeIngredient> {
        line.validate()?;
        require_exists(self.conn, EntityKind::Recipe, recipe_uuid)?;
        require_exists(self.conn, EntityKind::Ingredient, line.ingredient_uuid)?;

        let position: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0)
             FROM recipe_ingredients
             WHERE recipe_uuid = ?1;",
            [recipe_uuid.to_string()],
            |row| row.get(0),
        )?;

        let created = RecipeIngredient {
            uuid: Uuid::new_v4(),
            recipe_uuid,
            ingredient_uuid: line.ingredient_uuid,
            quantity: line.quantity.clone(),
        };
        self.conn.execute(
            "INSERT INTO recipe_ingredients (
                uuid,
                recipe_uuid,
                ingredient_uuid,
                quantity,
                position
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                created.uuid.to_string(),
                recipe_uuid.to_string(),
                created.ingredient_uuid.to_string(),
                created.quantity.as_str(),
                position,
            ],
        )?;
        Ok(created)
    }

    /// Returns whether `line_uuid` exists and is owned by `recipe_uuid`.
    pub(crate) fn owns_line(
        &self,
        recipe_uuid: RecipeId,
        line_uuid: RecipeIngredientId,
    ) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM recipe_ingredients
                WHERE uuid = ?1
                  AND recipe_uuid = ?2
            );",
            params![line_uuid.to_string(), recipe_uuid.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    /// Ids of every line owned by `recipe_uuid`, in display order.
    pub(crate) fn line_ids(&self, recipe_uuid: RecipeId) -> StoreResult<Vec<RecipeIngredientId>> {
        Ok(self
            .load_lines(recipe_uuid)?
            .into_iter()
            .map(|line| line.uuid)
            .collect())
    }

    pub(crate) fn load_lines(&self, recipe_uuid: RecipeId) -> StoreResult<Vec<RecipeIngredient>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LINE_SELECT_SQL}
             WHERE recipe_uuid = ?1
             ORDER BY position ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([recipe_uuid.to_string()])?;
        let mut lines = Vec::new();
        while let Some(row) = rows.next()? {
            lines.push(parse_line_row(row)?);
        }
        Ok(lines)
    }

    fn parse_recipe_row(&self, row: &Row<'_>) -> StoreResult<Recipe> {
        let uuid_text: String = row.get("uuid")?;
        let uuid = parse_uuid(&uuid_text, "recipes.uuid")?;
        let category_uuid = match row.get::<_, Option<String>>("category_uuid")? {
            Some(value) => Some(parse_uuid(&value, "recipes.category_uuid")?),
            None => None,
        };

        let recipe = Recipe {
            uuid,
            name: row.get("name")?,
            summary: row.get("summary")?,
            category_uuid,
            serving: row.get("serving")?,
            time: row.get("time_minutes")?,
            instructions: row.get("instructions")?,
            image_data: row.get("image_data")?,
            ingredients: self.load_lines(uuid)?,
        };
        recipe
            .validate()
            .map_err(|err| StoreError::InvalidData(format!("recipe row {uuid}: {err}")))?;
        Ok(recipe)
    }
}

fn parse_line_row(row: &Row<'_>) -> StoreResult<RecipeIngredient> {
    let uuid_text: String = row.get("uuid")?;
    let recipe_text: String = row.get("recipe_uuid")?;
    let ingredient_text: String = row.get("ingredient_uuid")?;

    Ok(RecipeIngredient {
        uuid: parse_uuid(&uuid_text, "recipe_ingredients.uuid")?,
        recipe_uuid: parse_uuid(&recipe_text, "recipe_ingredients.recipe_uuid")?,
        ingredient_uuid: parse_uuid(&ingredient_text, "recipe_ingredients.ingredient_uuid")?,
        quantity: row.get("quantity")?,
    })
}
