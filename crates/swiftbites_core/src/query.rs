//! Filter and sort options for list queries.
//!
//! # Responsibility
//! - Describe a list request: filter text, sort key, direction.
//! - Turn a request plus an entity schema into a SQL `WHERE`/`ORDER BY` tail.
//!
//! # Invariants
//! - Blank filter text applies no filter.
//! - Ordering is total: the sort column first, then `uuid ASC`.

use crate::model::category::Category;
use crate::model::ingredient::Ingredient;
use crate::model::recipe::Recipe;
use crate::model::schema::{EntityKind, EntitySchema};
use crate::model::text::fold_key;
use crate::model::validation::ValidationError;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field a list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Folded name, lexicographic.
    Name,
    /// Recipe serving count, numeric.
    Serving,
    /// Recipe time in minutes, numeric.
    Time,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Serving => "serving",
            Self::Time => "time",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    fn sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// One list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Substring matched case- and diacritic-insensitively.
    pub filter: String,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: String::new(),
            sort: SortKey::Name,
            direction: SortDirection::Ascending,
        }
    }
}

impl ListQuery {
    /// Unfiltered, name ascending.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(filter: impl Into<String>) -> Self {
        Self {
            filter: filter.into(),
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, sort: SortKey, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }
}

/// Heterogeneous list result for the kind-generic `list` entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityRecord {
    Category(Category),
    Ingredient(Ingredient),
    Recipe(Recipe),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Category(_) => EntityKind::Category,
            Self::Ingredient(_) => EntityKind::Ingredient,
            Self::Recipe(_) => EntityKind::Recipe,
        }
    }

    pub fn uuid(&self) -> Uuid {
        match self {
            Self::Category(category) => category.uuid,
            Self::Ingredient(ingredient) => ingredient.uuid,
            Self::Recipe(recipe) => recipe.uuid,
        }
    }
}

/// SQL tail appended to an entity's `SELECT ... FROM table`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ListClause {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Builds the filter/sort tail for `schema` from its declared columns.
pub(crate) fn build_list_clause(
    schema: &EntitySchema,
    query: &ListQuery,
) -> Result<ListClause, ValidationError> {
    if !schema.is_listable() {
        return Err(ValidationError::UnsupportedListKind(schema.kind));
    }
    let sort_column =
        schema
            .sort_column(query.sort)
            .ok_or(ValidationError::UnsupportedSortKey {
                kind: schema.kind,
                key: query.sort,
            })?;

    let mut sql = String::new();
    let mut params = Vec::new();

    let needle = fold_key(&query.filter);
    if !needle.is_empty() {
        let predicates = schema
            .search_columns
            .iter()
            .map(|column| format!("instr({column}, ?1) > 0"))
            .collect::<Vec<_>>();
        sql.push_str(&format!(" WHERE ({})", predicates.join(" OR ")));
        params.push(Value::Text(needle));
    }

    sql.push_str(&format!(
        " ORDER BY {sort_column} {}, uuid ASC",
        query.direction.sql()
    ));

    Ok(ListClause { sql, params })
}

#[cfg(test)]
mod tests {
    use super::{build_list_clause, ListQuery, SortDirection, SortKey};
    use crate::model::schema::EntityKind;
    use crate::model::validation::ValidationError;
    use rusqlite::types::Value;

    #[test]
    fn blank_filter_only_orders() {
        let clause =
            build_list_clause(EntityKind::Category.schema(), &ListQuery::matching("   ")).unwrap();
        assert_eq!(clause.sql, " ORDER BY name_key ASC, uuid ASC");
        assert!(clause.params.is_empty());
    }

    #[test]
    fn recipe_filter_searches_name_and_summary_with_folded_needle() {
        let query = ListQuery::matching("Crème ").sorted_by(SortKey::Time, SortDirection::Descending);
        let clause = build_list_clause(EntityKind::Recipe.schema(), &query).unwrap();
        assert_eq!(
            clause.sql,
            " WHERE (instr(name_key, ?1) > 0 OR instr(summary_key, ?1) > 0) ORDER BY time_minutes DESC, uuid ASC"
        );
        assert_eq!(clause.params, vec![Value::Text("creme".to_string())]);
    }

    #[test]
    fn unsupported_requests_are_validation_errors() {
        let query = ListQuery::all().sorted_by(SortKey::Serving, SortDirection::Ascending);
        assert_eq!(
            build_list_clause(EntityKind::Ingredient.schema(), &query),
            Err(ValidationError::UnsupportedSortKey {
                kind: EntityKind::Ingredient,
                key: SortKey::Serving,
            })
        );
        assert_eq!(
            build_list_clause(EntityKind::RecipeIngredient.schema(), &ListQuery::all()),
            Err(ValidationError::UnsupportedListKind(EntityKind::RecipeIngredient))
        );
    }
}
