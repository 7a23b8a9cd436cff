//! Explicit schema description for the recipe store.
//!
//! # Responsibility
//! - Map each entity kind to its table, unique keys, searchable and
//!   sortable columns.
//! - Declare every relationship and the policy applied when its target
//!   is deleted.
//!
//! # Invariants
//! - Relationship policy lives here only; the cascade engine interprets
//!   it uniformly and no repository hard-codes per-kind delete behavior.
//! - Every referencing column points at the `uuid` of its target table.

use crate::query::SortKey;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The four entity kinds stored by the recipe core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Category,
    Ingredient,
    RecipeIngredient,
    Recipe,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Category,
        EntityKind::Ingredient,
        EntityKind::RecipeIngredient,
        EntityKind::Recipe,
    ];

    /// Stable lowercase name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Ingredient => "ingredient",
            Self::RecipeIngredient => "recipe_ingredient",
            Self::Recipe => "recipe",
        }
    }

    /// Schema entry for this kind.
    pub fn schema(self) -> &'static EntitySchema {
        match self {
            Self::Category => &CATEGORY_SCHEMA,
            Self::Ingredient => &INGREDIENT_SCHEMA,
            Self::RecipeIngredient => &RECIPE_INGREDIENT_SCHEMA,
            Self::Recipe => &RECIPE_SCHEMA,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field whose folded value must be unique within its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueField {
    /// Field name as exposed to callers.
    pub field: &'static str,
    /// Column holding the folded comparison key.
    pub key_column: &'static str,
}

/// Storage and query shape of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub table: &'static str,
    pub unique_fields: &'static [UniqueField],
    /// Folded columns matched by a list filter. Empty means not listable.
    pub search_columns: &'static [&'static str],
    pub sort_columns: &'static [(SortKey, &'static str)],
}

impl EntitySchema {
    /// Column backing `key`, or `None` when the kind cannot sort by it.
    pub fn sort_column(&self, key: SortKey) -> Option<&'static str> {
        self.sort_columns
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, column)| *column)
    }

    pub fn is_listable(&self) -> bool {
        !self.search_columns.is_empty()
    }
}

/// What happens to referencing rows when the referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteRule {
    /// Clear the reference; the referencing row survives.
    Nullify,
    /// Delete the referencing rows together with the target.
    Cascade,
    /// Refuse the delete while any referencing row exists.
    Deny,
}

/// Foreign-key style link from `owner.column` to `target.uuid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub name: &'static str,
    /// Kind holding the referencing column.
    pub owner: EntityKind,
    pub column: &'static str,
    pub target: EntityKind,
    pub on_delete: DeleteRule,
}

const NAME_UNIQUE: &[UniqueField] = &[UniqueField {
    field: "name",
    key_column: "name_key",
}];

const CATEGORY_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Category,
    table: "categories",
    unique_fields: NAME_UNIQUE,
    search_columns: &["name_key"],
    sort_columns: &[(SortKey::Name, "name_key")],
};

const INGREDIENT_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Ingredient,
    table: "ingredients",
    unique_fields: NAME_UNIQUE,
    search_columns: &["name_key"],
    sort_columns: &[(SortKey::Name, "name_key")],
};

const RECIPE_INGREDIENT_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::RecipeIngredient,
    table: "recipe_ingredients",
    unique_fields: &[],
    search_columns: &[],
    sort_columns: &[],
};

const RECIPE_SCHEMA: EntitySchema = EntitySchema {
    kind: EntityKind::Recipe,
    table: "recipes",
    unique_fields: NAME_UNIQUE,
    search_columns: &["name_key", "summary_key"],
    sort_columns: &[
        (SortKey::Name, "name_key"),
        (SortKey::Serving, "serving"),
        (SortKey::Time, "time_minutes"),
    ],
};

/// Every relationship in the store.
pub const RELATIONSHIPS: &[Relationship] = &[
    Relationship {
        name: "recipe.category",
        owner: EntityKind::Recipe,
        column: "category_uuid",
        target: EntityKind::Category,
        on_delete: DeleteRule::Nullify,
    },
    Relationship {
        name: "recipe_ingredient.recipe",
        owner: EntityKind::RecipeIngredient,
        column: "recipe_uuid",
        target: EntityKind::Recipe,
        on_delete: DeleteRule::Cascade,
    },
    Relationship {
        name: "recipe_ingredient.ingredient",
        owner: EntityKind::RecipeIngredient,
        column: "ingredient_uuid",
        target: EntityKind::Ingredient,
        on_delete: DeleteRule::Deny,
    },
];

/// Relationships pointing at `kind`, `Deny` rules first.
///
/// Refusals are evaluated before any nullify or cascade work starts.
pub fn inbound_relationships(kind: EntityKind) -> Vec<&'static Relationship> {
    let mut inbound = RELATIONSHIPS
        .iter()
        .filter(|relationship| relationship.target == kind)
        .collect::<Vec<_>>();
    inbound.sort_by_key(|relationship| relationship.on_delete != DeleteRule::Deny);
    inbound
}
