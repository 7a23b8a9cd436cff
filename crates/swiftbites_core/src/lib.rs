//! Embedded data layer for the SwiftBites recipe app.
//! Stores categories, ingredients and recipes, enforces uniqueness and
//! relationship policy, and answers filtered, sorted list queries.

pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub(crate) mod repo;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryId};
pub use model::ingredient::{Ingredient, IngredientId};
pub use model::recipe::{
    IngredientLine, Recipe, RecipeDraft, RecipeId, RecipeIngredient, RecipeIngredientId,
};
pub use model::schema::{DeleteRule, EntityKind};
pub use model::validation::ValidationError;
pub use query::{EntityRecord, ListQuery, SortDirection, SortKey};
pub use store::change_feed::ChangeNotice;
pub use store::{open_shared, shared, RecipeStore, STORE_FILE_NAME};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
