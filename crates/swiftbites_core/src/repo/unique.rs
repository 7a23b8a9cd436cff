//! Unique-key enforcement driven by `EntitySchema::unique_fields`.

use crate::error::{StoreError, StoreResult};
use crate::model::text::fold_key;
use crate::model::Entity;
use rusqlite::{params, Connection, OptionalExtension};

/// Fails with `DuplicateKey` when another row of the same kind already
/// holds an equal folded value for any unique field.
///
/// The entity's own row is excluded, so one check serves create and update.
pub(crate) fn ensure_unique<E: Entity>(conn: &Connection, entity: &E) -> StoreResult<()> {
    let schema = E::KIND.schema();
    for unique in schema.unique_fields {
        let Some(value) = entity.unique_value(unique.field) else {
            continue;
        };

        let clash: Option<String> = conn
            .query_row(
                &format!(
                    "SELECT uuid FROM {} WHERE {} = ?1 AND uuid <> ?2 LIMIT 1;",
                    schema.table, unique.key_column
                ),
                params![fold_key(value), entity.uuid().to_string()],
                |row| row.get(0),
            )
            .optional()?;

        if clash.is_some() {
            return Err(StoreError::DuplicateKey {
                kind: E::KIND,
                field: unique.field,
                value: value.trim().to_string(),
            });
        }
    }
    Ok(())
}
