//! Shared repository for name-only entities (categories and ingredients).
//!
//! # Invariants
//! - `name` is stored trimmed; `name_key` always equals `fold_key(name)`.
//! - Writes validate and check uniqueness before touching the table.

use crate::error::{StoreError, StoreResult};
use crate::model::category::Category;
use crate::model::ingredient::Ingredient;
use crate::model::text::fold_key;
use crate::model::Entity;
use crate::query::{build_list_clause, ListQuery};
use crate::repo::unique::ensure_unique;
use crate::repo::{parse_uuid, NOW_MS_SQL};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::marker::PhantomData;
use uuid::Uuid;

/// Entity whose only stored attribute is a unique name.
pub(crate) trait NamedEntity: Entity + Sized {
    fn from_parts(uuid: Uuid, name: String) -> Self;
    fn name(&self) -> &str;
}

impl NamedEntity for Category {
    fn from_parts(uuid: Uuid, name: String) -> Self {
        Category::with_id(uuid, name)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedEntity for Ingredient {
    fn from_parts(uuid: Uuid, name: String) -> Self {
        Ingredient::with_id(uuid, name)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub(crate) struct NamedRepo<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<E>,
}

impl<'conn, E: NamedEntity> NamedRepo<'conn, E> {
    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    fn table(&self) -> &'static str {
        E::KIND.schema().table
    }

    pub(crate) fn insert(&self, entity: &E) -> StoreResult<()> {
        entity.validate()?;
        ensure_unique(self.conn, entity)?;

        self.conn.execute(
            &format!(
                "INSERT INTO {} (uuid, name, name_key) VALUES (?1, ?2, ?3);",
                self.table()
            ),
            params![
                entity.uuid().to_string(),
                entity.name().trim(),
                fold_key(entity.name()),
            ],
        )?;
        Ok(())
    }

    pub(crate) fn update(&self, entity: &E) -> StoreResult<()> {
        entity.validate()?;
        ensure_unique(self.conn, entity)?;

        let changed = self.conn.execute(
            &format!(
                "UPDATE {}
                 SET name = ?2,
                     name_key = ?3,
                     updated_at = {NOW_MS_SQL}
                 WHERE uuid = ?1;",
                self.table()
            ),
            params![
                entity.uuid().to_string(),
                entity.name().trim(),
                fold_key(entity.name()),
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::not_found(E::KIND, entity.uuid()));
        }
        Ok(())
    }

    pub(crate) fn get(&self, id: Uuid) -> StoreResult<Option<E>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, name FROM {} WHERE uuid = ?1;",
            self.table()
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.parse_row(row)?));
        }
        Ok(None)
    }

    pub(crate) fn list(&self, query: &ListQuery) -> StoreResult<Vec<E>> {
        let clause = build_list_clause(E::KIND.schema(), query)?;
        let sql = format!("SELECT uuid, name FROM {}{};", self.table(), clause.sql);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(clause.params))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(self.parse_row(row)?);
        }
        Ok(items)
    }

    fn parse_row(&self, row: &Row<'_>) -> StoreResult<E> {
        let uuid_text: String = row.get("uuid")?;
        let uuid = parse_uuid(&uuid_text, &format!("{}.uuid", self.table()))?;
        let entity = E::from_parts(uuid, row.get("name")?);
        entity.validate().map_err(|err| {
            StoreError::InvalidData(format!("{} row {uuid}: {err}", E::KIND))
        })?;
        Ok(entity)
    }
}
