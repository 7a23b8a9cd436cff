use swiftbites_core::db::migrations::{apply_migrations_to, current_user_version, latest_version};
use swiftbites_core::db::{open_db, open_db_in_memory, DbError};
use swiftbites_core::{ListQuery, RecipeStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "categories");
    assert_table_exists(&conn, "ingredients");
    assert_table_exists(&conn, "recipes");
    assert_table_exists(&conn, "recipe_ingredients");
    assert_index_exists(&conn, "idx_recipe_ingredients_recipe");
}

#[test]
fn opened_connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let orphan = conn.execute(
        "INSERT INTO recipe_ingredients (uuid, recipe_uuid, ingredient_uuid, quantity, position)
         VALUES ('line', 'missing-recipe', 'missing-ingredient', '1 cup', 0);",
        [],
    );
    assert!(orphan.is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swiftbites.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "recipes");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(matches!(
        RecipeStore::open(&path),
        Err(DbError::UnsupportedSchemaVersion { .. })
    ));
}

#[test]
fn older_schema_is_migrated_forward_without_losing_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.sqlite3");

    let mut conn = Connection::open(&path).unwrap();
    apply_migrations_to(&mut conn, 1).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), 1);
    assert_index_missing(&conn, "idx_recipes_serving");
    conn.execute(
        "INSERT INTO categories (uuid, name, name_key)
         VALUES ('5f0c6a52-5d1b-4c55-9a0e-8f3c1d2b7a10', 'Dessert', 'dessert');",
        [],
    )
    .unwrap();
    drop(conn);

    let store = RecipeStore::open(&path).unwrap();
    let categories = store.list_categories(&ListQuery::all()).unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Dessert");
    store.close().unwrap();

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_index_exists(&conn, "idx_recipes_serving");
}

#[test]
fn store_file_in_missing_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.sqlite3");

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn sqlite_object_exists(conn: &Connection, object_type: &str, name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [object_type, name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert!(
        sqlite_object_exists(conn, "table", table_name),
        "table {table_name} does not exist"
    );
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert!(
        sqlite_object_exists(conn, "index", index_name),
        "index {index_name} does not exist"
    );
}

fn assert_index_missing(conn: &Connection, index_name: &str) {
    assert!(
        !sqlite_object_exists(conn, "index", index_name),
        "index {index_name} should not exist yet"
    );
}
