//! Schema introspection of SQLite sources.

use rusqlite::{Connection, OpenFlags};

use super::source::SourceDataSourceConfig;
use super::{SchemaIntrospector, SchemaTables};
use crate::error::MigrationError;

/// Schema attached implicitly by SQLite for temporary objects.
const TEMP_SCHEMA: &str = "temp";

/// Reads table metadata from SQLite files through a read-only connection
/// opened per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteIntrospector;

impl SqliteIntrospector {
    pub fn new() -> Self {
        Self
    }

    fn read(
        &self,
        source: &SourceDataSourceConfig,
        table_pattern: Option<&str>,
    ) -> rusqlite::Result<SchemaTables> {
        let connection = Connection::open_with_flags(
            &source.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        for (schema, path) in &source.attached {
            connection.execute(
                &format!("ATTACH DATABASE ?1 AS {}", quote_identifier(schema)),
                [path],
            )?;
        }

        let pattern = table_pattern.unwrap_or("%");
        let mut result = SchemaTables::new();
        for schema in schema_names(&connection)? {
            let tables = table_names(&connection, &schema, pattern)?;
            if !tables.is_empty() {
                result.insert(schema, tables);
            }
        }
        Ok(result)
    }
}

impl SchemaIntrospector for SqliteIntrospector {
    fn schema_tables(
        &self,
        source: &SourceDataSourceConfig,
        table_pattern: Option<&str>,
    ) -> Result<SchemaTables, MigrationError> {
        self.read(source, table_pattern).map_err(|e| {
            tracing::error!(error = %e, source = %source, "Get schema tables map error");
            MigrationError::AddMigrationSourceResource(e.to_string())
        })
    }
}

fn schema_names(connection: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut statement = connection.prepare("PRAGMA database_list")?;
    let names = statement
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(names
        .into_iter()
        .filter(|name| name != TEMP_SCHEMA)
        .collect())
}

/// Ordinary tables of `schema` whose name matches the `LIKE` pattern.
fn table_names(connection: &Connection, schema: &str, pattern: &str) -> rusqlite::Result<Vec<String>> {
    let sql = format!(
        "SELECT name FROM {}.sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' AND name LIKE ?1 ESCAPE '\\' \
         ORDER BY name",
        quote_identifier(schema)
    );
    let mut statement = connection.prepare(&sql)?;
    let rows = statement.query_map([pattern], |row| row.get::<_, String>(0))?;
    rows.collect()
}

fn quote_identifier(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn create_database(path: &Path, ddl: &str) {
        let connection = Connection::open(path).unwrap();
        connection.execute_batch(ddl).unwrap();
    }

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_groups_tables_by_schema() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.db");
        let archive = dir.path().join("archive.db");
        create_database(
            &main,
            "CREATE TABLE t_order (id INTEGER PRIMARY KEY);
             CREATE TABLE t_order_item (id INTEGER PRIMARY KEY);
             CREATE TABLE t_user (id INTEGER PRIMARY KEY);
             CREATE VIEW v_order AS SELECT id FROM t_order;",
        );
        create_database(&archive, "CREATE TABLE t_order (id INTEGER PRIMARY KEY);");

        let source = SourceDataSourceConfig::new(path_str(&main)).attach("archive", path_str(&archive));
        let tables = SqliteIntrospector::new().schema_tables(&source, None).unwrap();

        assert_eq!(tables.len(), 2);
        assert_eq!(tables["main"], vec!["t_order", "t_order_item", "t_user"]);
        assert_eq!(tables["archive"], vec!["t_order"]);
    }

    #[test]
    fn test_pattern_filters_and_omits_empty_schemas() {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.db");
        let archive = dir.path().join("archive.db");
        create_database(
            &main,
            "CREATE TABLE t_order (id INTEGER);
             CREATE TABLE t_order_1 (id INTEGER);
             CREATE TABLE t_user (id INTEGER);",
        );
        create_database(&archive, "CREATE TABLE t_user (id INTEGER);");

        let source = SourceDataSourceConfig::new(path_str(&main)).attach("archive", path_str(&archive));
        let introspector = SqliteIntrospector::new();

        let exact = introspector.schema_tables(&source, Some("t_order")).unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact["main"], vec!["t_order"]);

        let prefixed = introspector.schema_tables(&source, Some("t\\_order%")).unwrap();
        assert_eq!(prefixed["main"], vec!["t_order", "t_order_1"]);

        let single_char = introspector.schema_tables(&source, Some("t_user")).unwrap();
        assert_eq!(single_char["main"], vec!["t_user"]);
        assert_eq!(single_char["archive"], vec!["t_user"]);
    }

    #[test]
    fn test_missing_file_maps_to_domain_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceDataSourceConfig::new(path_str(&dir.path().join("absent.db")));

        let err = SqliteIntrospector::new().schema_tables(&source, None).unwrap_err();
        assert!(matches!(err, MigrationError::AddMigrationSourceResource(_)));
        assert!(!dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("main"), "\"main\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }
}
