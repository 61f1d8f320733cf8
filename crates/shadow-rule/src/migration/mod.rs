//! Migration source metadata: which tables a source data source exposes.
//!
//! Introspection is blocking I/O. [`schema_tables_from_actual`] moves it to
//! tokio's blocking pool so it never runs while a rule lock is held.

pub mod source;
pub mod sqlite;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

pub use source::SourceDataSourceConfig;
pub use sqlite::SqliteIntrospector;

use crate::error::MigrationError;

/// Schema name to the matching table names in that schema.
pub type SchemaTables = BTreeMap<String, Vec<String>>;

/// Reads table metadata from an actual source data source.
///
/// `table_pattern` uses `LIKE` semantics: `%` matches any run, `_` one
/// character, `\` escapes either. `None` lists every table. Schemas without
/// a match are omitted.
pub trait SchemaIntrospector: Send + Sync {
    fn schema_tables(
        &self,
        source: &SourceDataSourceConfig,
        table_pattern: Option<&str>,
    ) -> Result<SchemaTables, MigrationError>;
}

/// Run `introspector` on the blocking pool.
pub async fn schema_tables_from_actual(
    introspector: Arc<dyn SchemaIntrospector>,
    source: SourceDataSourceConfig,
    table_pattern: Option<String>,
) -> Result<SchemaTables, MigrationError> {
    let span = shadow_tracing::schema_introspection_span!(&source, &table_pattern);
    let start = Instant::now();

    let task_span = span.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let _entered = task_span.enter();
        introspector.schema_tables(&source, table_pattern.as_deref())
    })
    .await;

    span.record("latency_ms", start.elapsed().as_millis() as u64);
    let tables = match joined {
        Ok(result) => result?,
        Err(e) => {
            tracing::error!(parent: &span, error = %e, "Schema introspection task failed");
            return Err(MigrationError::AddMigrationSourceResource(e.to_string()));
        }
    };

    span.record("schema_count", tables.len() as u64);
    span.record(
        "table_count",
        tables.values().map(Vec::len).sum::<usize>() as u64,
    );
    Ok(tables)
}
