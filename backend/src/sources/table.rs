//! PostgreSQL table source
//!
//! Rows are read as `to_jsonb(row)` so that every table, whatever its
//! columns, comes back in the same untyped shape.

use sqlx::PgPool;

use shared::{FetchFilter, RawRecord};

use super::adapter::{RecordSink, SourceAdapter, SourceError, TableSpec};

/// One PostgreSQL table behind the adapter boundary
#[derive(Clone)]
pub struct TableSource {
    db: PgPool,
    spec: TableSpec,
}

impl TableSource {
    pub fn new(db: PgPool, spec: TableSpec) -> Self {
        Self { db, spec }
    }

    fn select_sql(&self, filter: &FetchFilter) -> String {
        let direction = if filter.order_by_date_descending {
            "DESC"
        } else {
            "ASC"
        };
        // Identifiers come from the static field tables, never from input
        format!(
            "SELECT to_jsonb(t) FROM {table} t ORDER BY t.{date} {direction} NULLS LAST LIMIT $1",
            table = self.spec.name,
            date = self.spec.date_column,
        )
    }

    fn insert_sql(&self, columns: &[&str]) -> String {
        let list = columns.join(", ");
        format!(
            "INSERT INTO {table} ({list}) \
             SELECT {list} FROM jsonb_populate_record(NULL::{table}, $1) \
             RETURNING to_jsonb({table})",
            table = self.spec.name,
        )
    }
}

fn into_record(table: &str, value: serde_json::Value) -> Result<RawRecord, SourceError> {
    match value {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(SourceError::decode(table, format!("expected an object, got {}", other))),
    }
}

#[axum::async_trait]
impl SourceAdapter for TableSource {
    fn name(&self) -> &str {
        self.spec.name
    }

    async fn fetch(&self, filter: FetchFilter) -> Result<Vec<RawRecord>, SourceError> {
        let rows = sqlx::query_scalar::<_, serde_json::Value>(&self.select_sql(&filter))
            .bind(i64::from(filter.limit))
            .fetch_all(&self.db)
            .await
            .map_err(|e| SourceError::unavailable(self.spec.name, e))?;

        rows.into_iter()
            .map(|value| into_record(self.spec.name, value))
            .collect()
    }
}

#[axum::async_trait]
impl RecordSink for TableSource {
    async fn insert(&self, row: RawRecord) -> Result<RawRecord, SourceError> {
        let columns: Vec<&str> = self
            .spec
            .columns
            .iter()
            .copied()
            .filter(|column| row.contains_key(*column))
            .collect();
        if columns.is_empty() {
            return Err(SourceError::decode(self.spec.name, "row has no known columns"));
        }

        let stored = sqlx::query_scalar::<_, serde_json::Value>(&self.insert_sql(&columns))
            .bind(serde_json::Value::Object(row))
            .fetch_one(&self.db)
            .await
            .map_err(|e| SourceError::unavailable(self.spec.name, e))?;

        into_record(self.spec.name, stored)
    }
}
