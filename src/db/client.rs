use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::db::batch::ImportBatch;
use crate::db::models::*;

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Initialize database connection and create tables
    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        // Use sqlite:// with ?mode=rwc to create if it doesn't exist
        let database_url = format!("sqlite://{}?mode=rwc", database_path);
        info!("Connecting to {}", database_url);
        let pool = SqlitePool::connect(&database_url).await?;

        let db = Database { pool };
        db.create_tables().await?;
        Ok(db)
    }

    /// Create all necessary tables
    async fn create_tables(&self) -> Result<(), sqlx::Error> {
        // One row per (table name, locale) destination
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS string_tables (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                locale TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(name, locale)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS string_entries (
                table_id TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (table_id, key),
                FOREIGN KEY (table_id) REFERENCES string_tables (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Start a write batch; nothing it writes is visible until it commits
    pub async fn begin_import_batch(&self) -> Result<ImportBatch, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(ImportBatch::new(tx))
    }

    /// Get all string tables with their entry counts, ordered by name then locale
    pub async fn get_string_tables(&self) -> Result<Vec<DbStringTableSummary>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                t.id, t.name, t.locale, t.created_at, t.updated_at,
                COUNT(e.key) AS entry_count
            FROM string_tables t
            LEFT JOIN string_entries e ON e.table_id = t.id
            GROUP BY t.id
            ORDER BY t.name, t.locale
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(DbStringTableSummary {
                    table: string_table_from_row(row)?,
                    entry_count: row.get("entry_count"),
                })
            })
            .collect()
    }

    /// Find a string table by name and locale
    pub async fn get_string_table(
        &self,
        name: &str,
        locale: &str,
    ) -> Result<Option<DbStringTable>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, name, locale, created_at, updated_at FROM string_tables WHERE name = ? AND locale = ?",
        )
        .bind(name)
        .bind(locale)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(string_table_from_row).transpose()
    }

    /// Get all entries of a table, ordered by key
    pub async fn get_entries(&self, table_id: &str) -> Result<Vec<DbStringEntry>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT table_id, key, value FROM string_entries WHERE table_id = ? ORDER BY key",
        )
        .bind(table_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| DbStringEntry {
                table_id: row.get("table_id"),
                key: row.get("key"),
                value: row.get("value"),
            })
            .collect())
    }

    /// Look up the text stored for a key in the (name, locale) table
    pub async fn lookup(
        &self,
        name: &str,
        locale: &str,
        key: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT e.value
            FROM string_entries e
            JOIN string_tables t ON t.id = e.table_id
            WHERE t.name = ? AND t.locale = ? AND e.key = ?
            "#,
        )
        .bind(name)
        .bind(locale)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get("value")))
    }
}

fn string_table_from_row(row: &SqliteRow) -> Result<DbStringTable, sqlx::Error> {
    Ok(DbStringTable {
        id: row.get("id"),
        name: row.get("name"),
        locale: row.get("locale"),
        created_at: parse_timestamp(row.get("created_at"))?,
        updated_at: parse_timestamp(row.get("updated_at"))?,
    })
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
