use chrono::Utc;
use sqlx::{Row, Sqlite, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::sink::{SinkError, StringTableHandle, StringTableSink};

/// All writes of one import run, held in a single SQLite transaction
///
/// Dropping the batch without `commit_all` rolls everything back, which leaves
/// tables committed by earlier runs untouched.
pub struct ImportBatch {
    tx: Option<Transaction<'static, Sqlite>>,
}

impl ImportBatch {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        ImportBatch { tx: Some(tx) }
    }

    fn tx(&mut self) -> Result<&mut Transaction<'static, Sqlite>, SinkError> {
        self.tx.as_mut().ok_or(SinkError::Committed)
    }
}

#[async_trait::async_trait]
impl StringTableSink for ImportBatch {
    async fn get_or_create_table(
        &mut self,
        name: &str,
        locale: &str,
    ) -> Result<StringTableHandle, SinkError> {
        let tx = self.tx()?;
        let now = Utc::now().to_rfc3339();

        let existing = sqlx::query("SELECT id FROM string_tables WHERE name = ? AND locale = ?")
            .bind(name)
            .bind(locale)
            .fetch_optional(&mut **tx)
            .await?;

        if let Some(row) = existing {
            let id: String = row.get("id");
            sqlx::query("UPDATE string_tables SET updated_at = ? WHERE id = ?")
                .bind(&now)
                .bind(&id)
                .execute(&mut **tx)
                .await?;

            return Ok(StringTableHandle {
                id,
                name: name.to_string(),
                locale: locale.to_string(),
                created: false,
            });
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO string_tables (id, name, locale, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(locale)
        .bind(&now)
        .bind(&now)
        .execute(&mut **tx)
        .await?;

        debug!("Inserted string table {} ({}, {})", id, name, locale);

        Ok(StringTableHandle {
            id,
            name: name.to_string(),
            locale: locale.to_string(),
            created: true,
        })
    }

    async fn clear(&mut self, table: &StringTableHandle) -> Result<(), SinkError> {
        let tx = self.tx()?;
        sqlx::query("DELETE FROM string_entries WHERE table_id = ?")
            .bind(&table.id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn upsert(
        &mut self,
        table: &StringTableHandle,
        key: &str,
        value: &str,
    ) -> Result<(), SinkError> {
        let tx = self.tx()?;
        sqlx::query(
            r#"
            INSERT INTO string_entries (table_id, key, value) VALUES (?, ?, ?)
            ON CONFLICT (table_id, key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(&table.id)
        .bind(key)
        .bind(value)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn count(&mut self, table: &StringTableHandle) -> Result<usize, SinkError> {
        let tx = self.tx()?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM string_entries WHERE table_id = ?")
            .bind(&table.id)
            .fetch_one(&mut **tx)
            .await?;
        Ok(count as usize)
    }

    async fn commit_all(&mut self) -> Result<(), SinkError> {
        let tx = self.tx.take().ok_or(SinkError::Committed)?;
        tx.commit().await?;
        Ok(())
    }
}
