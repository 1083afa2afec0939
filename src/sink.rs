use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Import batch was already committed")]
    Committed,
}

/// Handle to one destination table, identified by (name, locale)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTableHandle {
    pub id: String,
    pub name: String,
    pub locale: String,
    /// True when the table did not exist before this call
    pub created: bool,
}

/// Destination for imported string tables (allows mocking for tests)
///
/// Writes made through a sink become visible to readers only after
/// `commit_all`. Dropping a sink without committing discards its writes.
#[async_trait::async_trait]
pub trait StringTableSink: Send {
    /// Find the table for (name, locale), creating it if missing
    async fn get_or_create_table(
        &mut self,
        name: &str,
        locale: &str,
    ) -> Result<StringTableHandle, SinkError>;

    /// Remove every entry from the table
    async fn clear(&mut self, table: &StringTableHandle) -> Result<(), SinkError>;

    /// Insert the entry, overwriting any existing value for the key
    async fn upsert(
        &mut self,
        table: &StringTableHandle,
        key: &str,
        value: &str,
    ) -> Result<(), SinkError>;

    /// Number of entries currently in the table
    async fn count(&mut self, table: &StringTableHandle) -> Result<usize, SinkError>;

    /// Persist every change made through this sink as one batch
    async fn commit_all(&mut self) -> Result<(), SinkError>;
}
