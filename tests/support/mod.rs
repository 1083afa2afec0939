pub mod mock_sheet_source;

pub use mock_sheet_source::MockSheetSource;

use sheetloc::db::Database;
use std::collections::BTreeMap;
use tempfile::TempDir;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Fresh database in a temp directory; keep the TempDir alive for the test
pub async fn setup_database() -> (Database, TempDir) {
    tracing_init();

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("strings.db");
    let database = Database::new(db_path.to_str().unwrap())
        .await
        .expect("Failed to create database");

    (database, temp_dir)
}

/// Committed entries of a (name, locale) table, or None if it does not exist
pub async fn table_entries(
    database: &Database,
    name: &str,
    locale: &str,
) -> Option<BTreeMap<String, String>> {
    let table = database.get_string_table(name, locale).await.unwrap()?;
    let entries = database.get_entries(&table.id).await.unwrap();
    Some(entries.into_iter().map(|e| (e.key, e.value)).collect())
}
