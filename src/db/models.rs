use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Database models for the string table store
///
/// A string table holds the localized text for one (name, locale) pair:
/// - `name` is the configured base name followed by the sheet tab name
/// - `locale` is the locale code resolved from the column header
/// - entries are unique by key within a table
///
/// Tables are created on first import and cleared + repopulated on every
/// later import; they are never deleted by the importer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbStringTable {
    pub id: String,
    pub name: String,
    pub locale: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A string table together with its current entry count (for listings)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbStringTableSummary {
    pub table: DbStringTable,
    pub entry_count: i64,
}

/// One key/value pair in a string table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DbStringEntry {
    pub table_id: String,
    pub key: String,
    pub value: String,
}
