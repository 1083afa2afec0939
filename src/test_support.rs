// Test support utilities for unit tests

use crate::sheets::{csv_export_url, SheetSource, SheetsError, DEFAULT_EXPORT_BASE_URL};
use crate::sink::{SinkError, StringTableHandle, StringTableSink};
use reqwest::StatusCode;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Mock sheet source serving CSV text from memory
///
/// Unknown tabs fail with HTTP 404, like a missing export.
#[derive(Default)]
pub struct StaticSheetSource {
    tabs: Mutex<HashMap<String, String>>,
    requested: Mutex<Vec<String>>,
}

impl StaticSheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab(self, name: &str, csv: &str) -> Self {
        self.tabs
            .lock()
            .unwrap()
            .insert(name.to_string(), csv.to_string());
        self
    }

    /// Tab names fetched so far, in request order
    pub fn requested_tabs(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SheetSource for StaticSheetSource {
    async fn fetch_tab(&self, document_id: &str, tab_name: &str) -> Result<String, SheetsError> {
        self.requested.lock().unwrap().push(tab_name.to_string());
        self.tabs
            .lock()
            .unwrap()
            .get(tab_name)
            .cloned()
            .ok_or_else(|| SheetsError::Status {
                url: csv_export_url(DEFAULT_EXPORT_BASE_URL, document_id, tab_name),
                status: StatusCode::NOT_FOUND,
            })
    }
}

struct MemoryTable {
    id: String,
    entries: BTreeMap<String, String>,
}

/// In-memory string table sink
///
/// Writes apply immediately; `commits` and `writes` let tests check what a
/// run did to the store.
#[derive(Default)]
pub struct MemorySink {
    tables: BTreeMap<(String, String), MemoryTable>,
    pub commits: usize,
    pub writes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a table as if an earlier run had committed it
    pub fn seed(&mut self, name: &str, locale: &str, entries: &[(&str, &str)]) {
        let id = format!("{}:{}", name, locale);
        self.tables.insert(
            (name.to_string(), locale.to_string()),
            MemoryTable {
                id,
                entries: entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            },
        );
    }

    pub fn entries(&self, name: &str, locale: &str) -> Option<BTreeMap<String, String>> {
        self.tables
            .get(&(name.to_string(), locale.to_string()))
            .map(|table| table.entries.clone())
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn table_mut(&mut self, handle: &StringTableHandle) -> &mut MemoryTable {
        self.tables
            .get_mut(&(handle.name.clone(), handle.locale.clone()))
            .expect("handle refers to a table created by this sink")
    }
}

#[async_trait::async_trait]
impl StringTableSink for MemorySink {
    async fn get_or_create_table(
        &mut self,
        name: &str,
        locale: &str,
    ) -> Result<StringTableHandle, SinkError> {
        self.writes += 1;
        let key = (name.to_string(), locale.to_string());
        let created = !self.tables.contains_key(&key);
        let table = self.tables.entry(key).or_insert_with(|| MemoryTable {
            id: format!("{}:{}", name, locale),
            entries: BTreeMap::new(),
        });

        Ok(StringTableHandle {
            id: table.id.clone(),
            name: name.to_string(),
            locale: locale.to_string(),
            created,
        })
    }

    async fn clear(&mut self, table: &StringTableHandle) -> Result<(), SinkError> {
        self.writes += 1;
        self.table_mut(table).entries.clear();
        Ok(())
    }

    async fn upsert(
        &mut self,
        table: &StringTableHandle,
        key: &str,
        value: &str,
    ) -> Result<(), SinkError> {
        self.writes += 1;
        self.table_mut(table)
            .entries
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn count(&mut self, table: &StringTableHandle) -> Result<usize, SinkError> {
        Ok(self.table_mut(table).entries.len())
    }

    async fn commit_all(&mut self) -> Result<(), SinkError> {
        self.commits += 1;
        Ok(())
    }
}
