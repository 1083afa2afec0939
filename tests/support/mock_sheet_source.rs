use reqwest::StatusCode;
use sheetloc::sheets::{csv_export_url, SheetSource, SheetsError, DEFAULT_EXPORT_BASE_URL};
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock sheet source for testing
///
/// Serves tabs from memory; tabs can be changed between runs to simulate
/// translators editing the sheet. Missing tabs fail with HTTP 404.
#[derive(Default)]
pub struct MockSheetSource {
    tabs: Mutex<HashMap<String, String>>,
}

impl MockSheetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tab(&self, name: &str, csv: &str) {
        self.tabs
            .lock()
            .unwrap()
            .insert(name.to_string(), csv.to_string());
    }

    pub fn remove_tab(&self, name: &str) {
        self.tabs.lock().unwrap().remove(name);
    }
}

#[async_trait::async_trait]
impl SheetSource for MockSheetSource {
    async fn fetch_tab(&self, document_id: &str, tab_name: &str) -> Result<String, SheetsError> {
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
