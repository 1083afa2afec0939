use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

/// Host serving the CSV export endpoint
pub const DEFAULT_EXPORT_BASE_URL: &str = "https://docs.google.com";

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// Trait for fetching one sheet tab as CSV text (allows mocking for tests)
///
/// Implementations make exactly one attempt per call.
#[async_trait::async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_tab(&self, document_id: &str, tab_name: &str) -> Result<String, SheetsError>;
}

/// Build the CSV export URL for a single tab.
///
/// The tab name is percent-encoded; the document id is inserted as-is.
pub fn csv_export_url(base_url: &str, document_id: &str, tab_name: &str) -> String {
    format!(
        "{}/spreadsheets/d/{}/gviz/tq?tqx=out:csv&sheet={}",
        base_url.trim_end_matches('/'),
        document_id,
        urlencoding::encode(tab_name)
    )
}

/// Production source backed by the public spreadsheet CSV export
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    base_url: String,
}

impl SheetsClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_EXPORT_BASE_URL)
    }

    /// Point the client at a different export host (mirrors, local test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for SheetsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SheetSource for SheetsClient {
    async fn fetch_tab(&self, document_id: &str, tab_name: &str) -> Result<String, SheetsError> {
        let url = csv_export_url(&self.base_url, document_id, tab_name);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(
                "User-Agent",
                concat!("sheetloc/", env!("CARGO_PKG_VERSION")),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("✗ Export request for tab '{}' failed: {}", tab_name, status);
            return Err(SheetsError::Status { url, status });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_export_url_template() {
        assert_eq!(
            csv_export_url("https://docs.google.com", "abc123", "Menus"),
            "https://docs.google.com/spreadsheets/d/abc123/gviz/tq?tqx=out:csv&sheet=Menus"
        );
    }

    #[test]
    fn test_csv_export_url_encodes_tab_name() {
        let url = csv_export_url("https://docs.google.com/", "doc", "Main Menu&Co");
        assert!(url.ends_with("&sheet=Main%20Menu%26Co"), "got {}", url);
        assert!(url.starts_with("https://docs.google.com/spreadsheets/d/doc/"));
    }
}
