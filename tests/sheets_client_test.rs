mod support;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use sheetloc::import::ImportService;
use sheetloc::sheets::{SheetSource, SheetsClient, SheetsError};
use sheetloc::ImportSettings;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::support::{setup_database, table_entries, tracing_init};

/// Serve a fixed document the way the gviz CSV export endpoint does
async fn export_tab(
    Path(document_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<String, StatusCode> {
    if document_id != "doc-1" || params.get("tqx").map(String::as_str) != Some("out:csv") {
        return Err(StatusCode::BAD_REQUEST);
    }

    match params.get("sheet").map(String::as_str) {
        Some("TabsToExport") => Ok("\"Tabs\"\n\"Main Menu\"\n\"Missing\"\n".to_string()),
        Some("Main Menu") => Ok(
            "\"Key\",\"English\",\"French\"\n\"play\",\"Play\",\"Jouer\"\n\"options\",\"Options\",\"\"\n"
                .to_string(),
        ),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

/// Start a local export server, returning its base URL
async fn start_export_server() -> String {
    let app = Router::new().route("/spreadsheets/d/:doc/gviz/tq", get(export_tab));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_fetch_tab_with_encoded_name() {
    tracing_init();
    let base_url = start_export_server().await;
    let client = SheetsClient::with_base_url(base_url);

    let csv = client.fetch_tab("doc-1", "Main Menu").await.unwrap();

    assert!(csv.starts_with("\"Key\",\"English\",\"French\""));
    assert!(csv.contains("\"Jouer\""));
}

#[tokio::test]
async fn test_missing_tab_is_status_error() {
    tracing_init();
    let base_url = start_export_server().await;
    let client = SheetsClient::with_base_url(base_url);

    let result = client.fetch_tab("doc-1", "Nope").await;

    match result {
        Err(SheetsError::Status { url, status }) => {
            assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
            assert!(url.ends_with("sheet=Nope"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_is_request_error() {
    tracing_init();
    // Bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = SheetsClient::with_base_url(format!("http://{}", addr));
    let result = client.fetch_tab("doc-1", "TabsToExport").await;

    assert!(matches!(result, Err(SheetsError::Request(_))));
}

#[tokio::test]
async fn test_import_over_http() {
    let (database, _temp_dir) = setup_database().await;
    let base_url = start_export_server().await;
    let source = Arc::new(SheetsClient::with_base_url(base_url));
    let handle = ImportService::start(tokio::runtime::Handle::current(), database.clone(), source);

    let report = handle
        .run_import(ImportSettings::new("doc-1"), None)
        .await
        .unwrap();

    assert_eq!(report.imported_tab_count(), 1);
    assert_eq!(report.skipped_tab_count(), 1);

    let english = table_entries(&database, "GameTextMain Menu", "en")
        .await
        .unwrap();
    assert_eq!(english.len(), 2);

    // Blank French cell is not written
    let french = table_entries(&database, "GameTextMain Menu", "fr")
        .await
        .unwrap();
    assert_eq!(french.len(), 1);
    assert_eq!(french.get("play").map(String::as_str), Some("Jouer"));
}
