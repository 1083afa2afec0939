// # Sheets
//
// Remote tab retrieval and CSV parsing:
//
// - **SheetSource**: one request per tab, CSV text or a transport error
// - **parse_csv**: structural CSV parsing, no header or type inference

mod client;
mod csv;

pub use client::{csv_export_url, SheetSource, SheetsClient, SheetsError, DEFAULT_EXPORT_BASE_URL};
pub use csv::{parse_csv, Row};
