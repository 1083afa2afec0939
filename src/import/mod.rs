// # Import Module
//
// Pulls localized text from a spreadsheet into per-locale string tables:
//
// - **Importer**: State machine for one run (index → tabs → commit)
// - **ImportService**: Worker that runs queued imports one at a time
// - **ImportHandle**: Queue a run and await its report
//
// Public API:
// - `ImportService` / `ImportHandle`: Start the worker and request runs
// - `Importer`: Run an import directly against any `StringTableSink`
// - `ImportProgress`: Real-time progress updates
// - `ImportReport`: Per-tab outcome of a finished run

mod handle;
mod service;
mod types;

pub use handle::{ImportHandle, ImportService};
pub use service::Importer;
pub use types::{
    ImportError, ImportProgress, ImportReport, ImportState, SkipReason, SkippedColumn,
    TabOutcome, TabReport, TableSummary,
};
