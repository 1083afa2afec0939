use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::sheets::SheetsError;
use crate::sink::SinkError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to download index sheet '{tab}': {source}")]
    IndexFetch {
        tab: String,
        #[source]
        source: SheetsError,
    },
    #[error("Storage error: {0}")]
    Sink(#[from] SinkError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Import service is not running")]
    ServiceStopped,
}

/// Where an import run currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ImportState {
    Idle,
    FetchingIndex,
    ParsingIndex,
    /// `current` is the 1-based position of the tab being imported
    ImportingTabs { current: usize, total: usize },
    Finalizing,
    Failed,
}

/// Progress updates during import
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportProgress {
    StateChanged(ImportState),
    TabSkipped {
        tab: String,
        reason: SkipReason,
    },
    ColumnSkipped {
        tab: String,
        column: SkippedColumn,
    },
    TableImported(TableSummary),
}

/// Why a whole data tab was left out of the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    FetchFailed { error: String },
    /// Fewer than a header row plus one data row
    NoDataRows { rows: usize },
    /// Header lacks a key column plus at least one language column
    MalformedHeader { columns: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FetchFailed { error } => write!(f, "download failed: {}", error),
            SkipReason::NoDataRows { rows } => {
                write!(f, "no data rows ({} row(s) including header)", rows)
            }
            SkipReason::MalformedHeader { columns } => write!(
                f,
                "header has {} column(s), needs a key and at least one language",
                columns
            ),
        }
    }
}

/// A header column that produced no destination table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedColumn {
    /// 0-based column index in the tab
    pub column: usize,
    pub header: String,
}

/// One destination table written by the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub locale: String,
    pub entries: usize,
    /// False when an existing table was cleared and repopulated
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TabOutcome {
    Imported {
        tables: Vec<TableSummary>,
        skipped_columns: Vec<SkippedColumn>,
        /// (row, column) cells not written: short row, blank key or blank value
        skipped_cells: usize,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabReport {
    pub tab: String,
    #[serde(flatten)]
    pub outcome: TabOutcome,
}

/// Result of a completed run, one entry per index tab in index order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub tabs: Vec<TabReport>,
}

impl ImportReport {
    /// Every table written by the run
    pub fn tables(&self) -> impl Iterator<Item = &TableSummary> {
        self.tabs.iter().flat_map(|tab| {
            let tables: &[TableSummary] = match &tab.outcome {
                TabOutcome::Imported { tables, .. } => tables,
                TabOutcome::Skipped(_) => &[],
            };
            tables
        })
    }

    pub fn imported_tab_count(&self) -> usize {
        self.tabs
            .iter()
            .filter(|tab| matches!(tab.outcome, TabOutcome::Imported { .. }))
            .count()
    }

    pub fn skipped_tab_count(&self) -> usize {
        self.tabs.len() - self.imported_tab_count()
    }
}
