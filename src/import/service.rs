// # Importer - Orchestrator
//
// Drives one import run through its states:
//
//   Idle → FetchingIndex → ParsingIndex → ImportingTabs → Finalizing → Idle
//                       ↘ Failed
//
// Only the index download (and the store itself) can fail a run. A tab that
// cannot be downloaded or is malformed, an unknown language column, or a bad
// row is logged and skipped without touching sibling work.

use crate::config::ImportSettings;
use crate::import::types::{
    ImportError, ImportProgress, ImportReport, ImportState, SkipReason, SkippedColumn,
    TabOutcome, TabReport, TableSummary,
};
use crate::locale;
use crate::sheets::{parse_csv, Row, SheetSource, SheetsError};
use crate::sink::{SinkError, StringTableSink};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Runs imports for one set of settings against a sheet source
pub struct Importer<'a> {
    source: &'a dyn SheetSource,
    settings: ImportSettings,
    progress_tx: Option<mpsc::UnboundedSender<ImportProgress>>,
    state: ImportState,
}

impl<'a> Importer<'a> {
    pub fn new(source: &'a dyn SheetSource, settings: ImportSettings) -> Self {
        Self {
            source,
            settings,
            progress_tx: None,
            state: ImportState::Idle,
        }
    }

    /// Send progress events to `progress_tx` while running
    pub fn with_progress(mut self, progress_tx: mpsc::UnboundedSender<ImportProgress>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    pub fn state(&self) -> &ImportState {
        &self.state
    }

    /// Run a full import into `sink`.
    ///
    /// Invalid settings are rejected before leaving `Idle`. On success every
    /// change is committed through `sink.commit_all()` and the state returns to
    /// `Idle`; on a fatal error the state is `Failed` and nothing is committed.
    pub async fn run(
        &mut self,
        sink: &mut dyn StringTableSink,
    ) -> Result<ImportReport, ImportError> {
        self.settings.validate()?;

        match self.run_stages(sink).await {
            Ok(report) => Ok(report),
            Err(e) => {
                error!("Localization import failed: {}", e);
                self.transition(ImportState::Failed);
                Err(e)
            }
        }
    }

    async fn run_stages(
        &mut self,
        sink: &mut dyn StringTableSink,
    ) -> Result<ImportReport, ImportError> {
        info!(
            "Starting localization import from document {}",
            self.settings.document_id
        );

        // 1. Download the index tab listing the tabs to import
        self.transition(ImportState::FetchingIndex);
        let index_tab = self.settings.index_tab.clone();
        let index_text = self
            .source
            .fetch_tab(&self.settings.document_id, &index_tab)
            .await
            .map_err(|source| ImportError::IndexFetch {
                tab: index_tab.clone(),
                source,
            })?;

        // 2. Collect tab names from its first column
        self.transition(ImportState::ParsingIndex);
        let tabs = tab_names_from_index(&parse_csv(&index_text));
        if tabs.is_empty() {
            warn!(
                "Index sheet '{}' is empty or could not be read. No tabs will be imported.",
                index_tab
            );
        } else {
            info!("Found {} tabs to import: {}", tabs.len(), tabs.join(", "));
        }

        // 3. Fetch tabs (bounded concurrency, index order preserved) and import
        //    each one as its download resolves
        let total = tabs.len();
        let source = self.source;
        let document_id = self.settings.document_id.clone();
        let document_id = document_id.as_str();
        let mut fetches = stream::iter(tabs)
            .map(|tab| async move {
                let fetched = source.fetch_tab(document_id, &tab).await;
                (tab, fetched)
            })
            .buffered(self.settings.max_concurrent_fetches.max(1));

        let mut report = ImportReport::default();
        let mut current = 0;
        while let Some((tab, fetched)) = fetches.next().await {
            current += 1;
            self.transition(ImportState::ImportingTabs { current, total });
            let tab_report = self
                .import_tab(sink, &tab, fetched)
                .await?;
            report.tabs.push(tab_report);
        }

        // 4. Commit everything as one batch
        self.transition(ImportState::Finalizing);
        info!(
            "Localization import process finished ({} imported, {} skipped). Saving tables...",
            report.imported_tab_count(),
            report.skipped_tab_count()
        );
        sink.commit_all().await?;
        info!("Saved {} string tables.", report.tables().count());

        self.transition(ImportState::Idle);
        Ok(report)
    }

    /// Import one tab's columns into per-locale tables.
    ///
    /// Every column replaces the content of its table, so when two columns
    /// resolve to one locale the later column is all that remains.
    async fn import_tab(
        &self,
        sink: &mut dyn StringTableSink,
        tab: &str,
        fetched: Result<String, SheetsError>,
    ) -> Result<TabReport, SinkError> {
        info!("--- Importing tab: {} ---", tab);

        let text = match fetched {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to download tab '{}': {}", tab, e);
                return Ok(self.skip_tab(
                    tab,
                    SkipReason::FetchFailed {
                        error: e.to_string(),
                    },
                ));
            }
        };

        let rows = parse_csv(&text);
        if rows.len() < 2 {
            warn!(
                "Tab '{}' is empty or contains no data rows. Skipping.",
                tab
            );
            return Ok(self.skip_tab(tab, SkipReason::NoDataRows { rows: rows.len() }));
        }

        let header = &rows[0];
        if header.len() < 2 {
            warn!(
                "Tab '{}' header is malformed (needs at least a Key and one Language column). Skipping.",
                tab
            );
            return Ok(self.skip_tab(
                tab,
                SkipReason::MalformedHeader {
                    columns: header.len(),
                },
            ));
        }

        let table_name = format!("{}{}", self.settings.base_name, tab);
        let mut tables = Vec::new();
        let mut skipped_columns = Vec::new();
        let mut skipped_cells = 0;
        let mut seen_locales = HashSet::new();

        for (column, label) in header.iter().enumerate().skip(1) {
            let locale_code = if label.trim().is_empty() {
                warn!(
                    "Tab '{}' column {} has a blank header. Skipping this column.",
                    tab, column
                );
                None
            } else {
                let resolved = locale::locale_for(label);
                if resolved.is_none() {
                    warn!(
                        "Could not find a locale code for language '{}' in tab '{}' (column {}). Skipping this column.",
                        label, tab, column
                    );
                }
                resolved
            };

            let Some(locale_code) = locale_code else {
                let skipped = SkippedColumn {
                    column,
                    header: label.clone(),
                };
                self.emit(ImportProgress::ColumnSkipped {
                    tab: tab.to_string(),
                    column: skipped.clone(),
                });
                skipped_columns.push(skipped);
                continue;
            };

            let table = sink.get_or_create_table(&table_name, locale_code).await?;
            if !seen_locales.insert(locale_code) {
                warn!(
                    "Tab '{}' column {} ('{}') maps to locale '{}' again; it replaces the earlier column",
                    tab, column, label, locale_code
                );
            }
            if table.created {
                info!(
                    "Creating new string table '{}' for locale '{}'",
                    table_name, locale_code
                );
            } else {
                info!(
                    "Clearing existing entries for table '{}' for locale '{}'",
                    table_name, locale_code
                );
                sink.clear(&table).await?;
            }

            for (row_index, row) in rows.iter().enumerate().skip(1) {
                match cell_for(row, column) {
                    Ok((key, value)) => sink.upsert(&table, key, value).await?,
                    Err(reason) => {
                        debug!(
                            "Tab '{}' row {} column {}: {}. Skipping.",
                            tab, row_index, column, reason
                        );
                        skipped_cells += 1;
                    }
                }
            }

            let entries = sink.count(&table).await?;
            let locale_name = locale::name_for(locale_code).unwrap_or_else(|| locale_code.to_string());
            info!(
                "Successfully imported {} entries into '{}' for locale {}.",
                entries, table_name, locale_name
            );

            let summary = TableSummary {
                table: table_name.clone(),
                locale: locale_code.to_string(),
                entries,
                created: table.created,
            };
            self.emit(ImportProgress::TableImported(summary.clone()));
            tables.push(summary);
        }

        if skipped_cells > 0 {
            warn!(
                "Tab '{}': {} cell(s) skipped (short rows, blank keys or blank values)",
                tab, skipped_cells
            );
        }

        Ok(TabReport {
            tab: tab.to_string(),
            outcome: TabOutcome::Imported {
                tables,
                skipped_columns,
                skipped_cells,
            },
        })
    }

    fn skip_tab(&self, tab: &str, reason: SkipReason) -> TabReport {
        self.emit(ImportProgress::TabSkipped {
            tab: tab.to_string(),
            reason: reason.clone(),
        });
        TabReport {
            tab: tab.to_string(),
            outcome: TabOutcome::Skipped(reason),
        }
    }

    fn transition(&mut self, next: ImportState) {
        debug!("Import state: {:?} -> {:?}", self.state, next);
        self.state = next.clone();
        self.emit(ImportProgress::StateChanged(next));
    }

    fn emit(&self, progress: ImportProgress) {
        if let Some(tx) = &self.progress_tx {
            // Receiver dropped means nobody is listening; the run continues
            let _ = tx.send(progress);
        }
    }
}

/// Tab names listed in the index: first column of every row after the header,
/// trimmed, blanks dropped, repeats imported once.
fn tab_names_from_index(rows: &[Row]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tabs = Vec::new();

    for row in rows.iter().skip(1) {
        let Some(name) = row.first().map(|field| field.trim()) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        if !seen.insert(name.to_string()) {
            warn!("Tab '{}' is listed more than once in the index; importing it once", name);
            continue;
        }
        tabs.push(name.to_string());
    }

    tabs
}

/// Key and value of `row` for a language column, or why the cell is skipped
fn cell_for(row: &Row, column: usize) -> Result<(&str, &str), &'static str> {
    if row.len() <= column {
        return Err("row has no value for this column");
    }
    let key = row[0].trim();
    if key.is_empty() {
        return Err("blank key");
    }
    let value = row[column].trim();
    if value.is_empty() {
        return Err("blank value");
    }
    Ok((key, value))
}
