use std::env;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

use sheetloc::config::{parse_concurrency, Config, ConfigError};
use sheetloc::db::Database;
use sheetloc::import::{ImportError, ImportProgress, ImportReport, ImportService, TabOutcome};
use sheetloc::locale;
use sheetloc::sheets::SheetsClient;

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Import(#[from] ImportError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{0}")]
    NotFound(String),
}

enum Command {
    Import { json: bool },
    Tables,
    Get {
        table: String,
        locale: String,
        key: String,
    },
}

#[tokio::main]
async fn main() {
    // Use RUST_LOG env var if set, otherwise default to info level
    let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("sheetloc");

    if args.len() < 2 || matches!(args[1].as_str(), "-h" | "--help" | "help") {
        print_usage(program);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let result = match Config::load() {
        Ok(config) => run(&args[1..], config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        error!("{}", e);
        if matches!(e, CliError::Usage(_)) {
            print_usage(program);
        }
        process::exit(1);
    }
}

async fn run(args: &[String], mut config: Config) -> Result<(), CliError> {
    let command = parse_args(args, &mut config)?;

    if let Some(parent) = config.database_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let database = Database::new(&config.database_path.to_string_lossy()).await?;

    match command {
        Command::Import { json } => import(config, database, json).await,
        Command::Tables => list_tables(&database).await,
        Command::Get { table, locale, key } => get_entry(&database, &table, &locale, &key).await,
    }
}

/// Parse a subcommand plus `--flag value` overrides on top of the loaded config
fn parse_args(args: &[String], config: &mut Config) -> Result<Command, CliError> {
    let mut json = false;
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if flag == "--json" {
            json = true;
            i += 1;
            continue;
        }
        if !flag.starts_with("--") {
            positional.push(args[i].clone());
            i += 1;
            continue;
        }

        let value = args
            .get(i + 1)
            .ok_or_else(|| CliError::Usage(format!("{} requires a value", flag)))?
            .clone();
        match flag {
            "--doc" => config.document_id = value,
            "--index-tab" => config.index_tab = value,
            "--base-name" => config.base_name = value,
            "--db" => config.database_path = PathBuf::from(value),
            "--concurrency" => config.max_concurrent_fetches = parse_concurrency(&value)?,
            _ => return Err(CliError::Usage(format!("Unknown argument: {}", flag))),
        }
        i += 2;
    }

    match (args[0].as_str(), positional.as_slice()) {
        ("import", []) => Ok(Command::Import { json }),
        ("tables", []) => Ok(Command::Tables),
        ("get", [table, locale, key]) => Ok(Command::Get {
            table: table.clone(),
            locale: locale.clone(),
            key: key.clone(),
        }),
        (command, _) => Err(CliError::Usage(format!(
            "Unknown command or wrong arguments: {}",
            command
        ))),
    }
}

async fn import(config: Config, database: Database, json: bool) -> Result<(), CliError> {
    let settings = config.import_settings();
    settings.validate()?;

    let source = Arc::new(SheetsClient::with_base_url(config.export_base_url.clone()));
    let handle = ImportService::start(tokio::runtime::Handle::current(), database, source);

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
    let progress_task = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            if let ImportProgress::StateChanged(state) = progress {
                info!("Import state: {:?}", state);
            }
        }
    });

    let result = handle.run_import(settings, Some(progress_tx)).await;
    // Sender is gone once the run ends, so the listener finishes
    let _ = progress_task.await;
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ImportReport) {
    for tab in &report.tabs {
        match &tab.outcome {
            TabOutcome::Imported {
                tables,
                skipped_columns,
                ..
            } => {
                println!("{}:", tab.tab);
                for table in tables {
                    println!(
                        "  {} [{}] {} entries{}",
                        table.table,
                        table.locale,
                        table.entries,
                        if table.created { " (new)" } else { "" }
                    );
                }
                for column in skipped_columns {
                    println!(
                        "  skipped column {} '{}'",
                        column.column, column.header
                    );
                }
            }
            TabOutcome::Skipped(reason) => println!("{}: skipped, {}", tab.tab, reason),
        }
    }
    println!(
        "{} tab(s) imported, {} skipped",
        report.imported_tab_count(),
        report.skipped_tab_count()
    );
}

async fn list_tables(database: &Database) -> Result<(), CliError> {
    let tables = database.get_string_tables().await?;
    if tables.is_empty() {
        println!("No string tables.");
        return Ok(());
    }

    for summary in tables {
        let table = &summary.table;
        let language = locale::name_for(&table.locale).unwrap_or_else(|| table.locale.clone());
        println!(
            "{}\t{}\t{} entries\tupdated {}",
            table.name,
            language,
            summary.entry_count,
            table.updated_at.to_rfc3339()
        );
    }
    Ok(())
}

async fn get_entry(
    database: &Database,
    table: &str,
    locale_arg: &str,
    key: &str,
) -> Result<(), CliError> {
    // Accept either a locale code or a language name
    let locale_code = locale::locale_for(locale_arg).unwrap_or(locale_arg);

    match database.lookup(table, locale_code, key).await? {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => Err(CliError::NotFound(format!(
            "No entry '{}' in table '{}' for locale '{}'",
            key, table, locale_code
        ))),
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage:");
    eprintln!("  {} import [--json] [options]", program);
    eprintln!("  {} tables [--db PATH]", program);
    eprintln!("  {} get <table> <locale> <key> [--db PATH]", program);
    eprintln!();
    eprintln!("Options (override SHEETLOC_* environment variables):");
    eprintln!("  --doc ID             Spreadsheet document id");
    eprintln!("  --index-tab NAME     Tab listing the tabs to import (default TabsToExport)");
    eprintln!("  --base-name NAME     String table name prefix (default GameText)");
    eprintln!("  --db PATH            SQLite database path (default ~/.sheetloc/strings.db)");
    eprintln!("  --concurrency N      Tabs fetched in parallel (default 1)");
}
