use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sheetsync::reconciliation::{run_import, Phase, SyncError};
use sheetsync::status::{FileStatusStore, StatusReporter, StatusSink};
use sheetsync::utils::{DEFAULT_STATUS_FILE, DEFAULT_STATUS_KEY};
use sheetsync::{read_config, CsvSheetStore, LocalFolderStore, SyncConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Sheetsync - keep a sheet in sync with a folder of CSV files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File holding the import status record polled by observers
    #[arg(
        long,
        global = true,
        env = "SHEETSYNC_STATUS_FILE",
        default_value = DEFAULT_STATUS_FILE
    )]
    status_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import new files and drop rows of removed files
    Run {
        /// Path to the JSON sync configuration
        #[arg(short, long, env = "SHEETSYNC_CONFIG")]
        config: PathBuf,

        /// Override the configured source folder
        #[arg(long)]
        folder_root: Option<PathBuf>,

        /// Override the configured target sheet
        #[arg(long)]
        sheet: Option<PathBuf>,

        /// Override the configured path pattern
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Print the current import status
    Status {
        /// Config to take the status key from
        #[arg(short, long, env = "SHEETSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Keep polling until the run reports completion
        #[arg(long)]
        follow: bool,

        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let store = Arc::new(FileStatusStore::new(&args.status_file));

    match args.command {
        Command::Run {
            config,
            folder_root,
            sheet,
            pattern,
        } => {
            let config_path = config;
            let config = match read_config(&config_path).await {
                Ok(config) => config,
                Err(e) => {
                    let reporter = StatusReporter::new(store, DEFAULT_STATUS_KEY);
                    let err = SyncError::new(Phase::Init, e);
                    reporter.report(&err.to_string(), true).await;
                    return Err(err).with_context(|| {
                        format!("Failed to load config {}", config_path.display())
                    });
                }
            };
            let config = apply_overrides(config, folder_root, sheet, pattern);
            run(config, store).await
        }
        Command::Status {
            config,
            follow,
            interval_ms,
        } => {
            let key = match config {
                Some(path) => read_config(&path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?
                    .status_key,
                None => DEFAULT_STATUS_KEY.to_string(),
            };
            let reporter = StatusReporter::new(store, key);
            show_status(&reporter, follow, Duration::from_millis(interval_ms)).await
        }
    }
}

fn apply_overrides(
    mut config: SyncConfig,
    folder_root: Option<PathBuf>,
    sheet: Option<PathBuf>,
    pattern: Option<String>,
) -> SyncConfig {
    if let Some(folder_root) = folder_root {
        config.folder_root = folder_root;
    }
    if let Some(sheet) = sheet {
        config.sheet = sheet;
    }
    if let Some(pattern) = pattern {
        config.path_pattern = pattern;
    }
    config
}

async fn run(config: SyncConfig, store: Arc<FileStatusStore>) -> Result<()> {
    let reporter = StatusReporter::new(store, config.status_key.clone());

    let sheet = match CsvSheetStore::open(&config.sheet).await {
        Ok(sheet) => sheet,
        Err(e) => {
            let err = SyncError::new(Phase::Init, e);
            reporter.report(&err.to_string(), true).await;
            return Err(err.into());
        }
    };

    info!(
        folder = %config.folder_root.display(),
        sheet = %config.sheet.display(),
        "Starting import"
    );

    let result = run_import(config, &LocalFolderStore::new(), &sheet, &reporter).await?;
    println!("{}", result.summary());
    Ok(())
}

async fn show_status(reporter: &StatusReporter, follow: bool, interval: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    let mut last_message: Option<String> = None;

    loop {
        ticker.tick().await;
        let status = reporter.read().await?;

        match &status {
            Some(s) if last_message.as_deref() != Some(s.message.as_str()) => {
                println!("{}", s.message);
                last_message = Some(s.message.clone());
            }
            None if !follow => println!("No status."),
            _ => {}
        }

        let done = status.as_ref().is_some_and(|s| s.done);
        if !follow || done {
            return Ok(());
        }
    }
}
