// Sealed draft entry point.
//
// Startup sequence:
// 1. Load config
// 2. Initialize tracing (log to file, not terminal)
// 3. Open database
// 4. Load the card catalog
// 5. Open the session (resumes a saved draft when possible)
// 6. Create mpsc channels
// 7. Spawn the session task
// 8. Run the TUI until the user quits
// 9. Wait for the session to flush pending writes

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use sealed_draft::app::{self, Session};
use sealed_draft::catalog;
use sealed_draft::config;
use sealed_draft::db::Database;
use sealed_draft::tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing
    init_tracing(&config.logging.filter)?;
    info!("Sealed draft starting up");
    info!(
        "Config loaded: catalog={}, database={}",
        config.catalog_path, config.db_path
    );

    // 3. Open database
    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
    }
    let db = Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    // 4. Load the card catalog
    let catalog_path = PathBuf::from(&config.catalog_path);
    let pool = catalog::load_catalog(&catalog_path)
        .with_context(|| format!("failed to load card catalog {}", catalog_path.display()))?;

    // 5. Open the session
    let session = Session::open(pool, Arc::new(db));
    if session.restored {
        info!("Draft state restored from previous session");
    } else {
        info!("Starting fresh draft session");
    }

    // 6. Create mpsc channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    // 7. Spawn the session task
    let app_handle = tokio::spawn(app::run(cmd_rx, ui_tx, session));

    // 8. Run the TUI; returns when the user quits
    if let Err(e) = tui::run(ui_rx, cmd_tx, config.display.log_tail).await {
        error!("TUI error: {:#}", e);
    }

    // 9. Cleanup: the session saves its last state before finishing
    match tokio::time::timeout(std::time::Duration::from_secs(5), app_handle).await {
        Ok(Ok(())) => info!("Sealed draft shut down cleanly"),
        Ok(Err(e)) => error!("Session task failed: {}", e),
        Err(_) => warn!("Session did not finish saving within 5s"),
    }
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("sealed-draft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
