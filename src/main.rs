//! Macrolog - a keyboard-driven terminal client for a nutrition-tracking
//! REST API.
//!
//! This binary wires the pieces from the library crate together: it builds
//! the API client around the on-disk token store, hands the client's
//! unauthenticated signal to the event loop, and drives the TUI.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use macrolog::api::ApiClient;
use macrolog::app::{App, AppState};
use macrolog::auth::DiskTokenStore;
use macrolog::config::Config;
use macrolog::models::{DailySummary, FoodEntry};
use macrolog::ui::input::handle_input;
use macrolog::ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name in the data directory
const LOG_FILE: &str = "macrolog.log";

/// Initialize tracing into a file in the data directory.
///
/// Logging to stderr would corrupt the alternate screen, so everything goes
/// through a non-blocking file appender. The returned guard must stay alive
/// for the duration of the program or buffered lines are lost.
fn init_tracing(data_dir: &std::path::Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(data_dir)?;
    let appender = tracing_appender::rolling::never(data_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

/// Build the API client around the on-disk token store.
///
/// `auth_expired` is set whenever a 401 cannot be recovered by a token
/// refresh; the event loop converts it into the login overlay.
fn build_client(config: &Config, auth_expired: Arc<AtomicBool>) -> Result<ApiClient> {
    let store = Arc::new(DiskTokenStore::new(Config::data_dir()?));
    let flag = Arc::clone(&auth_expired);
    ApiClient::new(config.base_url(), store, move || {
        flag.store(true, Ordering::SeqCst);
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "--export" => return export().await,
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Usage: macrolog [--export]");
                std::process::exit(2);
            }
        }
    }

    let config = Config::load().unwrap_or_default();
    let _log_guard = init_tracing(&Config::data_dir()?)?;
    info!("macrolog starting");

    let auth_expired = Arc::new(AtomicBool::new(false));
    let api = build_client(&config, Arc::clone(&auth_expired))?;
    let mut app = App::new(config, api, auth_expired);

    if app.is_authenticated() {
        app.refresh_all_background();
    } else {
        app.start_login();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("macrolog shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Convert an unrecoverable 401 into the login overlay
        app.check_auth_expired();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

/// Dump all entries and daily summaries to stdout as JSON.
///
/// Uses the saved session when one exists; otherwise prompts for credentials
/// on the terminal. All diagnostics go to stderr so stdout stays pipeable.
async fn export() -> Result<()> {
    let config = Config::load().unwrap_or_default();
    let auth_expired = Arc::new(AtomicBool::new(false));
    let api = build_client(&config, Arc::clone(&auth_expired))?;

    if !api.has_session() {
        eprintln!("No saved session; please log in.");

        print!("Username: ");
        io::stdout().flush()?;
        let mut username = String::new();
        io::stdin().read_line(&mut username)?;
        let username = username.trim();

        let password = rpassword::prompt_password("Password: ")?;

        api.login(username, &password)
            .await
            .context("Login failed")?;
    }

    eprintln!("Fetching entries...");
    let entries = api.all_entries().await.context("Failed to fetch entries")?;

    eprintln!("Fetching daily summaries...");
    let summaries = api
        .daily_summaries()
        .await
        .context("Failed to fetch daily summaries")?;

    if auth_expired.load(Ordering::SeqCst) {
        anyhow::bail!("Session expired; run the app and log in again");
    }

    #[derive(Serialize)]
    struct Export {
        entries: Vec<FoodEntry>,
        daily_summaries: Vec<DailySummary>,
    }

    let export = Export {
        entries,
        daily_summaries: summaries,
    };

    println!("{}", serde_json::to_string_pretty(&export)?);
    eprintln!(
        "Done! {} entries across {} days exported.",
        export.entries.len(),
        export.daily_summaries.len()
    );
    Ok(())
}
