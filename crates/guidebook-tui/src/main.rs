//! Guidebook - a terminal viewer for apartment guides.
//!
//! This application renders a JSON-driven apartment guide (emergency info,
//! where to find things, Wi-Fi, house rules, checkout) and keeps it usable
//! when the network is slow or gone by routing requests through the
//! offline cache controller.

mod app;
mod clipboard;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use guidebook_core::cache::CacheManager;
use guidebook_core::manifest::WebManifest;
use guidebook_core::offline::ResourceClass;
use guidebook_core::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name inside the data directory
const LOG_FILE: &str = "guidebook.log";

const USAGE: &str = "\
Usage: guidebook [--base-url URL] [--offline] [SLUG[#VIEW]]
       guidebook --manifest
       guidebook --cache-info

Views: emergency, find, wifi, rules, checkout";

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Run,
    Manifest,
    CacheInfo,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    command: Command,
    base_url: Option<String>,
    offline: bool,
    target: Option<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs {
        command: Command::Run,
        base_url: None,
        offline: false,
        target: None,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--manifest" => parsed.command = Command::Manifest,
            "--cache-info" => parsed.command = Command::CacheInfo,
            "-h" | "--help" => parsed.command = Command::Help,
            "--offline" => parsed.offline = true,
            "--base-url" => match iter.next() {
                Some(url) => parsed.base_url = Some(url.clone()),
                None => bail!("--base-url needs a value"),
            },
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            target => {
                if parsed.target.is_some() {
                    bail!("Only one guide can be opened at a time");
                }
                parsed.target = Some(target.to_string());
            }
        }
    }
    Ok(parsed)
}

// ============================================================================
// Logging
// ============================================================================

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a file in the data
/// directory. Falls back to stderr when that directory is unavailable.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = Config::data_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

// ============================================================================
// Entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let _log_guard = init_tracing();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    }
    .with_env();
    if let Some(url) = &cli.base_url {
        config.base_url = url.clone();
    }
    if cli.offline {
        config.offline_mode = true;
    }

    match cli.command {
        Command::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Command::Manifest => {
            println!("{}", WebManifest::standard().to_json_pretty()?);
            return Ok(());
        }
        Command::CacheInfo => return print_cache_info(&config),
        Command::Run => {}
    }

    info!(base_url = %config.base_url, offline = config.offline_mode, "Guidebook starting");

    let target = cli.target.clone().or_else(|| config.last_slug.clone());
    let mut app = App::new(config)?;
    match target {
        Some(target) => app.open(&target),
        None => app.start_slug_prompt(),
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
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    app.shutdown().await;
    info!("Guidebook shutting down");
    Ok(())
}

/// Print per-resource-class cache usage for the configured origin.
fn print_cache_info(config: &Config) -> Result<()> {
    let cache_dir = config.cache_dir()?;
    let cache = CacheManager::new(cache_dir.clone())?;

    println!("Cache: {}", cache_dir.display());
    for class in ResourceClass::ALL {
        let stats = cache.stats(class.cache_name())?;
        println!(
            "  {:<16} {:>4} entries {:>10} bytes   newest: {}",
            stats.bucket,
            stats.entries,
            stats.bytes,
            stats.newest_display()
        );
    }
    Ok(())
}

async fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        let cli = parse_args(&[]).unwrap();
        assert_eq!(cli.command, Command::Run);
        assert!(cli.target.is_none());
        assert!(!cli.offline);
    }

    #[test]
    fn test_parse_args_full() {
        let cli = parse_args(&args(&["--base-url", "https://guide.example", "--offline", "harbor#wifi"])).unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("https://guide.example"));
        assert!(cli.offline);
        assert_eq!(cli.target.as_deref(), Some("harbor#wifi"));
    }

    #[test]
    fn test_parse_args_commands() {
        assert_eq!(parse_args(&args(&["--manifest"])).unwrap().command, Command::Manifest);
        assert_eq!(parse_args(&args(&["--cache-info"])).unwrap().command, Command::CacheInfo);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&["--base-url"])).is_err());
        assert!(parse_args(&args(&["--bogus"])).is_err());
        assert!(parse_args(&args(&["a", "b"])).is_err());
    }
}
