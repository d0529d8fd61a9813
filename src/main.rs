use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use watchdog_tui::config::ConfigOverrides;
use watchdog_tui::data::duration::parse_duration;
use watchdog_tui::data::export::write_export;
use watchdog_tui::{
    events, normalize, ui, Action, App, DashboardConfig, DashboardState, FileSource, HttpSource,
    RefreshScheduler, SampleSource,
};

#[derive(Parser, Debug)]
#[command(name = "watchdog")]
#[command(about = "Terminal dashboard for an internet connection watchdog")]
struct Args {
    /// Base URL of the watchdog backend (overrides WATCHDOG_API_URL)
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Replay a saved JSON array of samples instead of polling the backend
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Refresh interval (e.g., "10s", "500ms", "1m")
    #[arg(short, long)]
    refresh: Option<String>,

    /// Timeout for a single fetch (e.g., "5s"); capped at the refresh interval
    #[arg(short, long)]
    timeout: Option<String>,

    /// Events shown per page in the event log
    #[arg(long)]
    page_size: Option<usize>,

    /// Write logs to this file (the TUI owns the terminal)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fetch once, export the dashboard state to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let config = resolve_config(&args)?;
    tracing::debug!("Resolved configuration: {:?}", config);

    // Build a tokio runtime for the refresh loop and HTTP client
    let rt = tokio::runtime::Runtime::new()?;
    let guard = rt.enter();

    let source = build_source(&args, &config)?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return rt.block_on(export_to_file(source, export_path, &config));
    }

    let handle =
        RefreshScheduler::new(source, config.refresh_interval, config.fetch_timeout).start();
    let app = App::new(handle, config.page_size);

    let result = run_tui(app);
    drop(guard);

    // The refresh loop was stopped when the app dropped; don't wait on a
    // fetch that may still be blocked in the HTTP client.
    rt.shutdown_timeout(Duration::from_millis(500));

    result
}

/// Interactive runs only log when a log file is given; export logs to stderr.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("watchdog_tui=info,watchdog=info"));

    if args.export.is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else if let Some(ref path) = args.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }

    Ok(())
}

/// Layer command-line flags over the loaded configuration.
fn resolve_config(args: &Args) -> Result<DashboardConfig> {
    let parse = |flag: &str, value: &Option<String>| -> Result<Option<Duration>> {
        value
            .as_deref()
            .map(|v| parse_duration(v).with_context(|| format!("Invalid --{}: {}", flag, v)))
            .transpose()
    };

    let overrides = ConfigOverrides {
        api_url: args.url.clone(),
        refresh_interval: parse("refresh", &args.refresh)?,
        fetch_timeout: parse("timeout", &args.timeout)?,
        page_size: args.page_size,
    };

    Ok(DashboardConfig::load(args.config.as_deref())?.with_overrides(overrides)?)
}

fn build_source(args: &Args, config: &DashboardConfig) -> Result<Arc<dyn SampleSource>> {
    if let Some(ref path) = args.file {
        return Ok(Arc::new(FileSource::new(path)));
    }
    let source = HttpSource::new(&config.api_url, config.fetch_timeout)?;
    Ok(Arc::new(source))
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Stop the refresh loop before handing the terminal back
    drop(app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        app.poll_refresh();

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Fetch once and export the resulting dashboard state to a JSON file
async fn export_to_file(
    source: Arc<dyn SampleSource>,
    export_path: &Path,
    config: &DashboardConfig,
) -> Result<()> {
    tracing::info!("Fetching from {}", source.description());

    let samples = tokio::time::timeout(config.fetch_timeout, source.fetch())
        .await
        .map_err(|_| watchdog_tui::FetchError::Timeout(config.fetch_timeout))??;

    if samples.is_empty() {
        tracing::warn!("Source returned no samples; exporting an empty history");
    }

    let state = DashboardState::new(config.page_size).reduce(Action::Refreshed {
        generation: 1,
        at: Utc::now(),
        entries: normalize(&samples),
    });

    write_export(export_path, &state, source.description())?;

    tracing::info!(
        "Exported {} entries to {}",
        state.history().len(),
        export_path.display()
    );
    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}
