use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use metricwatch::data::duration::format_duration;
use metricwatch::{events, ui, App, Dashboard, DataSource, FileSource, Settings, StreamSource, Theme, ThemeChoice};

#[derive(Parser, Debug)]
#[command(name = "metricwatch")]
#[command(about = "Live metrics dashboard: recent history plus a live measurement feed")]
struct Args {
    /// Connect to a measurement server (host:port) speaking newline-delimited JSON
    #[arg(short, long, conflicts_with = "file")]
    connect: Option<String>,

    /// Read catalog, history and a replayed live feed from a JSON fixture
    #[arg(short, long, default_value = "metricwatch.json")]
    file: PathBuf,

    /// Settings file (TOML); METRICWATCH_* environment variables also apply
    #[arg(long)]
    config: Option<PathBuf>,

    /// How far back the history query reaches (e.g. "30m", "2h")
    #[arg(short, long)]
    lookback: Option<String>,

    /// Color theme
    #[arg(long, value_enum)]
    theme: Option<ThemeChoice>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(lookback) = args.lookback {
        settings.lookback = lookback;
    }
    if let Some(theme) = args.theme {
        settings.theme = theme;
    }

    init_logging(&settings.log_file, &args.log_level)?;

    let lookback = settings.lookback_duration()?;
    let refresh = settings.refresh_duration()?;

    // The runtime hosts the stream reader/writer tasks while the TUI runs on this thread.
    let rt = tokio::runtime::Runtime::new()?;

    let source: Box<dyn DataSource> = match args.connect {
        Some(ref addr) => {
            println!("Connecting to {}...", addr);
            let source = rt
                .block_on(StreamSource::connect(addr.as_str(), addr))
                .with_context(|| format!("Failed to connect to {}", addr))?;
            Box::new(source)
        }
        None => Box::new(FileSource::new(&args.file).with_replay_interval(settings.replay_duration()?)),
    };
    info!(source = source.description(), lookback = %format_duration(lookback), "starting");

    let mut app = App::new(source, Dashboard::new(lookback), Theme::from_choice(settings.theme));
    app.max_events_per_tick = settings.max_events_per_tick.max(1);

    let result = run_tui(&mut app, refresh);
    rt.shutdown_background();
    result
}

/// Send logs to a file; the terminal belongs to the TUI.
fn init_logging(path: &Path, level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {}", e))
}

/// Run the TUI until the user quits
fn run_tui(app: &mut App, refresh_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    app.start();
    let result = run_app(&mut terminal, app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    // Apply whatever is already waiting before the first frame
    app.reload_data()?;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::draw(frame, app);
        })?;

        if let Some(Event::Key(key)) = events::poll_event(refresh_interval)? {
            events::handle_key_event(app, key);
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data()?;
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
