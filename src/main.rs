mod app;
mod config;
mod theme;
mod timer;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Focus, Popup};
use config::AppConfig;
use timer::{TickHandle, TokioScheduler};

#[derive(Parser, Debug)]
#[command(name = "kaunto")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal countdown timer")]
struct Args {
    /// Countdown duration in seconds (pre-filled and set)
    #[arg(short, long)]
    duration: Option<u64>,

    /// Start counting down immediately
    #[arg(short, long)]
    start: bool,

    /// Path to an alternate config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr keeps it off the TUI)
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => AppConfig::load_from(path)?,
        None => AppConfig::load().unwrap_or_default(),
    };
    ui::init_theme(theme::Theme::from_config(&config.theme));

    let (scheduler, ticks) = TokioScheduler::new();
    let mut app = App::new(&config, scheduler);

    if let Some(secs) = args.duration {
        app.commit_initial_duration(secs);
    }
    if args.start {
        app.activate(Focus::Start);
    }

    run_tui(&mut app, ticks).await
}

async fn run_tui(app: &mut App<TokioScheduler>, ticks: UnboundedReceiver<TickHandle>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, app, ticks).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<TokioScheduler>,
    mut ticks: UnboundedReceiver<TickHandle>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None && !app.is_editing() => {
                            return Ok(())
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Apply every tick that fired since the last pass, in order
        while let Ok(handle) = ticks.try_recv() {
            app.on_tick(handle);
        }

        app.tick();
    }
}
