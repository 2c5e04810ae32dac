use std::io;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    crossterm::{
        event::{
            self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        },
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
};

use eqplot_core::{
    PlotConfig, PlotSession, SessionOptions,
    plot::color::{Rgb, seed_from_hue},
};

mod router;
mod routes;
mod state;
mod store;
mod surface;
mod transport;
mod ui;

use router::{Router, Tab};
use state::AppState;
use store::LocalFilterStore;
use transport::{ConfigCommand, ConfigHandle, ConfigTransport};

/// Interactive parametric EQ graph in the terminal
#[derive(Parser, Debug)]
#[command(name = "eqplot", version, about)]
struct Cli {
    /// Plot each channel separately with its own colors
    #[arg(long)]
    dual_channel: bool,

    /// Number of output channels
    #[arg(long, default_value_t = 2)]
    channels: usize,

    /// Title drawn at the top of the graph
    #[arg(long)]
    title: Option<String>,

    /// Background hue in degrees, seeds the single-channel curve colors
    #[arg(long)]
    hue: Option<f64>,

    /// Quiet period before edits are uploaded, in milliseconds
    #[arg(long, default_value_t = 100)]
    upload_delay_ms: u64,

    /// Most verbose level shown in the log tab
    #[arg(long, default_value = "debug")]
    log_level: log::LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tui_logger for TUI log display
    tui_logger::init_logger(cli.log_level)
        .map_err(|e| anyhow::anyhow!("failed to init tui_logger: {:?}", e))?;
    tui_logger::set_default_level(cli.log_level);

    log::info!("Starting eqplot");

    // Create config transport and get communication handle
    let (transport, handle) = ConfigTransport::new();
    let transport_thread = transport
        .spawn()
        .context("failed to start config transport")?;

    let store = LocalFilterStore::new(
        LocalFilterStore::default_filters(),
        cli.channels,
        handle.cmd_tx.clone(),
    );
    let config = PlotConfig {
        upload_delay: Duration::from_millis(cli.upload_delay_ms),
        ..PlotConfig::default()
    };
    let options = SessionOptions {
        title: cli.title,
        dual_channel: cli.dual_channel,
        color_seed: cli.hue.map_or(Rgb::DEFAULT_SEED, seed_from_hue),
    };
    let mut state = AppState::new(PlotSession::new(store, config, options));

    let result = run_tui(&mut state, &handle);

    // Ensure clean shutdown: flush edits before the transport goes away
    state.session.flush();
    let _ = handle.cmd_tx.send(ConfigCommand::Quit);
    if transport_thread.join().is_err() {
        log::error!("config transport panicked");
    }

    result
}

fn run_tui(state: &mut AppState, handle: &ConfigHandle) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut router = Router::new(Tab::Plot.route());
    let result = event_loop(&mut terminal, state, handle, &mut router);

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

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    handle: &ConfigHandle,
    router: &mut Router,
) -> anyhow::Result<()> {
    loop {
        // Handle transport responses
        while let Ok(response) = handle.resp_rx.try_recv() {
            state.handle_response(response);
        }

        state.session.tick(Instant::now());
        state.refresh_plot();

        // Draw UI
        terminal.draw(|f| ui::draw(f, state, router))?;

        // Handle input, roughly one display refresh per poll
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_global_keys(key.code, state, router)? {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    let action = router.current_mut().handle_mouse(mouse, state)?;
                    router.execute_action(action, state)?;
                }
                Event::Resize(..) => state.session.request_redraw(),
                _ => {}
            }
        }
    }
    Ok(())
}

/// Handle global keys and delegate route-specific input to router.
/// Returns true when the app should quit.
fn handle_global_keys(key: KeyCode, state: &mut AppState, router: &mut Router) -> anyhow::Result<bool> {
    match key {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Tab => {
            let next = router.current_tab().next();
            router.replace(next.route(), state)?;
            return Ok(false);
        }
        _ => {}
    }

    // Delegate to the current route's input handler
    let action = router.current_mut().handle_input(key, state)?;
    router.execute_action(action, state)?;
    Ok(false)
}
