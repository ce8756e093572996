//! Terminal Circle Pop runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from the term crate.
//! The loop blocks on input; there is no tick, since the game only changes in
//! response to keys.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use circle_pop::app::App;
use circle_pop::config::{AppConfig, USAGE};
use circle_pop::core::GameSnapshot;
use circle_pop::input::{handle_key_event, should_quit};
use circle_pop::scores::{now_ms, ScoreStore};
use circle_pop::term::{FrameBuffer, GameView, HudInfo, TerminalRenderer, Viewport};

fn main() -> Result<()> {
    let Some(config) = AppConfig::load()? else {
        print!("{}", USAGE);
        return Ok(());
    };

    if let Some(path) = config.log_path.as_deref() {
        init_logging(path)?;
    }

    let scores = match config.scores_path.as_deref() {
        Some(path) => ScoreStore::open(path)?,
        None => ScoreStore::in_memory(),
    };
    let seed = config.seed.unwrap_or_else(|| now_ms() as u32);
    tracing::info!(mode = config.mode.as_str(), seed, "starting");

    let mut app = App::new(config.mode, seed, scores)?;

    install_panic_hook();
    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &mut app);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = &result {
        tracing::error!(error = %format!("{:#}", e), "runner failed");
    }
    result
}

fn run(term: &mut TerminalRenderer, app: &mut App) -> Result<()> {
    let view = GameView::default();
    let mut snap = GameSnapshot::default();
    let mut fb = FrameBuffer::new(0, 0);

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        app.snapshot_into(&mut snap);
        let hud = HudInfo {
            best_score: app.best_score(),
            message: Some(app.message()).filter(|m| !m.is_empty()),
        };
        view.render_into_with_hud(&snap, hud, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        match event::read().context("read terminal event")? {
            Event::Key(key) => {
                if should_quit(key) {
                    return Ok(());
                }
                if let Some(action) = handle_key_event(key) {
                    app.apply(action)?;
                }
            }
            Event::Resize(_, _) => term.invalidate(),
            _ => {}
        }
    }
}

/// Send tracing output to `path`; the terminal itself is owned by the renderer.
fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,circle_pop=debug,circle_pop_core=debug"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();
    Ok(())
}

/// Leave raw mode before the default hook prints, so the message is readable.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );
        tracing::error!(%info, "panic");
        default_hook(info);
    }));
}
