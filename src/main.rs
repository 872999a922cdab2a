mod app;
mod audio;
mod config;
mod error;
mod game;
mod save;
mod synth;
mod ui;

use std::{fs::OpenOptions, io, path::PathBuf, sync::{Arc, Mutex}, time::Duration};

use anyhow::{Context, Result};
use app::{App, Display};
use audio::TonePlayer;
use clap::Parser;
use config::Config;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::{board::key_to_tile, SequenceGenerator, SessionController};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use save::JsonStore;
use synth::ToneSynth;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Repeat-the-sequence memory game for the terminal.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Config file (default: the per-user tonetrace/config.toml, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the high-score file and the log
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Fixed RNG seed, overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Run without opening an audio device
    #[arg(short, long)]
    mute: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref())?;
    if args.seed.is_some() { config.seed = args.seed; }
    let data_dir = args.data_dir.clone().unwrap_or_else(config::default_data_dir);
    init_logging(&data_dir)?;
    info!(data_dir = %data_dir.display(), seed = ?config.seed, "starting tonetrace");

    let app = build_app(&config, &data_dir, args.mute);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = run(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    if let Err(e) = result { eprintln!("Error: {:?}", e); }
    Ok(())
}

/// Log to `<data dir>/tonetrace.log`; the terminal belongs to the UI.
fn init_logging(data_dir: &std::path::Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;
    let path = data_dir.join("tonetrace.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)
        .with_context(|| format!("opening log {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tonetrace=info".into()),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn build_app(config: &Config, data_dir: &std::path::Path, mute: bool) -> App {
    let generator = match config.seed {
        Some(seed) => SequenceGenerator::seeded(seed),
        None => SequenceGenerator::from_entropy(),
    };
    let session = SessionController::new(config.session(), generator);

    let synth = Arc::new(Mutex::new(ToneSynth::new(
        44100.0, config.audio.wave, config.audio.volume, config.tone_length())));
    let player = TonePlayer::open(synth, mute);
    let store = JsonStore::open(data_dir);
    info!(scores = %store.path().display(), "score store opened");

    App::new(session, Display::new(config.pulse_phase()), player, store)
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press { continue; }
                    match key.code {
                        KeyCode::Esc => app.quit(),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
                        KeyCode::Enter | KeyCode::Char('b') | KeyCode::Char('B') => app.begin(),
                        KeyCode::Char('e') | KeyCode::Char('E') => app.end_game(),
                        KeyCode::Char('w') | KeyCode::Char('W') => app.cycle_wave(),
                        KeyCode::Char(c) => {
                            if let Some(tile) = key_to_tile(c) { app.select_tile(tile); }
                        }
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => {
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                        let size = terminal.size()?;
                        let area = Rect::new(0, 0, size.width, size.height);
                        if let Some(tile) = ui::tile_at(area, mouse.column, mouse.row) {
                            app.select_tile(tile);
                        }
                    }
                }
                _ => {}
            }
        }
        if app.should_quit { break; }
    }
    Ok(())
}
