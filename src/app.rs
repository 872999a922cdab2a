use std::time::{Duration, Instant};

use tracing::debug;

use crate::audio::TonePlayer;
use crate::game::board::{pulse_phase, PulsePhase, TILE_COUNT};
use crate::game::{Phase, Ports, Renderer, SelectOutcome, SessionController};
use crate::save::JsonStore;

// ── Display state (the game's Renderer) ───────────────────────────────────────

/// Everything the UI draws, written by the game through `Renderer`.
pub struct Display {
    pub status:     String,
    pub score:      i64,
    pub high_score: i64,
    lit:            [Option<Instant>; TILE_COUNT],
    pulse_phase:    Duration,
}

impl Display {
    pub fn new(pulse_phase: Duration) -> Self {
        Self {
            status:     String::new(),
            score:      0,
            high_score: 0,
            lit:        [None; TILE_COUNT],
            pulse_phase,
        }
    }

    /// Current highlight phase of a tile, `None` when at rest.
    pub fn tile_pulse(&self, index: usize, now: Instant) -> Option<PulsePhase> {
        let started = (*self.lit.get(index)?)?;
        pulse_phase(now.saturating_duration_since(started), self.pulse_phase)
    }
}

impl Renderer for Display {
    fn highlight_tile(&mut self, index: usize) {
        if let Some(slot) = self.lit.get_mut(index) { *slot = Some(Instant::now()); }
    }
    fn set_status_text(&mut self, text: &str) { self.status = text.to_string(); }
    fn set_score_text(&mut self, score: i64) { self.score = score; }
    fn set_high_score_text(&mut self, high_score: i64) { self.high_score = high_score; }
}

// ── App state ─────────────────────────────────────────────────────────────────

pub struct App {
    pub session:     SessionController,
    pub display:     Display,
    pub player:      TonePlayer,
    pub store:       JsonStore,
    pub should_quit: bool,
    /// Shell notices (wave changes and the like), shown next to the status.
    pub status_msg:  String,
    started:         Instant,
}

impl App {
    pub fn new(session: SessionController, display: Display, player: TonePlayer, store: JsonStore) -> Self {
        let mut app = Self {
            session,
            display,
            player,
            store,
            should_quit: false,
            status_msg:  String::new(),
            started:     Instant::now(),
        };
        app.with_ports(|session, _, ports| session.open(ports));
        app
    }

    /// Game time: elapsed since the app came up.
    pub fn now(&self) -> Duration { self.started.elapsed() }

    fn with_ports<R>(&mut self, f: impl FnOnce(&mut SessionController, Duration, &mut Ports) -> R) -> R {
        let now = self.now();
        let Self { session, display, player, store, .. } = self;
        let mut ports = Ports { renderer: display, sound: player, store };
        f(session, now, &mut ports)
    }

    // ── Game commands ─────────────────────────────────────────────────────

    pub fn begin(&mut self) {
        if !self.with_ports(|session, now, ports| session.start(now, ports)) {
            self.status_msg = "Already playing".to_string();
        } else {
            self.status_msg.clear();
        }
    }

    pub fn end_game(&mut self) {
        self.with_ports(|session, _, ports| session.end(ports));
    }

    pub fn select_tile(&mut self, tile: usize) {
        let outcome = self.with_ports(|session, now, ports| session.select(tile, now, ports));
        if outcome == SelectOutcome::Ignored { debug!(tile, "tap ignored"); }
    }

    /// Fires any timers that came due since the last frame.
    pub fn tick(&mut self) {
        self.with_ports(|session, now, ports| session.tick(now, ports));
    }

    /// Ends a running game first so its score counts toward the high score.
    pub fn quit(&mut self) {
        if self.session.phase() == Phase::Playing { self.end_game(); }
        self.should_quit = true;
    }

    // ── Shell controls ────────────────────────────────────────────────────

    pub fn cycle_wave(&mut self) {
        let msg = match self.player.synth().lock() {
            Ok(mut s) => {
                s.wave_type = s.wave_type.next();
                format!("Wave: {}", s.wave_type.name())
            }
            Err(_) => "Wave unavailable".to_string(),
        };
        self.status_msg = msg;
    }

    // ── UI read helpers ───────────────────────────────────────────────────

    pub fn wave_name(&self) -> String {
        self.player.synth().lock()
            .map(|s| s.wave_type.name().to_string())
            .unwrap_or_else(|_| "?".to_string())
    }

    pub fn sounding_tiles(&self) -> Vec<usize> {
        self.player.synth().lock()
            .map(|s| s.active_tiles())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::game::{SequenceGenerator, SessionConfig};
    use crate::synth::{ToneSynth, WaveType};

    fn app(dir: &std::path::Path) -> App {
        let synth = Arc::new(Mutex::new(
            ToneSynth::new(1000.0, WaveType::Sine, 0.5, Duration::from_millis(10))));
        let config = SessionConfig { pre_round_delay: Duration::ZERO, ..SessionConfig::default() };
        App::new(
            SessionController::new(config, SequenceGenerator::seeded(5)),
            Display::new(Duration::from_millis(100)),
            TonePlayer::open(synth, true),
            JsonStore::open(dir),
        )
    }

    #[test]
    fn display_follows_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        assert_eq!(app.display.status, "Welcome to the Game!");

        app.begin();
        app.tick();
        assert_eq!(app.session.phase(), Phase::Playing);
        assert!(app.display.status.starts_with("Watch closely"));
        let first = app.session.target()[0];
        assert!(app.display.tile_pulse(first, Instant::now()).is_some());
        assert_eq!(app.sounding_tiles(), vec![first]);

        app.begin();
        assert_eq!(app.status_msg, "Already playing");
    }

    #[test]
    fn quit_ends_a_running_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        app.begin();
        app.quit();
        assert!(app.should_quit);
        assert_eq!(app.session.phase(), Phase::GameOver);
    }

    #[test]
    fn pulse_fades_out() {
        let mut display = Display::new(Duration::from_millis(100));
        let t0 = Instant::now();
        display.highlight_tile(1);
        assert_eq!(display.tile_pulse(0, t0), None);
        assert_eq!(display.tile_pulse(1, t0 + Duration::from_secs(1)), None);
        display.highlight_tile(TILE_COUNT);
    }

    #[test]
    fn wave_cycles() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());
        assert_eq!(app.wave_name(), "Sine");
        app.cycle_wave();
        assert_eq!(app.wave_name(), "Square");
        assert_eq!(app.status_msg, "Wave: Square");
    }
}
