use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::game::board::TILE_COUNT;
use crate::game::generator::SequenceGenerator;
use crate::game::input::InputCollector;
use crate::game::judge::Verdict;
use crate::game::playback::{PlaybackEvent, PlaybackScheduler};
use crate::game::ports::Ports;
use crate::game::score::ScoreKeeper;
use crate::game::timer::Timeline;

pub const WELCOME_TEXT:   &str = "Welcome to the Game!";
pub const GET_READY_TEXT: &str = "Get ready...";
pub const YOUR_TURN_TEXT: &str = "Your turn";
pub const CORRECT_TEXT:   &str = "Correct!";
pub const GAME_OVER_TEXT: &str = "Game Over! Press Begin to play again.";

// ── Rules ─────────────────────────────────────────────────────────────────────

/// What a wrong sequence does to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MistakePolicy {
    /// Lose points, drop a level (never below 1) and retry.
    #[default]
    Demote,
    /// The first wrong sequence ends the game.
    EndGame,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    pub pre_round_delay: Duration,
    pub step_interval:   Duration,
    pub round_pause:     Duration,
    /// Sequence length is `base_length + level`.
    pub base_length:     usize,
    pub success_points:  i64,
    pub failure_penalty: i64,
    pub on_mistake:      MistakePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pre_round_delay: Duration::from_secs(2),
            step_interval:   Duration::from_secs(2),
            round_pause:     Duration::from_secs(2),
            base_length:     2,
            success_points:  10,
            failure_penalty: 5,
            on_mistake:      MistakePolicy::Demote,
        }
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase { Idle, Playing, GameOver }

/// Where a `Playing` session is inside its round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Waiting out the delay before the first round.
    Preparing,
    Presenting,
    AwaitingInput,
    /// Waiting out the pause after a verdict.
    Pausing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Ignored,
    Accepted(Verdict),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionEvent {
    BeginRound,
    Playback(PlaybackEvent),
}

impl From<PlaybackEvent> for SessionEvent {
    fn from(ev: PlaybackEvent) -> Self { Self::Playback(ev) }
}

// ── Controller ────────────────────────────────────────────────────────────────

/// The game's single state machine.
///
/// Every operation takes the current game time and borrowed collaborators;
/// nothing runs between calls.  Deferred work (the pre-round delay, playback
/// steps, the post-verdict pause) sits in a timeline drained by `tick`, and
/// every reset clears that timeline so no stale event outlives its round.
pub struct SessionController {
    config:    SessionConfig,
    phase:     Phase,
    stage:     Stage,
    level:     usize,
    target:    Vec<usize>,
    input:     InputCollector,
    scores:    ScoreKeeper,
    generator: SequenceGenerator,
    playback:  PlaybackScheduler,
    timeline:  Timeline<SessionEvent>,
}

impl SessionController {
    pub fn new(config: SessionConfig, generator: SequenceGenerator) -> Self {
        let playback = PlaybackScheduler::new(config.step_interval);
        Self {
            config,
            phase:    Phase::Idle,
            stage:    Stage::Preparing,
            level:    1,
            target:   Vec::new(),
            input:    InputCollector::new(),
            scores:   ScoreKeeper::new(),
            generator,
            playback,
            timeline: Timeline::new(),
        }
    }

    /// Loads the stored high score and puts the idle labels up.
    pub fn open(&mut self, ports: &mut Ports) {
        self.scores.load(&*ports.store, &mut *ports.renderer);
        ports.renderer.set_status_text(WELCOME_TEXT);
    }

    // ── Read helpers ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase { self.phase }

    /// `None` unless the session is playing.
    pub fn stage(&self) -> Option<Stage> {
        (self.phase == Phase::Playing).then_some(self.stage)
    }

    pub fn level(&self) -> usize { self.level }

    pub fn score(&self) -> i64 { self.scores.score() }

    #[cfg(test)]
    pub fn high_score(&self) -> i64 { self.scores.high_score() }

    pub fn target(&self) -> &[usize] { &self.target }

    pub fn player(&self) -> &[usize] { self.input.entered() }

    pub fn accepting_input(&self) -> bool {
        self.phase == Phase::Playing
            && self.stage == Stage::AwaitingInput
            && self.input.is_accepting(&self.target)
    }

    pub fn target_length(&self) -> usize { self.config.base_length + self.level }

    /// When the next deferred event is due, if any.
    pub fn next_deadline(&self) -> Option<Duration> { self.timeline.next_due() }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Starts a fresh game.  Does nothing (and returns `false`) if a game is
    /// already running.
    pub fn start(&mut self, now: Duration, ports: &mut Ports) -> bool {
        if self.phase == Phase::Playing {
            debug!("start ignored: game already running");
            return false;
        }
        self.reset(ports);
        self.phase = Phase::Playing;
        self.stage = Stage::Preparing;
        ports.renderer.set_status_text(GET_READY_TEXT);
        self.timeline.schedule(now + self.config.pre_round_delay, SessionEvent::BeginRound);
        info!("game started");
        true
    }

    /// Ends the game from any state: persists the high score if it was
    /// beaten, cancels everything pending and resets to level 1, score 0.
    pub fn end(&mut self, ports: &mut Ports) {
        let final_score = self.scores.score();
        let record = self.scores.commit(&mut *ports.store, &mut *ports.renderer);
        self.reset(ports);
        self.phase = Phase::GameOver;
        ports.renderer.set_status_text(GAME_OVER_TEXT);
        info!(final_score, record, "game ended");
    }

    /// A tile tap from the player.
    pub fn select(&mut self, tile: usize, now: Duration, ports: &mut Ports) -> SelectOutcome {
        if self.phase != Phase::Playing || self.stage != Stage::AwaitingInput {
            return SelectOutcome::Ignored;
        }
        let Some(verdict) = self.input.on_select(tile, &self.target, ports) else {
            return SelectOutcome::Ignored;
        };
        match verdict {
            Verdict::Ongoing   => {}
            Verdict::Correct   => self.round_won(now, ports),
            Verdict::Incorrect => self.round_lost(now, ports),
        }
        SelectOutcome::Accepted(verdict)
    }

    /// Fires every deferred event due by `now`, in order.  Returns how many
    /// fired.
    pub fn tick(&mut self, now: Duration, ports: &mut Ports) -> usize {
        let mut fired = 0;
        while let Some((at, event)) = self.timeline.pop_due(now) {
            fired += 1;
            match event {
                SessionEvent::BeginRound => self.begin_round(at, ports),
                SessionEvent::Playback(PlaybackEvent::Step(position)) => {
                    if self.stage != Stage::Presenting { continue; }
                    if let Some(tile) = self.playback.step(position, at, &mut self.timeline, ports) {
                        debug!(position, tile, "presented");
                    }
                }
                SessionEvent::Playback(PlaybackEvent::Complete) => {
                    if self.playback.finish() {
                        self.stage = Stage::AwaitingInput;
                        self.input.enable();
                        ports.renderer.set_status_text(YOUR_TURN_TEXT);
                    }
                }
            }
        }
        fired
    }

    // ── Transitions ───────────────────────────────────────────────────────

    fn begin_round(&mut self, at: Duration, ports: &mut Ports) {
        if self.phase != Phase::Playing { return; }
        let length = self.target_length();
        self.target = match self.generator.generate(length, TILE_COUNT) {
            Ok(seq) => seq,
            Err(e) => {
                warn!("could not generate round: {e}");
                self.end(ports);
                return;
            }
        };
        self.input.disable();
        self.input.clear();
        self.stage = Stage::Presenting;
        ports.renderer.set_status_text(&format!("Watch closely... (level {})", self.level));
        debug!(level = self.level, sequence = ?self.target, "round begins");

        if let Err(e) = self.playback.play(&self.target, at, &mut self.timeline) {
            warn!("could not start playback: {e}");
            self.end(ports);
        }
    }

    fn round_won(&mut self, now: Duration, ports: &mut Ports) {
        self.scores.apply(self.config.success_points, &mut *ports.renderer);
        self.level += 1;
        info!(level = self.level, score = self.scores.score(), "round won");
        self.pause_before_next_round(now);
        ports.renderer.set_status_text(CORRECT_TEXT);
    }

    fn round_lost(&mut self, now: Duration, ports: &mut Ports) {
        match self.config.on_mistake {
            MistakePolicy::EndGame => {
                info!(level = self.level, "wrong sequence, game over");
                self.end(ports);
            }
            MistakePolicy::Demote => {
                self.scores.apply(-self.config.failure_penalty, &mut *ports.renderer);
                self.level = self.level.saturating_sub(1).max(1);
                info!(level = self.level, score = self.scores.score(), "round lost");
                self.pause_before_next_round(now);
                ports.renderer.set_status_text(&format!("Wrong! Back to level {}", self.level));
            }
        }
    }

    fn pause_before_next_round(&mut self, now: Duration) {
        self.input.disable();
        self.input.clear();
        self.stage = Stage::Pausing;
        self.timeline.schedule(now + self.config.round_pause, SessionEvent::BeginRound);
    }

    fn reset(&mut self, ports: &mut Ports) {
        self.playback.cancel(&mut self.timeline);
        self.timeline.cancel_all();
        self.input.disable();
        self.input.clear();
        self.target.clear();
        self.level = 1;
        self.scores.reset(&mut *ports.renderer);
    }
}
