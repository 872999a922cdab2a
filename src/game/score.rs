use tracing::{info, warn};

use crate::game::ports::{KeyValueStore, Renderer, HIGH_SCORE_KEY};

/// Running score plus the cached, persisted high score.
#[derive(Debug, Default)]
pub struct ScoreKeeper {
    score: i64,
    high_score: i64,
}

impl ScoreKeeper {
    pub fn new() -> Self { Self::default() }

    pub fn score(&self) -> i64 { self.score }

    #[cfg(test)]
    pub fn high_score(&self) -> i64 { self.high_score }

    /// Reads the stored high score into the cache and shows both labels.
    pub fn load(&mut self, store: &dyn KeyValueStore, renderer: &mut dyn Renderer) {
        self.high_score = store.get_int(HIGH_SCORE_KEY);
        renderer.set_score_text(self.score);
        renderer.set_high_score_text(self.high_score);
    }

    /// Score has no floor; it may dip below zero.
    pub fn apply(&mut self, delta: i64, renderer: &mut dyn Renderer) {
        self.score += delta;
        renderer.set_score_text(self.score);
    }

    pub fn reset(&mut self, renderer: &mut dyn Renderer) {
        self.score = 0;
        renderer.set_score_text(0);
    }

    /// Persists the current score if it beats the high score.  Returns whether
    /// the high score moved.  A failed write is logged; the cache still moves
    /// so the session shows the right number.
    pub fn commit(&mut self, store: &mut dyn KeyValueStore, renderer: &mut dyn Renderer) -> bool {
        if self.score <= self.high_score { return false; }
        self.high_score = self.score;
        if let Err(e) = store.set_int(HIGH_SCORE_KEY, self.high_score) {
            warn!("could not persist high score {}: {e:#}", self.high_score);
        }
        renderer.set_high_score_text(self.high_score);
        info!(high_score = self.high_score, "new high score");
        true
    }
}
