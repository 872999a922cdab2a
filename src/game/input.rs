use crate::game::board::TILE_COUNT;
use crate::game::judge::{self, Verdict};
use crate::game::playback::present_tile;
use crate::game::ports::Ports;

/// Collects the player's taps for the current round.
#[derive(Debug, Default)]
pub struct InputCollector {
    entered: Vec<usize>,
    enabled: bool,
}

impl InputCollector {
    pub fn new() -> Self { Self::default() }

    pub fn enable(&mut self) { self.enabled = true; }

    pub fn disable(&mut self) { self.enabled = false; }

    pub fn clear(&mut self) { self.entered.clear(); }

    pub fn entered(&self) -> &[usize] { &self.entered }

    /// True while a tap would be taken: enabled and the entry not yet full.
    pub fn is_accepting(&self, target: &[usize]) -> bool {
        self.enabled && self.entered.len() < target.len()
    }

    /// Takes one tap.  `None` means the tap was ignored: input disabled, the
    /// entry already full, or not a board tile.
    pub fn on_select(&mut self, tile: usize, target: &[usize], ports: &mut Ports) -> Option<Verdict> {
        if !self.is_accepting(target) || tile >= TILE_COUNT {
            return None;
        }
        present_tile(tile, ports);
        self.entered.push(tile);
        Some(judge::evaluate(&self.entered, target))
    }
}
