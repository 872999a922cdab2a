use std::time::Duration;

/// Number of tiles on the board.  Fixed; the game is built around three tones.
pub const TILE_COUNT: usize = 3;

// ── Tiles ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileColor { Red, Yellow, Green }

impl TileColor {
    pub fn name(self) -> &'static str {
        match self {
            Self::Red => "Red", Self::Yellow => "Yellow", Self::Green => "Green",
        }
    }

    /// Light pastel RGB used when the tile is at rest.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Red    => (255, 128, 128),
            Self::Yellow => (255, 255, 128),
            Self::Green  => (128, 255, 128),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub color: TileColor,
}

pub const TILES: [Tile; TILE_COUNT] = [
    Tile { index: 0, color: TileColor::Red },
    Tile { index: 1, color: TileColor::Yellow },
    Tile { index: 2, color: TileColor::Green },
];

// ── Key → tile mapping ────────────────────────────────────────────────────────

pub fn key_to_tile(key: char) -> Option<usize> {
    match key {
        '1' | 'j' | 'J' => Some(0),
        '2' | 'k' | 'K' => Some(1),
        '3' | 'l' | 'L' => Some(2),
        _ => None,
    }
}

// ── Highlight pulse ───────────────────────────────────────────────────────────

/// Sub-phases of a tile highlight: scale up, hold, scale down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulsePhase { Rising, Holding, Falling }

/// Where a highlight started `elapsed` ago currently sits, given the length of
/// one sub-phase.  `None` once the pulse has finished.
pub fn pulse_phase(elapsed: Duration, phase_len: Duration) -> Option<PulsePhase> {
    if elapsed < phase_len {
        Some(PulsePhase::Rising)
    } else if elapsed < phase_len * 2 {
        Some(PulsePhase::Holding)
    } else if elapsed < phase_len * 3 {
        Some(PulsePhase::Falling)
    } else {
        None
    }
}
