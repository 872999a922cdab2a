/// Storage key for the persisted high score.
pub const HIGH_SCORE_KEY: &str = "highScore";

/// Visual side of the game.  Everything is fire-and-forget: the core never
/// reads anything back.
pub trait Renderer {
    /// Transient emphasis of one tile (the renderer owns the animation).
    fn highlight_tile(&mut self, index: usize);
    fn set_status_text(&mut self, text: &str);
    fn set_score_text(&mut self, score: i64);
    fn set_high_score_text(&mut self, high_score: i64);
}

/// Audio side of the game.  Implementations restart a tone that is still
/// sounding and swallow (and log) their own failures.
pub trait Sound {
    fn play_tone(&mut self, index: usize);
}

/// Integer key-value persistence.
pub trait KeyValueStore {
    /// Missing keys read as 0.
    fn get_int(&self, key: &str) -> i64;
    fn set_int(&mut self, key: &str, value: i64) -> anyhow::Result<()>;
}

/// Borrowed collaborators handed to every session call.  The session never
/// keeps them past the call.
pub struct Ports<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub sound:    &'a mut dyn Sound,
    pub store:    &'a mut dyn KeyValueStore,
}

/// Recording collaborators for unit tests.
#[cfg(test)]
pub mod fakes {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default)]
    pub struct FakeRenderer {
        pub highlights: Vec<usize>,
        pub status:     String,
        pub score:      i64,
        pub high_score: i64,
    }

    impl Renderer for FakeRenderer {
        fn highlight_tile(&mut self, index: usize) { self.highlights.push(index); }
        fn set_status_text(&mut self, text: &str) { self.status = text.to_string(); }
        fn set_score_text(&mut self, score: i64) { self.score = score; }
        fn set_high_score_text(&mut self, high_score: i64) { self.high_score = high_score; }
    }

    #[derive(Default)]
    pub struct FakeSound {
        pub tones: Vec<usize>,
    }

    impl Sound for FakeSound {
        fn play_tone(&mut self, index: usize) { self.tones.push(index); }
    }

    /// With `read_only` set every write fails, like a score file on a full
    /// or read-only disk.
    #[derive(Default)]
    pub struct MemoryStore {
        pub values:    HashMap<String, i64>,
        pub writes:    usize,
        pub read_only: bool,
    }

    impl KeyValueStore for MemoryStore {
        fn get_int(&self, key: &str) -> i64 { self.values.get(key).copied().unwrap_or(0) }

        fn set_int(&mut self, key: &str, value: i64) -> anyhow::Result<()> {
            self.writes += 1;
            if self.read_only { anyhow::bail!("store is read-only"); }
            self.values.insert(key.to_string(), value);
            Ok(())
        }
    }

    /// Owns one of each fake so tests can build `Ports` repeatedly.
    #[derive(Default)]
    pub struct Rig {
        pub renderer: FakeRenderer,
        pub sound:    FakeSound,
        pub store:    MemoryStore,
    }

    impl Rig {
        pub fn with_high_score(high: i64) -> Self {
            let mut rig = Self::default();
            rig.store.values.insert(HIGH_SCORE_KEY.to_string(), high);
            rig
        }

        pub fn read_only(high: i64) -> Self {
            let mut rig = Self::with_high_score(high);
            rig.store.read_only = true;
            rig
        }

        pub fn ports(&mut self) -> Ports<'_> {
            Ports { renderer: &mut self.renderer, sound: &mut self.sound, store: &mut self.store }
        }
    }
}
