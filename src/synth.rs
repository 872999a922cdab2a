use std::f32::consts::PI;
use std::time::Duration;

use serde::Deserialize;

use crate::game::board::TILE_COUNT;

/// MIDI notes for the three tiles: A2, B2, F2.
pub const TILE_NOTES: [u8; TILE_COUNT] = [45, 47, 41];

// ── Waveform ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveType { Sine, Square, Sawtooth, Triangle }

impl WaveType {
    pub fn next(self) -> Self {
        match self {
            Self::Sine => Self::Square, Self::Square => Self::Sawtooth,
            Self::Sawtooth => Self::Triangle, Self::Triangle => Self::Sine,
        }
    }
    pub fn name(self) -> &'static str {
        match self {
            Self::Sine => "Sine", Self::Square => "Square",
            Self::Sawtooth => "Sawtooth", Self::Triangle => "Triangle",
        }
    }
}

// ── ADSR envelope ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnvelopeStage { Attack, Decay, Sustain, Release, Off }

// ── Tile voice ────────────────────────────────────────────────────────────────

/// One tone.  Releases by itself once it has been held for `hold` samples.
#[derive(Clone, Debug)]
pub struct Voice {
    pub frequency:     f32,
    pub phase:         f32,
    pub stage:         EnvelopeStage,
    pub level:         f32,
    pub release_level: f32,
    held: u64,
    hold: u64,
}

impl Voice {
    pub fn new(note: u8, hold: u64) -> Self {
        Self { frequency: note_to_freq(note), phase: 0.0,
               stage: EnvelopeStage::Attack, level: 0.0, release_level: 0.0,
               held: 0, hold }
    }

    pub fn release(&mut self) {
        if self.stage != EnvelopeStage::Off {
            self.release_level = self.level;
            self.stage = EnvelopeStage::Release;
        }
    }

    pub fn is_finished(&self) -> bool { self.stage == EnvelopeStage::Off }

    pub fn next_sample(&mut self, sr: f32, wave: WaveType,
                       attack: f32, decay: f32, sustain: f32, release: f32) -> f32 {
        if self.stage != EnvelopeStage::Release && self.stage != EnvelopeStage::Off {
            self.held += 1;
            if self.held >= self.hold { self.release(); }
        }

        let dt = 1.0 / sr;
        match self.stage {
            EnvelopeStage::Attack => {
                self.level += dt / attack;
                if self.level >= 1.0 { self.level = 1.0; self.stage = EnvelopeStage::Decay; }
            }
            EnvelopeStage::Decay => {
                self.level -= dt * (1.0 - sustain) / decay;
                if self.level <= sustain { self.level = sustain; self.stage = EnvelopeStage::Sustain; }
            }
            EnvelopeStage::Sustain => { self.level = sustain; }
            EnvelopeStage::Release => {
                self.level -= dt * self.release_level / release;
                if self.level <= 0.0 { self.level = 0.0; self.stage = EnvelopeStage::Off; }
            }
            EnvelopeStage::Off => return 0.0,
        }

        let sample = match wave {
            WaveType::Sine     => (self.phase * 2.0 * PI).sin(),
            WaveType::Square   => if (self.phase * 2.0 * PI).sin() >= 0.0 { 1.0 } else { -1.0 },
            WaveType::Sawtooth => 2.0 * self.phase - 1.0,
            WaveType::Triangle => {
                if self.phase < 0.5 { 4.0 * self.phase - 1.0 } else { 3.0 - 4.0 * self.phase }
            }
        };

        self.phase += self.frequency / sr;
        if self.phase >= 1.0 { self.phase -= 1.0; }
        sample * self.level
    }
}

// ── Tone synth ────────────────────────────────────────────────────────────────

/// Three-voice synth, one voice per tile.  Shared with the audio callback
/// behind a mutex.
pub struct ToneSynth {
    pub sample_rate: f32,
    pub wave_type:   WaveType,
    pub voices:      [Option<Voice>; TILE_COUNT],
    pub attack:  f32,
    pub decay:   f32,
    pub sustain: f32,
    pub release: f32,
    pub volume:  f32,
    pub tone_length: Duration,
}

impl ToneSynth {
    pub fn new(sample_rate: f32, wave_type: WaveType, volume: f32, tone_length: Duration) -> Self {
        Self {
            sample_rate,
            wave_type,
            voices:  [None, None, None],
            attack:  0.005, decay: 0.15, sustain: 0.5, release: 0.25,
            volume:  volume.clamp(0.0, 1.0),
            tone_length,
        }
    }

    /// Starts a tile's tone from the beginning, cutting off the previous one
    /// if it is still sounding.
    pub fn trigger(&mut self, index: usize) {
        let Some(&note) = TILE_NOTES.get(index) else { return };
        let hold = (self.tone_length.as_secs_f32() * self.sample_rate).round().max(1.0) as u64;
        self.voices[index] = Some(Voice::new(note, hold));
    }

    pub fn active_tiles(&self) -> Vec<usize> {
        self.voices.iter().enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|_| i))
            .collect()
    }

    pub fn generate_sample(&mut self) -> f32 {
        let sr   = self.sample_rate;
        let wave = self.wave_type;
        let (a, d, s, r) = (self.attack, self.decay, self.sustain, self.release);

        let mut mix = 0.0f32;
        let mut sounding = 0usize;
        for slot in self.voices.iter_mut() {
            let Some(v) = slot.as_mut() else { continue };
            mix += v.next_sample(sr, wave, a, d, s, r);
            sounding += 1;
            if v.is_finished() { *slot = None; }
        }
        (mix * self.volume / (sounding.max(1) as f32).sqrt()).tanh()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

pub fn note_to_freq(note: u8) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

pub fn note_name(note: u8) -> String {
    let names = ["C","C#","D","D#","E","F","F#","G","G#","A","A#","B"];
    format!("{}{}", names[(note % 12) as usize], (note / 12) as i32 - 1)
}
