//! TOML configuration and default file locations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::game::{MistakePolicy, SessionConfig};
use crate::synth::WaveType;

const APP_DIR: &str = "tonetrace";
const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fixed RNG seed; random per run when absent.
    pub seed:   Option<u64>,
    pub timing: TimingConfig,
    pub rules:  RulesConfig,
    pub audio:  AudioConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub pre_round_delay_ms: u64,
    pub step_interval_ms:   u64,
    pub round_pause_ms:     u64,
    /// Length of each highlight sub-phase (rise, hold, fall).
    pub pulse_phase_ms:     u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { pre_round_delay_ms: 2000, step_interval_ms: 2000, round_pause_ms: 2000, pulse_phase_ms: 100 }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    pub base_length:     usize,
    pub success_points:  i64,
    pub failure_penalty: i64,
    pub on_mistake:      MistakePolicy,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self { base_length: 2, success_points: 10, failure_penalty: 5, on_mistake: MistakePolicy::Demote }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    pub wave:    WaveType,
    pub volume:  f32,
    pub tone_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { wave: WaveType::Triangle, volume: 0.5, tone_ms: 600 }
    }
}

impl Config {
    /// Loads `path` if given (it must exist), otherwise the per-user config
    /// file if there is one, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => {
                    debug!("no config file, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.timing.step_interval_ms > 0, "timing.step_interval_ms must be > 0");
        ensure!((0.0..=1.0).contains(&self.audio.volume), "audio.volume must be within 0.0..=1.0");
        ensure!(self.rules.failure_penalty >= 0, "rules.failure_penalty must not be negative");
        Ok(())
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            pre_round_delay: Duration::from_millis(self.timing.pre_round_delay_ms),
            step_interval:   Duration::from_millis(self.timing.step_interval_ms),
            round_pause:     Duration::from_millis(self.timing.round_pause_ms),
            base_length:     self.rules.base_length,
            success_points:  self.rules.success_points,
            failure_penalty: self.rules.failure_penalty,
            on_mistake:      self.rules.on_mistake,
        }
    }

    pub fn pulse_phase(&self) -> Duration { Duration::from_millis(self.timing.pulse_phase_ms) }

    pub fn tone_length(&self) -> Duration { Duration::from_millis(self.audio.tone_ms) }
}

/// `~/.config/tonetrace/config.toml` on Linux, platform equivalent elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

/// Where the score file and log live unless `--data-dir` says otherwise.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.session(), SessionConfig::default());
        assert_eq!(config.pulse_phase(), Duration::from_millis(100));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::parse(r#"
            seed = 99

            [timing]
            step_interval_ms = 750

            [rules]
            on_mistake = "end-game"

            [audio]
            wave = "square"
        "#).unwrap();

        assert_eq!(config.seed, Some(99));
        assert_eq!(config.timing.step_interval_ms, 750);
        assert_eq!(config.timing.round_pause_ms, 2000);
        assert_eq!(config.rules.on_mistake, MistakePolicy::EndGame);
        assert_eq!(config.rules.base_length, 2);
        assert_eq!(config.audio.wave, WaveType::Square);
        assert_eq!(config.session().step_interval, Duration::from_millis(750));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[timing]\nstep_ms = 5").is_err());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut config = Config::default();
        config.timing.step_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.audio.volume = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rules]\nsuccess_points = 20\n").unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap().rules.success_points, 20);
    }
}
