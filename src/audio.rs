use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use tracing::{info, warn};

use crate::game::Sound;
use crate::synth::ToneSynth;

/// Keeps the cpal output stream alive.  Samples are pulled from the shared
/// synth inside the audio callback.
pub struct AudioEngine {
    _stream: cpal::Stream,
}

impl AudioEngine {
    pub fn new(synth: Arc<Mutex<ToneSynth>>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().context("no default output device")?;
        let supported = device.default_output_config().context("no default output config")?;
        let format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        if let Ok(mut s) = synth.lock() {
            s.sample_rate = config.sample_rate.0 as f32;
        }
        info!(rate = config.sample_rate.0, channels = config.channels, ?format, "audio output");

        let stream = match format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, synth)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, synth)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, synth)?,
            other => bail!("unsupported sample format {other:?}"),
        };
        stream.play().context("failed to play output stream")?;
        Ok(Self { _stream: stream })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    synth: Arc<Mutex<ToneSynth>>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let err_fn = |err| warn!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _info: &cpal::OutputCallbackInfo| {
            let Ok(mut s) = synth.lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            for frame in data.chunks_mut(channels) {
                let v = T::from_sample(s.generate_sample());
                frame.fill(v);
            }
        },
        err_fn,
        None,
    )?;
    Ok(stream)
}

// ── Sound capability ──────────────────────────────────────────────────────────

/// The game's `Sound`.  Works with or without a live output stream; when the
/// device is missing the synth still runs, nobody hears it.
pub struct TonePlayer {
    synth:   Arc<Mutex<ToneSynth>>,
    engine:  Option<AudioEngine>,
}

impl TonePlayer {
    /// Opens the default output device unless `mute` is set.  A device
    /// failure is logged and the player falls back to silence.
    pub fn open(synth: Arc<Mutex<ToneSynth>>, mute: bool) -> Self {
        let engine = if mute {
            info!("audio muted");
            None
        } else {
            match AudioEngine::new(Arc::clone(&synth)) {
                Ok(engine) => Some(engine),
                Err(e) => {
                    warn!("audio unavailable, playing silently: {e:#}");
                    None
                }
            }
        };
        Self { synth, engine }
    }

    pub fn is_audible(&self) -> bool { self.engine.is_some() }

    pub fn synth(&self) -> &Arc<Mutex<ToneSynth>> { &self.synth }
}

impl Sound for TonePlayer {
    fn play_tone(&mut self, index: usize) {
        match self.synth.lock() {
            Ok(mut s) => s.trigger(index),
            Err(_) => warn!(index, "tone synth lock poisoned, tone skipped"),
        }
    }
}
