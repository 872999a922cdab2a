use std::time::Duration;

use tracing::debug;

use crate::error::{GameError, Result};
use crate::game::ports::Ports;
use crate::game::timer::{TimerId, Timeline};

/// A deferred playback action, fired through the owner's timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    Step(usize),
    Complete,
}

/// Highlight + tone for one tile.  Shared by sequence playback and the
/// player's own selections.
pub fn present_tile(tile: usize, ports: &mut Ports) {
    ports.renderer.highlight_tile(tile);
    ports.sound.play_tone(tile);
}

/// Plays a sequence one step at a time on a timeline.
///
/// Step `k` lands at `origin + k * step_interval`; `Complete` lands one
/// interval after the last step.  Only the next event is ever scheduled, and
/// it is scheduled after the current step's effects went out, so steps can
/// neither reorder nor overlap.
pub struct PlaybackScheduler {
    step_interval: Duration,
    sequence:      Vec<usize>,
    pending:       Option<TimerId>,
    playing:       bool,
}

impl PlaybackScheduler {
    pub fn new(step_interval: Duration) -> Self {
        Self { step_interval, sequence: Vec::new(), pending: None, playing: false }
    }

    #[cfg(test)]
    pub fn is_playing(&self) -> bool { self.playing }

    pub fn play<E: From<PlaybackEvent>>(
        &mut self,
        sequence: &[usize],
        origin: Duration,
        timeline: &mut Timeline<E>,
    ) -> Result<()> {
        if self.playing { return Err(GameError::PlaybackBusy); }
        if sequence.is_empty() {
            return Err(GameError::InvalidArgument("cannot play an empty sequence".to_string()));
        }

        self.sequence = sequence.to_vec();
        self.pending = Some(timeline.schedule(origin, PlaybackEvent::Step(0).into()));
        self.playing = true;
        debug!(len = sequence.len(), ?origin, "playback scheduled");
        Ok(())
    }

    /// Presents the step that fired at `at` and schedules whatever follows.
    /// Returns the tile shown, or `None` for a step that no longer belongs to
    /// a live playback.
    pub fn step<E: From<PlaybackEvent>>(
        &mut self,
        position: usize,
        at: Duration,
        timeline: &mut Timeline<E>,
        ports: &mut Ports,
    ) -> Option<usize> {
        if !self.playing { return None; }
        let tile = *self.sequence.get(position)?;
        present_tile(tile, ports);

        let next = if position + 1 < self.sequence.len() {
            PlaybackEvent::Step(position + 1)
        } else {
            PlaybackEvent::Complete
        };
        self.pending = Some(timeline.schedule(at + self.step_interval, next.into()));
        Some(tile)
    }

    /// Marks playback finished.  Returns `false` for a completion that does
    /// not belong to a live playback, so completion is observed once.
    pub fn finish(&mut self) -> bool {
        let was_playing = self.playing;
        self.playing = false;
        self.pending = None;
        was_playing
    }

    /// Revokes the outstanding step or completion event.
    pub fn cancel<E>(&mut self, timeline: &mut Timeline<E>) {
        if let Some(id) = self.pending.take() {
            if timeline.cancel(id) { debug!("playback cancelled"); }
        }
        self.playing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ports::fakes::Rig;

    fn secs(v: u64) -> Duration { Duration::from_secs(v) }

    /// Fires everything due by `until`, feeding steps back into the scheduler.
    fn drain(
        playback: &mut PlaybackScheduler,
        timeline: &mut Timeline<PlaybackEvent>,
        rig: &mut Rig,
        until: Duration,
    ) -> Vec<(Duration, PlaybackEvent)> {
        let mut fired = Vec::new();
        while let Some((at, event)) = timeline.pop_due(until) {
            match event {
                PlaybackEvent::Step(k) => { playback.step(k, at, timeline, &mut rig.ports()); }
                PlaybackEvent::Complete => { assert!(playback.finish()); }
            }
            fired.push((at, event));
        }
        fired
    }

    #[test]
    fn steps_are_spaced_by_interval_and_complete_follows() {
        let mut rig = Rig::default();
        let mut timeline: Timeline<PlaybackEvent> = Timeline::new();
        let mut playback = PlaybackScheduler::new(secs(2));
        playback.play(&[2, 0, 2], secs(10), &mut timeline).unwrap();

        let fired = drain(&mut playback, &mut timeline, &mut rig, secs(100));
        assert_eq!(fired, vec![
            (secs(10), PlaybackEvent::Step(0)),
            (secs(12), PlaybackEvent::Step(1)),
            (secs(14), PlaybackEvent::Step(2)),
            (secs(16), PlaybackEvent::Complete),
        ]);
        assert_eq!(rig.renderer.highlights, vec![2, 0, 2]);
        assert_eq!(rig.sound.tones, vec![2, 0, 2]);
        assert!(!playback.is_playing());
        assert!(!playback.finish());
    }

    #[test]
    fn only_due_steps_fire() {
        let mut rig = Rig::default();
        let mut timeline: Timeline<PlaybackEvent> = Timeline::new();
        let mut playback = PlaybackScheduler::new(secs(2));
        playback.play(&[0, 1, 2], Duration::ZERO, &mut timeline).unwrap();

        drain(&mut playback, &mut timeline, &mut rig, secs(3));
        assert_eq!(rig.sound.tones, vec![0, 1]);
        assert!(playback.is_playing());
        assert_eq!(timeline.next_due(), Some(secs(4)));
    }

    #[test]
    fn second_play_while_pending_is_rejected() {
        let mut timeline: Timeline<PlaybackEvent> = Timeline::new();
        let mut playback = PlaybackScheduler::new(secs(2));
        playback.play(&[0], Duration::ZERO, &mut timeline).unwrap();
        assert_eq!(playback.play(&[1], Duration::ZERO, &mut timeline), Err(GameError::PlaybackBusy));
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn empty_sequence_is_invalid() {
        let mut timeline: Timeline<PlaybackEvent> = Timeline::new();
        let mut playback = PlaybackScheduler::new(secs(2));
        assert!(matches!(playback.play(&[], Duration::ZERO, &mut timeline), Err(GameError::InvalidArgument(_))));
        assert!(!playback.is_playing());
    }

    #[test]
    fn cancel_stops_further_steps() {
        let mut rig = Rig::default();
        let mut timeline: Timeline<PlaybackEvent> = Timeline::new();
        let mut playback = PlaybackScheduler::new(secs(2));
        playback.play(&[0, 1, 2], Duration::ZERO, &mut timeline).unwrap();
        drain(&mut playback, &mut timeline, &mut rig, Duration::ZERO);

        playback.cancel(&mut timeline);
        assert!(timeline.is_empty());
        assert_eq!(playback.step(1, secs(2), &mut timeline, &mut rig.ports()), None);
        assert_eq!(rig.sound.tones, vec![0]);

        playback.play(&[1], secs(5), &mut timeline).unwrap();
    }
}
