//! Stream slots
//!
//! A slot pairs one audio sink with the bookkeeping of what it plays. Each
//! channel owns two slots for its whole lifetime; they change roles (active
//! and displaced) but are never recreated, so the sink is never rebuilt on a
//! frequency change.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

use atc_core::{AudioSink, CandidateSet, Frequency, StreamCandidate, StreamStatus};

use crate::error::SwitchError;

/// A slot shared between the tick path and a start task
pub type SharedSlot = Arc<Mutex<StreamSlot>>;

/// One audio sink and the stream it carries
pub struct StreamSlot {
    /// Assigned frequency
    frequency: Option<Frequency>,
    /// Stream loaded into the sink
    candidate: Option<StreamCandidate>,
    /// Result of the last lookup for `frequency`
    candidates: CandidateSet,
    /// Until when the audio is still being delayed
    desync_until: Option<Instant>,
    sink: Option<Box<dyn AudioSink>>,
    /// Playing the standby frequency ahead of selection
    prebuffering: bool,
    /// Last volume sent to the sink
    volume: u8,
    /// Last mute state sent to the sink
    muted: bool,
}

impl std::fmt::Debug for StreamSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSlot")
            .field("frequency", &self.frequency)
            .field("candidate", &self.candidate.as_ref().map(|c| c.summary()))
            .field("desync_until", &self.desync_until)
            .field("has_sink", &self.sink.is_some())
            .field("prebuffering", &self.prebuffering)
            .field("volume", &self.volume)
            .field("muted", &self.muted)
            .finish()
    }
}

impl StreamSlot {
    /// Create a slot around a sink; without one it stays not initialized
    pub fn new(sink: Option<Box<dyn AudioSink>>) -> Self {
        Self {
            frequency: None,
            candidate: None,
            candidates: CandidateSet::new(),
            desync_until: None,
            sink,
            prebuffering: false,
            volume: 100,
            muted: false,
        }
    }

    pub fn shared(sink: Option<Box<dyn AudioSink>>) -> SharedSlot {
        Arc::new(Mutex::new(Self::new(sink)))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn frequency(&self) -> Option<Frequency> {
        self.frequency
    }

    pub fn candidate(&self) -> Option<&StreamCandidate> {
        self.candidate.as_ref()
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn candidates_mut(&mut self) -> &mut CandidateSet {
        &mut self.candidates
    }

    pub fn set_candidates(&mut self, candidates: CandidateSet) {
        self.candidates = candidates;
    }

    /// Has a sink to play on
    pub fn is_valid(&self) -> bool {
        self.sink.is_some()
    }

    /// Has a frequency assigned
    pub fn is_defined(&self) -> bool {
        self.frequency.is_some()
    }

    /// Has a stream loaded
    pub fn is_loaded(&self) -> bool {
        self.candidate.is_some()
    }

    pub fn is_prebuffering(&self) -> bool {
        self.prebuffering && self.is_defined()
    }

    pub fn set_prebuffering(&mut self, prebuffering: bool) {
        self.prebuffering = prebuffering;
    }

    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.is_playing())
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Status derived from the slot's fields
    ///
    /// Does not know about outstanding start tasks; the channel applies the
    /// searching override.
    pub fn status(&self) -> StreamStatus {
        let Some(sink) = &self.sink else {
            return StreamStatus::NotInitialized;
        };
        if self.frequency.is_none() {
            return StreamStatus::NoFrequency;
        }
        if self.candidate.is_none() {
            return StreamStatus::NotPlaying;
        }
        if self.is_desyncing() {
            return StreamStatus::Desyncing;
        }
        if !sink.is_playing() {
            return StreamStatus::Buffering;
        }
        if self.muted {
            StreamStatus::Muted
        } else {
            StreamStatus::Playing
        }
    }

    /// Short text for the user: stream (or frequency) and status
    pub fn summary(&self) -> String {
        let what = match (&self.candidate, self.frequency) {
            (Some(c), _) => c.summary(),
            (None, Some(f)) => f.to_string(),
            (None, None) => "-".to_string(),
        };
        format!("{} ({})", what, self.status())
    }

    // ========================================================================
    // Desync timer
    // ========================================================================

    /// Start (or restart) the desync countdown
    pub fn start_desync(&mut self, period: Duration) {
        self.desync_until = Some(Instant::now() + period);
    }

    pub fn clear_desync(&mut self) {
        self.desync_until = None;
    }

    pub fn desync_deadline(&self) -> Option<Instant> {
        self.desync_until
    }

    /// Is the audio still being delayed?
    pub fn is_desyncing(&self) -> bool {
        self.desync_until.is_some_and(|t| Instant::now() < t)
    }

    /// Whole seconds left in the desync countdown, rounded up
    pub fn secs_till_desync_done(&self) -> u64 {
        match self.desync_until {
            Some(t) => {
                let left = t.saturating_duration_since(Instant::now());
                left.as_secs() + u64::from(left.subsec_nanos() > 0)
            }
            None => 0,
        }
    }

    // ========================================================================
    // Sink control
    // ========================================================================

    /// Assign a frequency to an empty slot, forgetting any earlier lookup
    pub fn assign(&mut self, frequency: Option<Frequency>) {
        self.frequency = frequency;
        self.candidate = None;
        self.candidates = CandidateSet::new();
        self.desync_until = None;
        self.prebuffering = false;
    }

    /// Load a stream into the sink and re-apply volume and mute
    pub fn load(&mut self, candidate: StreamCandidate, url: &str) -> Result<(), SwitchError> {
        let sink = self.sink.as_mut().ok_or(SwitchError::NoSink)?;
        sink.load(url)?;
        sink.set_volume(self.volume);
        sink.set_mute(self.muted);
        self.candidate = Some(candidate);
        Ok(())
    }

    /// Start playback of the loaded stream
    pub fn play(&mut self) -> bool {
        self.sink.as_mut().is_some_and(|s| s.play())
    }

    pub fn set_audio_delay(&mut self, delay: Duration) {
        if let Some(sink) = self.sink.as_mut() {
            sink.set_audio_delay(delay);
        }
    }

    /// Send volume and mute to the sink if they differ from what it has
    pub fn set_output(&mut self, volume: u8, muted: bool) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if self.volume != volume {
            sink.set_volume(volume);
            self.volume = volume;
        }
        if self.muted != muted {
            sink.set_mute(muted);
            self.muted = muted;
        }
    }

    pub fn select_output_device(&mut self, device_id: &str) {
        if let Some(sink) = self.sink.as_mut() {
            sink.select_output_device(device_id);
        }
    }

    pub fn output_devices(&self) -> Option<Vec<atc_core::OutputDevice>> {
        self.sink.as_ref().map(|s| s.output_devices())
    }

    /// Stop the stream but keep the frequency
    ///
    /// The candidate and timer are dropped, the lookup result is kept so a
    /// later maintenance pass can pick a stream again without a new lookup.
    pub fn unload(&mut self) {
        if let Some(c) = &self.candidate {
            debug!("Unloading '{}'", c.summary());
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.stop();
        }
        self.candidate = None;
        self.desync_until = None;
    }

    /// Stop the stream and reset the slot to empty
    pub fn stop_and_clear(&mut self) {
        if let Some(f) = self.frequency {
            debug!(
                "Stopping '{}' on {}",
                self.candidate
                    .as_ref()
                    .map(|c| c.summary())
                    .unwrap_or_default(),
                f
            );
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.stop();
        }
        self.assign(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atc_sim::{SinkCommand, VirtualSink};

    fn ksfo() -> StreamCandidate {
        StreamCandidate::new("KSFO", "KSFO Tower", "http://d.liveatc.net/ksfo_twr", 1)
    }

    #[test]
    fn test_status_progression() {
        let (sink, probe) = VirtualSink::boxed("A");
        let mut slot = StreamSlot::new(Some(sink));
        assert_eq!(slot.status(), StreamStatus::NoFrequency);

        slot.assign(Some(Frequency::from_khz(120_500)));
        assert_eq!(slot.status(), StreamStatus::NotPlaying);

        probe.set_startup_polls(1);
        slot.load(ksfo(), "http://d.liveatc.net/ksfo_twr").unwrap();
        assert!(slot.play());
        assert_eq!(slot.status(), StreamStatus::Buffering);
        assert_eq!(slot.status(), StreamStatus::Playing);

        slot.set_output(100, true);
        assert_eq!(slot.status(), StreamStatus::Muted);
    }

    #[test]
    fn test_no_sink_is_not_initialized() {
        let mut slot = StreamSlot::new(None);
        slot.assign(Some(Frequency::from_khz(120_500)));
        assert_eq!(slot.status(), StreamStatus::NotInitialized);
        assert!(matches!(slot.load(ksfo(), "http://x"), Err(SwitchError::NoSink)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_desync_window() {
        let (sink, _probe) = VirtualSink::boxed("A");
        let mut slot = StreamSlot::new(Some(sink));
        slot.assign(Some(Frequency::from_khz(120_500)));
        slot.load(ksfo(), "http://x").unwrap();
        slot.play();
        slot.start_desync(Duration::from_secs(10));

        for _ in 0..10 {
            assert!(slot.is_desyncing());
            assert_eq!(slot.status(), StreamStatus::Desyncing);
            tokio::time::advance(Duration::from_secs(1)).await;
        }
        assert!(!slot.is_desyncing());
        assert_eq!(slot.status(), StreamStatus::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_secs_till_desync_done_rounds_up() {
        let mut slot = StreamSlot::new(None);
        slot.start_desync(Duration::from_millis(2500));
        assert_eq!(slot.secs_till_desync_done(), 3);
        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(slot.secs_till_desync_done(), 2);
        slot.clear_desync();
        assert_eq!(slot.secs_till_desync_done(), 0);
    }

    #[test]
    fn test_unload_keeps_frequency() {
        let (sink, probe) = VirtualSink::boxed("A");
        let mut slot = StreamSlot::new(Some(sink));
        slot.assign(Some(Frequency::from_khz(120_500)));
        slot.set_candidates([ksfo()].into_iter().collect());
        slot.load(ksfo(), "http://x").unwrap();
        slot.play();
        slot.start_desync(Duration::from_secs(30));

        slot.unload();
        assert_eq!(slot.frequency(), Some(Frequency::from_khz(120_500)));
        assert!(slot.candidate().is_none());
        assert!(slot.desync_deadline().is_none());
        assert_eq!(slot.candidates().len(), 1);
        assert!(!probe.is_playing());

        slot.stop_and_clear();
        assert_eq!(slot.frequency(), None);
        assert!(slot.candidates().is_empty());
        assert_eq!(probe.count(|c| *c == SinkCommand::Stop), 2);
    }

    #[test]
    fn test_set_output_only_sends_changes() {
        let (sink, probe) = VirtualSink::boxed("A");
        let mut slot = StreamSlot::new(Some(sink));
        slot.set_output(100, false);
        assert!(probe.commands().is_empty());

        slot.set_output(60, false);
        slot.set_output(60, true);
        slot.set_output(60, true);
        assert_eq!(
            probe.commands(),
            vec![SinkCommand::SetVolume(60), SinkCommand::SetMute(true)]
        );
    }
}
