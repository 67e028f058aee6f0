//! Resolve-and-play task
//!
//! Starting a stream takes several network round trips and a short wait for
//! the audio engine, so it runs as a background task. The task owns nothing
//! but a handle to its target slot; the channel holds the task's cancellation
//! token and join handle.
//!
//! Cancellation is cooperative: the whole start sequence runs inside a
//! `select!` against the token, so it stops at the next await point, and the
//! target slot is then reset to empty.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use atc_core::{Frequency, StreamCandidate};
use atc_directory::{select_closest, ResolveError};

use crate::context::SwitchContext;
use crate::error::SwitchError;
use crate::events::SwitchEvent;
use crate::slot::SharedSlot;

/// Everything a start task needs
pub(crate) struct StartJob {
    pub channel: usize,
    pub slot: SharedSlot,
    pub frequency: Frequency,
    /// Stream to play; `None` looks the frequency up first
    pub candidate: Option<StreamCandidate>,
    /// Pre-buffering the standby frequency rather than starting the active one
    pub prebuffer: bool,
    pub desync: Duration,
    pub ctx: SwitchContext,
}

/// Task entry point
pub(crate) async fn run_start_job(job: StartJob, cancel: CancellationToken) {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SwitchError::Resolve(ResolveError::Cancelled)),
        r = start_stream(&job) => r,
    };

    if let Err(e) = result {
        job.fail(e);
    }
}

fn is_playing(slot: &SharedSlot) -> bool {
    slot.lock().is_playing()
}

/// Look up, pick, load and play a stream, then apply the desync delay
async fn start_stream(job: &StartJob) -> Result<(), SwitchError> {
    let config = job.ctx.config();

    let candidate = match &job.candidate {
        Some(c) => c.clone(),
        None => {
            let found = job.ctx.resolver.resolve(job.frequency).await?;
            match job.pick_closest(found, config.max_radio_distance_nm) {
                Some(c) => c,
                None => {
                    job.slot.lock().clear_desync();
                    job.ctx.emit(SwitchEvent::NoCandidateInRange {
                        channel: job.channel,
                        frequency: job.frequency,
                    });
                    return Ok(());
                }
            }
        }
    };

    if candidate.is_atis() {
        if !config.prefer_directory_atis {
            {
                let mut slot = job.slot.lock();
                slot.candidates_mut().remove(&candidate.origin);
                slot.unload();
            }
            job.ctx.emit(SwitchEvent::AtisSuppressed {
                channel: job.channel,
                frequency: job.frequency,
                stream: candidate.summary(),
            });
            return Ok(());
        }
    }

    job.announce(&candidate);

    // Most directory links are playlists; follow them to the actual stream
    let url = match job.ctx.resolver.follow_playlist(&candidate.url).await? {
        Some(url) => url,
        None => candidate.url.clone(),
    };

    {
        let mut slot = job.slot.lock();
        let is_atis = candidate.is_atis();
        if let Err(e) = slot.load(candidate, &url) {
            warn!("COM{}: {}", job.channel + 1, e);
            return Err(SwitchError::PlaybackStart { url });
        }
        if is_atis && !job.prebuffer {
            job.ctx.disable_host_atis();
        }
        if !slot.play() {
            return Err(SwitchError::PlaybackStart { url });
        }
    }

    // Wait for real playback so the desync timer starts from actual audio
    let settle_until = Instant::now() + config.playback_settle_timeout();
    while !is_playing(&job.slot) && Instant::now() < settle_until {
        sleep(config.playback_settle_poll()).await;
    }

    if !job.desync.is_zero() {
        let mut slot = job.slot.lock();
        slot.set_audio_delay(job.desync);
        slot.start_desync(job.desync);
    }
    debug!("COM{}: started {}", job.channel + 1, url);
    Ok(())
}

impl StartJob {
    /// Store the lookup result on the slot and pick the closest stream
    fn pick_closest(
        &self,
        found: atc_core::CandidateSet,
        max_distance_nm: f64,
    ) -> Option<StreamCandidate> {
        let listener = self.ctx.positions.listener_position();
        let mut slot = self.slot.lock();
        slot.set_candidates(found);
        let listener = listener?;
        select_closest(
            slot.candidates_mut(),
            &listener,
            max_distance_nm,
            &*self.ctx.positions,
        )
    }

    fn announce(&self, candidate: &StreamCandidate) {
        let stream = candidate.summary();
        let delay_s = self.desync.as_secs();
        let event = if self.prebuffer {
            SwitchEvent::StandbyPrebuffering {
                channel: self.channel,
                frequency: self.frequency,
                stream,
                delay_s,
            }
        } else {
            SwitchEvent::Tuning {
                channel: self.channel,
                frequency: self.frequency,
                stream,
                delay_s,
            }
        };
        self.ctx.emit(event);
    }

    /// Leave the slot in a consistent state after a failed start
    fn fail(&self, error: SwitchError) {
        match error {
            e if e.is_cancelled() => {
                debug!(
                    "COM{}: start of {} cancelled",
                    self.channel + 1,
                    self.frequency
                );
                self.slot.lock().stop_and_clear();
            }
            SwitchError::PlaybackStart { url } => {
                // Keep the stream loaded so the next change can retry
                self.slot.lock().clear_desync();
                self.ctx.emit(SwitchEvent::PlaybackFailed {
                    channel: self.channel,
                    url,
                });
            }
            e => {
                // Keep the frequency so the next tick does not see a change
                self.slot.lock().unload();
                self.ctx.emit(SwitchEvent::ResolveFailed {
                    channel: self.channel,
                    frequency: self.frequency,
                    message: e.to_string(),
                });
            }
        }
    }
}
