//! Channel state machine
//!
//! One [`Channel`] follows one COM radio. It owns two stream slots that swap
//! roles: the *active* slot plays the tuned frequency, the *displaced* slot
//! either fades out the previous frequency or pre-buffers the standby one.
//!
//! # Tick sequence
//!
//! [`Channel::on_tick`] runs once per second and, in order:
//!
//! 1. stops the displaced stream once the active one is past its desync wait
//! 2. detects a change of the tuned frequency and either hands off to the
//!    pre-buffered standby stream or moves the active stream aside and starts
//!    a lookup for the new frequency
//! 3. otherwise refreshes volume and mute
//! 4. every Nth tick checks reception distance, re-targets to closer streams
//!    and considers pre-buffering the standby frequency
//!
//! # Single flight
//!
//! At most one start task runs per channel. Before a new one is spawned, or
//! before slots are swapped, the running task is cancelled and awaited.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use atc_core::{AudioSink, Cockpit, Frequency, GeoPosition, StreamCandidate, StreamStatus};
use atc_directory::{select_closest, within_reach};

use crate::config::SwitchConfig;
use crate::context::SwitchContext;
use crate::events::SwitchEvent;
use crate::scheduler::TickScheduler;
use crate::slot::{SharedSlot, StreamSlot};
use crate::start::{run_start_job, StartJob};

/// Readings of one radio for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Tuned (active) frequency
    pub tuned: Option<Frequency>,
    /// Standby frequency
    pub standby: Option<Frequency>,
    /// Selected for listening on the audio panel
    pub audio_selected: bool,
}

impl TickInput {
    /// Read a radio from the cockpit
    pub fn from_cockpit(cockpit: &dyn Cockpit, channel: usize) -> Self {
        Self {
            tuned: Frequency::from_reading(cockpit.tuned_frequency(channel)),
            standby: Frequency::from_reading(cockpit.standby_frequency(channel)),
            audio_selected: cockpit.is_audio_selected(channel),
        }
    }
}

/// An outstanding start task
struct StartTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    /// Index of the slot the task works on
    slot: usize,
}

/// What distance maintenance decided for a slot
enum ReachAction {
    Keep,
    Evict(String),
    Retarget { from: String, to: StreamCandidate },
    Start(StreamCandidate),
}

/// State machine for one COM radio
pub struct Channel {
    index: usize,
    slots: [SharedSlot; 2],
    /// Index of the active slot; the other one is displaced
    active: usize,
    task: Option<StartTask>,
    /// Frequency that must not be pre-buffered: the one last moved out of
    /// the active slot, or the standby reading seen on the first tick
    vacated: Option<Frequency>,
    /// Standby reading at the previous maintenance evaluation
    last_standby: Option<Frequency>,
    started: bool,
    maintenance: TickScheduler,
    ctx: SwitchContext,
}

impl Channel {
    /// Create a channel; without sinks it stays not initialized
    pub fn new(index: usize, sinks: Option<[Box<dyn AudioSink>; 2]>, ctx: SwitchContext) -> Self {
        let (a, b) = match sinks {
            Some([a, b]) => (Some(a), Some(b)),
            None => (None, None),
        };
        let maintenance = TickScheduler::new(ctx.config.read().maintenance_every_ticks);
        Self {
            index,
            slots: [StreamSlot::shared(a), StreamSlot::shared(b)],
            active: 0,
            task: None,
            vacated: None,
            last_standby: None,
            started: false,
            maintenance,
            ctx,
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Zero-based radio index (0 = COM1)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Both slots have a sink
    pub fn is_valid(&self) -> bool {
        self.slots.iter().all(|s| s.lock().is_valid())
    }

    /// Slot playing the tuned frequency
    pub fn active_slot(&self) -> &SharedSlot {
        &self.slots[self.active]
    }

    /// Slot fading out the previous frequency or pre-buffering the standby one
    pub fn displaced_slot(&self) -> &SharedSlot {
        &self.slots[self.active ^ 1]
    }

    /// Frequency of the active slot
    pub fn frequency(&self) -> Option<Frequency> {
        self.active_slot().lock().frequency()
    }

    /// Frequency currently excluded from pre-buffering
    pub fn vacated_frequency(&self) -> Option<Frequency> {
        self.vacated
    }

    /// Is a start task outstanding?
    pub fn is_task_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.handle.is_finished())
    }

    fn task_targets(&self, slot: usize) -> bool {
        self.task
            .as_ref()
            .is_some_and(|t| t.slot == slot && !t.handle.is_finished())
    }

    /// Effective status of the active slot, searching while a start task
    /// has not loaded anything yet
    pub fn status(&self) -> StreamStatus {
        let status = self.active_slot().lock().status();
        if status == StreamStatus::NotPlaying && self.task_targets(self.active) {
            StreamStatus::Searching
        } else {
            status
        }
    }

    /// Does either slot hold a frequency, or is a task running?
    pub fn is_defined(&self) -> bool {
        self.is_task_running() || self.slots.iter().any(|s| s.lock().is_defined())
    }

    /// Is the active slot playing an ATIS stream?
    pub fn is_playing_atis(&self) -> bool {
        let slot = self.active_slot().lock();
        slot.candidate().is_some_and(|c| c.is_atis()) && slot.status().is_loaded()
    }

    /// Active slot summary, with the searching override applied
    pub fn summary(&self) -> String {
        let slot = self.active_slot().lock();
        let what = match (slot.candidate(), slot.frequency()) {
            (Some(c), _) => c.summary(),
            (None, Some(f)) => f.to_string(),
            (None, None) => "-".to_string(),
        };
        drop(slot);
        format!("{} ({})", what, self.status())
    }

    /// Displaced slot summary, if it holds anything
    pub fn displaced_summary(&self) -> Option<String> {
        let slot = self.displaced_slot().lock();
        slot.is_defined().then(|| slot.summary())
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Per-second maintenance
    pub async fn on_tick(&mut self, input: TickInput) {
        if !self.is_valid() {
            return;
        }

        let config = self.ctx.config();
        self.maintenance.set_every(config.maintenance_every_ticks);
        let desync = config.desync_period(self.ctx.cockpit.feed_buffer_period());
        let muted = self
            .ctx
            .audio
            .should_mute(input.audio_selected, config.respect_audio_select);

        if !self.started {
            self.started = true;
            self.vacated = input.standby;
            self.last_standby = input.standby;
        }

        // 1. previous stream done fading out?
        self.stop_displaced_when_done();

        // 2. frequency change
        if input.tuned != self.frequency() {
            if !self.try_hand_off(input.tuned, &config, muted).await {
                self.change_frequency(input.tuned, desync, &config, muted)
                    .await;
            }
            return;
        }

        // 3. volume and mute
        self.apply_output(muted);
        self.announce_countdown();

        // 4. throttled distance and pre-buffer maintenance
        if self.maintenance.tick() {
            self.maintain(input.standby, desync, &config).await;
        }
    }

    /// Stop everything and reset both slots
    pub async fn clear(&mut self) {
        self.abort_task().await;
        for idx in [self.active ^ 1, self.active] {
            self.stop_slot(idx);
        }
    }

    /// Wait for an outstanding start task to finish on its own
    pub async fn settle(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.handle.await {
                error!("COM{}: stream start task failed: {}", self.index + 1, e);
            }
        }
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Apply global volume and the given mute state; a pre-buffering slot
    /// always stays muted
    pub fn apply_output(&self, muted: bool) {
        let volume = self.ctx.audio.volume();
        self.active_slot().lock().set_output(volume, muted);
        let mut displaced = self.displaced_slot().lock();
        let displaced_muted = muted || displaced.is_prebuffering();
        displaced.set_output(volume, displaced_muted);
    }

    /// Route both sinks to an output device
    pub fn select_output_device(&self, device_id: &str) {
        for slot in &self.slots {
            slot.lock().select_output_device(device_id);
        }
    }

    /// Output devices reported by this channel's first sink
    pub fn output_devices(&self) -> Option<Vec<atc_core::OutputDevice>> {
        self.slots[0].lock().output_devices()
    }

    // ========================================================================
    // Steps
    // ========================================================================

    fn stop_displaced_when_done(&mut self) {
        let active_desyncing = self.active_slot().lock().is_desyncing();
        let fading = {
            let slot = self.displaced_slot().lock();
            slot.is_defined() && !slot.is_prebuffering()
        };
        if fading && !active_desyncing {
            self.stop_slot(self.active ^ 1);
        }
    }

    /// Switch to the pre-buffered standby stream if it is ready
    async fn try_hand_off(
        &mut self,
        tuned: Option<Frequency>,
        config: &SwitchConfig,
        muted: bool,
    ) -> bool {
        let Some(frequency) = tuned else {
            return false;
        };
        let displaced = self.active ^ 1;
        let ready = {
            let slot = self.slots[displaced].lock();
            slot.is_prebuffering()
                && slot.frequency() == Some(frequency)
                && slot.status() >= StreamStatus::Buffering
                && !slot.is_desyncing()
        };
        if !ready || self.task_targets(displaced) {
            return false;
        }

        // Read before aborting: a cancelled lookup clears its slot
        let vacated = self.frequency();
        self.abort_task().await;
        self.active = displaced;

        let stream = {
            let mut slot = self.active_slot().lock();
            slot.set_prebuffering(false);
            slot.clear_desync();
            slot.candidate().map(|c| (c.summary(), c.is_atis()))
        };
        // The new stream is audible right away, no need to keep the old one
        self.stop_slot(self.active ^ 1);
        self.apply_output(muted);
        if vacated.is_some() {
            self.vacated = vacated;
        }

        let (stream, is_atis) = stream.unwrap_or_default();
        if is_atis && config.prefer_directory_atis {
            self.ctx.disable_host_atis();
        }
        self.ctx.emit(SwitchEvent::HandOff {
            channel: self.index,
            frequency,
            stream,
        });
        true
    }

    /// Move the active stream aside and start the new frequency
    async fn change_frequency(
        &mut self,
        tuned: Option<Frequency>,
        desync: Duration,
        config: &SwitchConfig,
        muted: bool,
    ) {
        let outgoing = self.frequency();
        self.abort_task().await;

        self.turn_active_to_displaced();
        if outgoing.is_some() {
            self.vacated = outgoing;
        }

        {
            let mut slot = self.active_slot().lock();
            slot.assign(tuned);
            slot.set_output(self.ctx.audio.volume(), muted);
            if tuned.is_some() && !desync.is_zero() {
                slot.start_desync(desync + config.countdown_pad());
            }
        }

        let keep_previous =
            tuned.is_some() && !desync.is_zero() && config.continue_previous_while_desync;
        if !keep_previous {
            self.stop_slot(self.active ^ 1);
        }

        match tuned {
            Some(frequency) => {
                debug!("COM{}: frequency now {}", self.index + 1, frequency);
                self.start_async(self.active, frequency, None, false, desync)
                    .await;
            }
            None => debug!("COM{}: no frequency", self.index + 1),
        }
    }

    /// Swap roles, stopping whatever the displaced slot held first
    fn turn_active_to_displaced(&mut self) {
        self.stop_slot(self.active ^ 1);
        self.active ^= 1;
    }

    fn announce_countdown(&self) {
        let countdown = {
            let slot = self.active_slot().lock();
            match slot.candidate() {
                Some(c) if slot.is_desyncing() => {
                    Some((c.summary(), slot.secs_till_desync_done()))
                }
                _ => None,
            }
        };
        if let Some((stream, secs)) = countdown {
            self.ctx.emit(SwitchEvent::Countdown {
                channel: self.index,
                stream,
                secs,
            });
        }
    }

    async fn maintain(
        &mut self,
        standby: Option<Frequency>,
        desync: Duration,
        config: &SwitchConfig,
    ) {
        if let Some(listener) = self.ctx.positions.listener_position() {
            for prebuffer in [false, true] {
                if self.is_task_running() {
                    break;
                }
                self.check_reach(prebuffer, &listener, desync, config).await;
            }
        }
        self.consider_prebuffer(standby, desync, config).await;
    }

    /// Evict out-of-reach streams, re-target to closer ones, and pick up a
    /// stream for a frequency that has none playing
    async fn check_reach(
        &mut self,
        prebuffer: bool,
        listener: &GeoPosition,
        desync: Duration,
        config: &SwitchConfig,
    ) {
        let idx = if prebuffer { self.active ^ 1 } else { self.active };
        let max = config.max_radio_distance_nm;

        let (frequency, action) = {
            let mut slot = self.slots[idx].lock();
            if prebuffer && !slot.is_prebuffering() {
                return;
            }
            let Some(frequency) = slot.frequency() else {
                return;
            };
            let current = slot.candidate().cloned();
            let closest = select_closest(
                slot.candidates_mut(),
                listener,
                max,
                &*self.ctx.positions,
            );
            let action = match (current, closest) {
                (Some(c), _) if !within_reach(&c, listener, max) => ReachAction::Evict(c.summary()),
                (Some(c), Some(best)) if best.origin != c.origin => ReachAction::Retarget {
                    from: c.summary(),
                    to: best,
                },
                (Some(_), _) => ReachAction::Keep,
                (None, Some(best)) => ReachAction::Start(best),
                (None, None) => ReachAction::Keep,
            };
            if let ReachAction::Evict(_) = action {
                slot.unload();
            }
            (frequency, action)
        };

        let candidate = match action {
            ReachAction::Keep => return,
            ReachAction::Evict(stream) => {
                self.ctx.emit(SwitchEvent::OutOfReach {
                    channel: self.index,
                    stream,
                    standby: prebuffer,
                });
                return;
            }
            ReachAction::Retarget { from, to } => {
                self.ctx.emit(SwitchEvent::Retargeted {
                    channel: self.index,
                    frequency,
                    from,
                    to: to.summary(),
                    standby: prebuffer,
                });
                to
            }
            ReachAction::Start(candidate) => candidate,
        };

        {
            let mut slot = self.slots[idx].lock();
            slot.unload();
            if !desync.is_zero() {
                slot.start_desync(desync + config.countdown_pad());
            }
        }
        self.start_async(idx, frequency, Some(candidate), prebuffer, desync)
            .await;
    }

    /// Start pre-buffering the standby frequency once it is stable
    async fn consider_prebuffer(
        &mut self,
        standby: Option<Frequency>,
        desync: Duration,
        config: &SwitchConfig,
    ) {
        let previous = std::mem::replace(&mut self.last_standby, standby);
        let stable = previous == standby;
        let displaced = self.active ^ 1;
        let enabled = config.prebuffer_standby && !desync.is_zero();

        // Drop a pre-buffered stream the standby knob has moved away from
        let stale = {
            let slot = self.slots[displaced].lock();
            slot.is_prebuffering() && (!enabled || (stable && slot.frequency() != standby))
        };
        if stale {
            if self.task_targets(displaced) {
                self.abort_task().await;
            }
            self.stop_slot(displaced);
        }

        if !enabled || !stable {
            return;
        }
        let Some(frequency) = standby else {
            return;
        };
        if self.vacated == Some(frequency) || self.frequency() == Some(frequency) {
            return;
        }
        if self.is_task_running() {
            return;
        }

        {
            let mut slot = self.slots[displaced].lock();
            if slot.is_defined() {
                // Already pre-buffering it, or still fading out the previous stream
                return;
            }
            slot.assign(Some(frequency));
            slot.set_prebuffering(true);
            slot.set_output(self.ctx.audio.volume(), true);
            slot.start_desync(desync + config.countdown_pad());
        }
        debug!(
            "COM{}: pre-buffering stand-by frequency {}",
            self.index + 1,
            frequency
        );
        self.start_async(displaced, frequency, None, true, desync)
            .await;
    }

    // ========================================================================
    // Task and slot plumbing
    // ========================================================================

    /// Cancel the outstanding start task and wait for it to finish
    async fn abort_task(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        if !task.handle.is_finished() {
            debug!("COM{}: aborting running stream start", self.index + 1);
        }
        task.cancel.cancel();
        if let Err(e) = task.handle.await {
            error!("COM{}: stream start task failed: {}", self.index + 1, e);
        }
    }

    /// Spawn a start task for a slot, replacing any running one
    async fn start_async(
        &mut self,
        slot: usize,
        frequency: Frequency,
        candidate: Option<StreamCandidate>,
        prebuffer: bool,
        desync: Duration,
    ) {
        self.abort_task().await;

        let job = StartJob {
            channel: self.index,
            slot: Arc::clone(&self.slots[slot]),
            frequency,
            candidate,
            prebuffer,
            desync,
            ctx: self.ctx.clone(),
        };
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_start_job(job, cancel.clone()));
        self.task = Some(StartTask {
            cancel,
            handle,
            slot,
        });
    }

    /// Stop and reset one slot, announcing it if it held a frequency
    fn stop_slot(&self, idx: usize) {
        let stopped = {
            let mut slot = self.slots[idx].lock();
            let stopped = slot
                .frequency()
                .map(|f| (f, slot.candidate().map(|c| c.summary())));
            slot.stop_and_clear();
            stopped
        };
        if let Some((frequency, stream)) = stopped {
            self.ctx.emit(SwitchEvent::StreamStopped {
                channel: self.index,
                frequency,
                stream,
            });
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("index", &self.index)
            .field("active", &*self.active_slot().lock())
            .field("displaced", &*self.displaced_slot().lock())
            .field("task_running", &self.is_task_running())
            .field("vacated", &self.vacated)
            .finish()
    }
}
