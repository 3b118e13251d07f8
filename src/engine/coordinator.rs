//! Realtime scheduling coordinator
//!
//! [`SetCoordinator`] owns the execution state of one set and every piece of
//! deferred work belonging to it:
//!
//! - one delivery per cue, due when active time reaches the cue's offset
//! - a poll tick every `poll_interval_ms` that refreshes rep/phase/elapsed
//! - a single delayed finish once the set's active time has run out
//!
//! The coordinator is a plain single-threaded value. It does not sleep or
//! spawn anything; whoever owns it calls [`SetCoordinator::run_due`] when
//! [`SetCoordinator::next_deadline`] arrives. [`WorkoutSession`] does that on
//! a dedicated thread, tests do it with a [`ManualClock`].
//!
//! Every operation is defined in every state. Invalid input, re-entrant
//! starts, skipping past the last rep and stale timers all resolve to a no-op
//! or a regular state transition.
//!
//! [`WorkoutSession`]: crate::engine::session::WorkoutSession
//! [`ManualClock`]: crate::engine::clock::ManualClock

use crate::engine::clock::Clock;
use crate::engine::observer::{ObserverRegistry, Subscription};
use crate::engine::playback::CuePlayer;
use crate::engine::timer::{TimerId, TimerQueue};
use repcue_core::{
    build_cue_timeline, Baseline, Cue, CueScript, ExecutionState, Phase, SetConfig, SetupError,
    TempoPhases,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub const DEFAULT_COMPLETION_GRACE_MS: u64 = 1000;

/// Timing knobs for a coordinator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// How often rep/phase/elapsed are recomputed while running
    pub poll_interval_ms: u64,
    /// Delay between running out of active time and tearing the set down,
    /// so the closing cue can finish
    pub completion_grace_ms: u64,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            completion_grace_ms: DEFAULT_COMPLETION_GRACE_MS,
        }
    }
}

/// Deferred work, tagged with the run it belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerAction {
    DeliverCue { run: u64, index: usize },
    Poll { run: u64 },
    FinishSet { run: u64 },
}

struct ActiveSet {
    run: u64,
    config: SetConfig,
    phases: TempoPhases,
    baseline: Baseline,
}

/// Owner of one set's execution state and scheduled cue deliveries
pub struct SetCoordinator<C, P> {
    clock: C,
    player: P,
    options: CoordinatorOptions,
    state: ExecutionState,
    active: Option<ActiveSet>,
    timers: TimerQueue<TimerAction>,
    /// Cancellation tokens of pending cue deliveries, with the cue index
    cue_timers: Vec<(TimerId, usize)>,
    poll_timer: Option<TimerId>,
    finish_timer: Option<TimerId>,
    observers: ObserverRegistry,
    runs_started: u64,
}

impl<C: Clock, P: CuePlayer> SetCoordinator<C, P> {
    pub fn new(clock: C, player: P) -> Self {
        Self::with_options(clock, player, CoordinatorOptions::default())
    }

    pub fn with_options(clock: C, player: P, options: CoordinatorOptions) -> Self {
        Self {
            clock,
            player,
            options,
            state: ExecutionState::idle(0),
            active: None,
            timers: TimerQueue::new(),
            cue_timers: Vec::new(),
            poll_timer: None,
            finish_timer: None,
            observers: ObserverRegistry::new(),
            runs_started: 0,
        }
    }

    /// Start a set, stopping any set already in progress.
    ///
    /// An invalid config is logged and returned; no state changes beyond the
    /// implicit stop of a previous set.
    pub fn start_set(&mut self, config: SetConfig) -> Result<(), SetupError> {
        if self.state.is_active {
            info!("Set already in progress, stopping it before starting a new one");
            self.stop_set();
        }

        let phases = config.phases().map_err(|e| {
            warn!(tempo = %config.tempo, reps = config.target_reps, "Refusing to start set: {}", e);
            e
        })?;

        let timeline: Arc<[Cue]> = build_cue_timeline(&config, &phases).into();
        let total_seconds = phases.rep_duration() * config.target_reps;
        let now = self.clock.now_ms();
        self.runs_started += 1;
        let run = self.runs_started;

        info!(
            run,
            tempo = %phases,
            reps = config.target_reps,
            exercise = %config.exercise_name,
            total_seconds,
            cues = timeline.len(),
            "Set started"
        );

        self.state = ExecutionState::started(total_seconds, config.target_reps, timeline);
        self.active = Some(ActiveSet {
            run,
            config,
            phases,
            baseline: Baseline::start(now),
        });

        self.schedule_cues(now, |_| true);
        self.start_polling(now);
        self.notify();
        Ok(())
    }

    /// Freeze the set: pending deliveries and polling are cancelled, the cue
    /// list itself is kept. No-op unless running.
    pub fn pause_set(&mut self) {
        if !self.state.is_active || self.state.is_paused {
            return;
        }
        let now = self.clock.now_ms();
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.baseline.pause(now);
        self.state.is_paused = true;
        self.state.elapsed_seconds = active.baseline.elapsed_seconds(now);

        self.cancel_scheduled_work();
        self.player.pause();
        info!(elapsed = self.state.elapsed_seconds, "Set paused");
        self.notify();
    }

    /// Continue a paused set. The pause length is excluded from active time
    /// and every cue still ahead is scheduled again. No-op unless paused.
    pub fn resume_set(&mut self) {
        if !self.state.is_active || !self.state.is_paused {
            return;
        }
        let now = self.clock.now_ms();
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let paused_ms = active.baseline.resume(now).unwrap_or(0);
        self.state.is_paused = false;
        self.player.resume();

        let elapsed = self.state.elapsed_seconds;
        self.schedule_cues(now, |cue| cue.trigger_at_seconds as f64 > elapsed);
        self.start_polling(now);
        info!(paused_ms, elapsed, "Set resumed");
        self.notify();
    }

    /// Tear the set down and go idle, keeping the completed rep tally.
    /// No-op when already idle.
    pub fn stop_set(&mut self) {
        if !self.state.is_active {
            return;
        }
        self.cue_timers.clear();
        self.poll_timer = None;
        self.finish_timer = None;
        self.timers.cancel_all();
        self.player.stop();
        self.player.clear_queue();

        let completed_reps = self.state.completed_reps;
        let run = self.active.take().map(|a| a.run);
        self.state = ExecutionState::idle(completed_reps);
        info!(?run, completed_reps, "Set stopped");
        self.notify();
    }

    /// Jump to the start of the next rep. Skipping past the last rep finishes
    /// the set. No-op unless running and not paused.
    pub fn skip_to_next_rep(&mut self) {
        if !self.state.is_active || self.state.is_paused {
            return;
        }
        let next_rep = self.state.current_rep + 1;
        if next_rep > self.state.target_reps {
            debug!("Skip past the last rep, finishing the set");
            self.state.completed_reps = self.state.target_reps;
            self.stop_set();
            return;
        }
        let Some(rep_duration) = self.active.as_ref().map(|a| a.phases.rep_duration()) else {
            return;
        };
        let skip_to = (next_rep - 1) * rep_duration;

        self.cancel_scheduled_work();
        self.player.stop();

        let now = self.clock.now_ms();
        // Distance from the last polled elapsed time, which never runs ahead of
        // the live one. Cues the live time already passed stay dropped.
        let jump_ms = skip_to as i64 * 1000 - (self.state.elapsed_seconds * 1000.0).round() as i64;
        if let Some(active) = self.active.as_mut() {
            active.baseline.shift_by(jump_ms);
            debug!(jump_ms, "Baseline shifted");
        }
        self.state.elapsed_seconds = skip_to as f64;
        self.state.current_rep = next_rep;
        self.state.current_phase = Some(Phase::Eccentric);
        self.state.completed_reps = next_rep - 1;

        self.schedule_cues(now, |cue| cue.trigger_at_seconds >= skip_to);
        self.start_polling(now);
        info!(rep = next_rep, skip_to, "Skipped to next rep");
        self.notify();
    }

    /// Copy of the current state
    pub fn execution_state(&self) -> ExecutionState {
        self.state.clone()
    }

    /// Register an observer called after every state change
    pub fn on_state_change<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&ExecutionState) + Send + 'static,
    {
        self.observers.register(Box::new(observer))
    }

    /// Clock time at which the next piece of scheduled work is due
    pub fn next_deadline(&mut self) -> Option<u64> {
        self.timers.next_deadline()
    }

    /// Run every piece of scheduled work that is due. Returns how many fired.
    pub fn run_due(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut fired = 0;
        while let Some((id, due_ms, action)) = self.timers.pop_due(now) {
            fired += 1;
            match action {
                TimerAction::DeliverCue { run, index } => {
                    self.cue_timers.retain(|(t, _)| *t != id);
                    self.deliver_cue(run, index);
                }
                TimerAction::Poll { run } => {
                    self.poll_timer = None;
                    if !self.is_current(run) {
                        continue;
                    }
                    self.poll(now);
                    if self.is_current(run) {
                        let interval = self.options.poll_interval_ms;
                        let next = due_ms + interval;
                        let next = if next <= now { now + interval } else { next };
                        self.poll_timer = Some(self.timers.schedule(next, TimerAction::Poll { run }));
                    }
                }
                TimerAction::FinishSet { run } => {
                    self.finish_timer = None;
                    if self.is_current(run) {
                        info!("Set complete");
                        self.stop_set();
                    } else {
                        debug!(run, "Dropping stale completion");
                    }
                }
            }
        }
        fired
    }

    /// Offsets of cues whose delivery is currently scheduled
    pub fn pending_cue_offsets(&self) -> Vec<u32> {
        self.cue_timers
            .iter()
            .filter(|(id, _)| self.timers.is_pending(*id))
            .filter_map(|(_, index)| self.state.cue_timeline.get(*index))
            .map(|cue| cue.trigger_at_seconds)
            .collect()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn options(&self) -> CoordinatorOptions {
        self.options
    }

    fn is_current(&self, run: u64) -> bool {
        self.state.is_active
            && !self.state.is_paused
            && self.active.as_ref().map(|a| a.run) == Some(run)
    }

    fn deliver_cue(&mut self, run: u64, index: usize) {
        if !self.is_current(run) {
            debug!(run, index, "Dropping stale cue");
            return;
        }
        let Some(cue) = self.state.cue_timeline.get(index) else {
            return;
        };
        debug!(at = cue.trigger_at_seconds, text = %cue.text, "Delivering cue");
        let script = CueScript::from_cue(cue);
        self.player.enqueue(script);
    }

    fn poll(&mut self, now: u64) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let run = active.run;
        let target_reps = active.config.target_reps;
        let elapsed_ms = active.baseline.elapsed_ms(now).max(0) as u64;
        let rep_ms = active.phases.rep_duration() as u64 * 1000;

        let rep = (elapsed_ms / rep_ms + 1).min(target_reps as u64) as u32;
        let rep_start_ms = (rep as u64 - 1) * rep_ms;
        // Once time runs out the last rep holds its final phase
        let offset_ms = (elapsed_ms - rep_start_ms).min(rep_ms - 1);
        let position = active
            .phases
            .position_at(rep, target_reps, offset_ms as f64 / 1000.0);

        self.state.elapsed_seconds = elapsed_ms as f64 / 1000.0;
        self.state.current_rep = rep;
        if let Some(position) = position {
            self.state.current_phase = Some(position.phase);
        }
        self.state.completed_reps = self.state.completed_reps.max(rep - 1);

        if elapsed_ms >= self.state.total_duration_seconds as u64 * 1000 {
            self.state.completed_reps = target_reps;
            if self.finish_timer.is_none() {
                debug!(
                    grace_ms = self.options.completion_grace_ms,
                    "Active time used up, finishing after the closing cue"
                );
                let due = now + self.options.completion_grace_ms;
                self.finish_timer = Some(self.timers.schedule(due, TimerAction::FinishSet { run }));
            }
        }
        self.notify();
    }

    fn schedule_cues(&mut self, now: u64, keep: impl Fn(&Cue) -> bool) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let run = active.run;
        let baseline = active.baseline;
        let timeline = Arc::clone(&self.state.cue_timeline);

        let mut dropped = 0;
        for (index, cue) in timeline.iter().enumerate() {
            if !keep(cue) {
                continue;
            }
            // A cue whose moment already passed is skipped, never fired late
            match baseline.delay_until(now, cue.trigger_at_ms()) {
                Some(delay) => {
                    let id = self
                        .timers
                        .schedule(now + delay, TimerAction::DeliverCue { run, index });
                    self.cue_timers.push((id, index));
                }
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "Cues already behind the baseline were not scheduled");
        }
    }

    fn start_polling(&mut self, now: u64) {
        if let Some(run) = self.active.as_ref().map(|a| a.run) {
            let due = now + self.options.poll_interval_ms;
            self.poll_timer = Some(self.timers.schedule(due, TimerAction::Poll { run }));
        }
    }

    fn cancel_scheduled_work(&mut self) {
        for (id, _) in self.cue_timers.drain(..) {
            self.timers.cancel(id);
        }
        if let Some(id) = self.poll_timer.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.finish_timer.take() {
            self.timers.cancel(id);
        }
        debug_assert!(self.timers.is_empty());
    }

    fn notify(&self) {
        self.observers.notify(&self.state);
    }
}
