//! End-to-end scenarios for the set coordinator, driven by a manual clock

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use repcue::engine::{Clock, CuePlayer, ManualClock, PlayerCall, RecordingPlayer, SetCoordinator};
use repcue::{ExecutionState, Phase, SetConfig};
use repcue_core::CueScript;
use std::sync::{Arc, Mutex};

/// Player that remembers when each script arrived
#[derive(Clone)]
struct TimedPlayer {
    clock: ManualClock,
    spoken: Arc<Mutex<Vec<(u64, String)>>>,
    inner: RecordingPlayer,
}

impl TimedPlayer {
    fn new(clock: &ManualClock) -> Self {
        Self {
            clock: clock.clone(),
            spoken: Arc::new(Mutex::new(Vec::new())),
            inner: RecordingPlayer::new(),
        }
    }

    fn spoken(&self) -> Vec<(u64, String)> {
        self.spoken.lock().unwrap().clone()
    }

    fn texts(&self) -> Vec<String> {
        self.spoken().into_iter().map(|(_, text)| text).collect()
    }
}

impl CuePlayer for TimedPlayer {
    fn enqueue(&mut self, script: CueScript) {
        self.spoken
            .lock()
            .unwrap()
            .push((self.clock.now_ms(), script.text()));
        self.inner.enqueue(script);
    }

    fn pause(&mut self) {
        self.inner.pause();
    }

    fn resume(&mut self) {
        self.inner.resume();
    }

    fn stop(&mut self) {
        self.inner.stop();
    }

    fn clear_queue(&mut self) {
        self.inner.clear_queue();
    }
}

type Coordinator = SetCoordinator<ManualClock, TimedPlayer>;

fn setup() -> (Coordinator, ManualClock, TimedPlayer) {
    let clock = ManualClock::new(0);
    let player = TimedPlayer::new(&clock);
    let coordinator = SetCoordinator::new(clock.clone(), player.clone());
    (coordinator, clock, player)
}

/// Step the clock in 10ms increments, running due work after each step
fn drive(coordinator: &mut Coordinator, clock: &ManualClock, ms: u64) {
    for _ in 0..ms / 10 {
        clock.advance(10);
        coordinator.run_due();
    }
}

/// Every snapshot the coordinator publishes, with the clock time
fn record_states(coordinator: &Coordinator, clock: &ManualClock) -> Arc<Mutex<Vec<(u64, ExecutionState)>>> {
    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = states.clone();
    let clock = clock.clone();
    coordinator.on_state_change(move |state| {
        sink.lock().unwrap().push((clock.now_ms(), state.clone()));
    });
    states
}

const SQUAT_CUES: [&str; 14] = [
    "Starting squat",
    "3",
    "2",
    "1",
    "Hold",
    "Up",
    "Rep 2",
    "3",
    "2",
    "1",
    "Hold",
    "Up",
    "Last one, push!",
    "Set complete",
];

#[test]
fn test_full_set_speaks_every_cue_on_time() {
    let (mut coordinator, clock, player) = setup();
    coordinator
        .start_set(SetConfig::new("3-1-1-0", 2).with_exercise("squat"))
        .unwrap();
    // Zero-offset cues are due immediately
    coordinator.run_due();

    drive(&mut coordinator, &clock, 12_000);

    let spoken = player.spoken();
    assert_eq!(player.texts(), SQUAT_CUES);
    let times: Vec<u64> = spoken.iter().map(|(at, _)| *at).collect();
    assert_eq!(
        times,
        vec![0, 0, 1_000, 2_000, 3_000, 4_000, 5_000, 5_000, 6_000, 7_000, 8_000, 9_000, 9_000, 10_000]
    );

    let state = coordinator.execution_state();
    assert!(!state.is_active);
    assert_eq!(state.completed_reps, 2);
    assert_eq!(coordinator.next_deadline(), None);
    let calls = player.inner.calls();
    assert_eq!(&calls[calls.len() - 2..], &[PlayerCall::Stop, PlayerCall::ClearQueue]);
}

#[test]
fn test_completion_waits_for_grace_period() {
    let (mut coordinator, clock, _player) = setup();
    let states = record_states(&coordinator, &clock);
    coordinator.start_set(SetConfig::new("1-0-1-0", 2)).unwrap();

    drive(&mut coordinator, &clock, 6_000);

    let states = states.lock().unwrap();
    let (done_at, done) = states
        .iter()
        .find(|(_, s)| s.is_active && s.completed_reps == 2)
        .expect("final poll");
    assert_eq!(*done_at, 4_000);
    assert_eq!(done.current_rep, 2);
    assert_eq!(done.current_phase, Some(Phase::Concentric));

    let (idle_at, idle) = states.iter().find(|(_, s)| !s.is_active).expect("set finished");
    assert_eq!(*idle_at, 5_000);
    assert_eq!(idle.completed_reps, 2);
}

#[test]
fn test_skip_jumps_to_next_rep() {
    let (mut coordinator, clock, player) = setup();
    coordinator
        .start_set(SetConfig::new("3-1-1-0", 2).with_exercise("squat"))
        .unwrap();
    drive(&mut coordinator, &clock, 2_000);

    coordinator.skip_to_next_rep();

    let state = coordinator.execution_state();
    assert_eq!(state.current_rep, 2);
    assert_eq!(state.elapsed_seconds, 5.0);
    assert_eq!(state.current_phase, Some(Phase::Eccentric));
    assert_eq!(state.completed_reps, 1);
    assert_eq!(
        coordinator.pending_cue_offsets(),
        vec![5, 5, 6, 7, 8, 9, 9, 10]
    );
    assert_eq!(player.inner.calls().last(), Some(&PlayerCall::Stop));

    drive(&mut coordinator, &clock, 10_000);
    let texts = player.texts();
    assert_eq!(
        texts,
        vec![
            "Starting squat",
            "3",
            "2",
            "1",
            "Rep 2",
            "3",
            "2",
            "1",
            "Hold",
            "Up",
            "Last one, push!",
            "Set complete"
        ]
    );
    assert_eq!(texts.iter().filter(|t| *t == "Hold").count(), 1);

    // Rep 2 cues now land 3s earlier than they would have
    let spoken = player.spoken();
    let hold_at = spoken.iter().find(|(_, t)| t == "Hold").map(|(at, _)| *at);
    assert_eq!(hold_at, Some(5_000));
    assert!(!coordinator.execution_state().is_active);
}

#[test]
fn test_skip_between_rep_boundary_and_poll_does_not_replay_cues() {
    let (mut coordinator, clock, player) = setup();
    coordinator.start_set(SetConfig::new("3-1-1-0", 3)).unwrap();
    coordinator.run_due();

    // Pausing mid-second moves every later poll off the whole seconds
    drive(&mut coordinator, &clock, 1_550);
    coordinator.pause_set();
    coordinator.resume_set();
    drive(&mut coordinator, &clock, 3_460);

    // Rep 2 has been announced but no poll has seen it yet
    let before = coordinator.execution_state();
    assert_eq!(before.current_rep, 1);
    assert_eq!(before.elapsed_seconds, 4.95);
    assert_eq!(player.texts().last().map(String::as_str), Some("3"));

    coordinator.skip_to_next_rep();
    coordinator.run_due();
    let state = coordinator.execution_state();
    assert_eq!(state.current_rep, 2);
    assert_eq!(state.elapsed_seconds, 5.0);
    assert_eq!(coordinator.pending_cue_offsets().first(), Some(&6));

    drive(&mut coordinator, &clock, 12_000);
    assert_eq!(
        player.texts(),
        vec![
            "Starting", "3", "2", "1", "Hold", "Up",
            "Rep 2", "3", "2", "1", "Hold", "Up",
            "Rep 3", "3", "2", "1", "Hold", "Up",
            "Last one, push!", "Set complete",
        ]
    );
    assert!(!coordinator.execution_state().is_active);
}

#[test]
fn test_skip_on_last_rep_finishes_set() {
    let (mut coordinator, clock, player) = setup();
    let states = record_states(&coordinator, &clock);
    coordinator.start_set(SetConfig::new("2-0-1-0", 2)).unwrap();
    drive(&mut coordinator, &clock, 3_500);
    assert_eq!(coordinator.execution_state().current_rep, 2);

    coordinator.skip_to_next_rep();

    let state = coordinator.execution_state();
    assert!(!state.is_active);
    assert_eq!(state.completed_reps, 2);
    assert_eq!(coordinator.next_deadline(), None);
    assert_eq!(
        states.lock().unwrap().last().map(|(_, s)| s.completed_reps),
        Some(2)
    );

    let spoken_before = player.texts().len();
    drive(&mut coordinator, &clock, 5_000);
    assert_eq!(player.texts().len(), spoken_before);
}

#[test]
fn test_nothing_is_delivered_after_stop() {
    let (mut coordinator, clock, player) = setup();
    coordinator.start_set(SetConfig::new("3-1-1-0", 5)).unwrap();
    drive(&mut coordinator, &clock, 1_500);
    coordinator.stop_set();
    assert_eq!(coordinator.next_deadline(), None);

    player.inner.clear();
    let spoken_before = player.texts().len();
    drive(&mut coordinator, &clock, 30_000);

    assert!(player.inner.calls().is_empty());
    assert_eq!(player.texts().len(), spoken_before);
    assert!(!coordinator.execution_state().is_active);
}

#[test]
fn test_invalid_configs_are_rejected_without_side_effects() {
    let (mut coordinator, clock, player) = setup();
    let states = record_states(&coordinator, &clock);

    for tempo in ["", "3-1-1", "3-1-1-0-0", "a-1-1-0", "-1-1-1-0", "0-0-0-0", "1.5-1-1-0"] {
        assert!(coordinator.start_set(SetConfig::new(tempo, 3)).is_err(), "{:?}", tempo);
    }
    assert!(coordinator.start_set(SetConfig::new("3-1-1-0", 0)).is_err());

    drive(&mut coordinator, &clock, 2_000);
    assert!(states.lock().unwrap().is_empty());
    assert!(player.inner.calls().is_empty());
    assert_eq!(coordinator.execution_state(), ExecutionState::idle(0));
}

#[test]
fn test_invalid_start_still_stops_running_set() {
    let (mut coordinator, clock, _player) = setup();
    coordinator.start_set(SetConfig::new("1-0-1-0", 4)).unwrap();
    drive(&mut coordinator, &clock, 2_500);

    assert!(coordinator.start_set(SetConfig::new("x", 4)).is_err());

    let state = coordinator.execution_state();
    assert!(!state.is_active);
    assert_eq!(state.completed_reps, 1);
}

#[test]
fn test_unsubscribed_observer_is_not_called() {
    let (mut coordinator, clock, _player) = setup();
    let kept = record_states(&coordinator, &clock);
    let dropped = Arc::new(Mutex::new(0));
    let counter = dropped.clone();
    let subscription = coordinator.on_state_change(move |_| {
        *counter.lock().unwrap() += 1;
    });

    coordinator.start_set(SetConfig::new("1-0-1-0", 1)).unwrap();
    assert_eq!(*dropped.lock().unwrap(), 1);
    assert!(subscription.unsubscribe());

    coordinator.pause_set();
    coordinator.resume_set();
    drive(&mut coordinator, &clock, 500);

    assert_eq!(*dropped.lock().unwrap(), 1);
    assert!(kept.lock().unwrap().len() > 3);
}

#[test]
fn test_pause_shifts_remaining_cues() {
    proptest!(
        ProptestConfig { cases: 48, ..ProptestConfig::default() },
        |(pause_at in (0u64..1_000).prop_map(|t| t * 10), paused_for in (0u64..500).prop_map(|t| t * 10))| {
            let (mut coordinator, clock, player) = setup();
            let states = record_states(&coordinator, &clock);
            coordinator.start_set(SetConfig::new("3-1-1-0", 2)).unwrap();
            coordinator.run_due();

            drive(&mut coordinator, &clock, pause_at);
            coordinator.pause_set();
            drive(&mut coordinator, &clock, paused_for);
            coordinator.resume_set();
            coordinator.run_due();
            drive(&mut coordinator, &clock, 12_000);

            // Every cue exactly once, each shifted by the pause if it was still ahead
            let spoken = player.spoken();
            prop_assert_eq!(player.texts(), SQUAT_CUES.to_vec());
            let timeline = [0u64, 0, 1, 2, 3, 4, 5, 5, 6, 7, 8, 9, 9, 10];
            for ((at, text), offset) in spoken.iter().zip(timeline) {
                let expected = if offset * 1_000 <= pause_at {
                    offset * 1_000
                } else {
                    offset * 1_000 + paused_for
                };
                prop_assert_eq!(*at, expected, "{}", text);
            }

            let states = states.lock().unwrap();
            let done_at = states
                .iter()
                .find(|(_, s)| s.is_active && s.completed_reps == 2)
                .map(|(at, _)| *at);
            let total = 10_000 + paused_for;
            prop_assert!(matches!(done_at, Some(at) if at >= total && at <= total + 100), "{:?}", done_at);

            // Active time never runs backwards without a skip
            let elapsed: Vec<f64> = states
                .iter()
                .filter(|(_, s)| s.is_active)
                .map(|(_, s)| s.elapsed_seconds)
                .collect();
            prop_assert!(elapsed.windows(2).all(|w| w[0] <= w[1]));
        }
    );
}
