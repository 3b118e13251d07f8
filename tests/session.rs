//! Real-time runs of a full set on the session thread

use repcue::engine::{ConsoleVoice, CoordinatorOptions, PlayerCall, RecordingPlayer, VoiceStyle};
use repcue::{SetConfig, WorkoutSession};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn quick_options() -> CoordinatorOptions {
    CoordinatorOptions {
        poll_interval_ms: 20,
        completion_grace_ms: 100,
    }
}

#[test]
fn test_run_set_blocks_until_done() {
    let player = RecordingPlayer::new();
    let session = WorkoutSession::spawn(player.clone(), quick_options());

    let started = Instant::now();
    let final_state = session.run_set(SetConfig::new("1-0-0-0", 2)).unwrap();
    let took = started.elapsed();

    assert!(!final_state.is_active);
    assert_eq!(final_state.completed_reps, 2);
    assert!(took >= Duration::from_millis(2_000), "{:?}", took);
    assert!(took < Duration::from_millis(4_000), "{:?}", took);

    assert_eq!(
        player.spoken(),
        vec!["Starting", "1", "Rep 2", "1", "Last one, push!", "Set complete"]
    );
    let calls = player.calls();
    assert_eq!(&calls[calls.len() - 2..], &[PlayerCall::Stop, PlayerCall::ClearQueue]);
}

#[test]
fn test_subscribers_see_every_rep() {
    let session = WorkoutSession::spawn(RecordingPlayer::new(), quick_options());
    let updates = session.subscribe().unwrap();

    session.run_set(SetConfig::new("0-0-1-0", 3)).unwrap();

    let states: Vec<_> = updates.try_iter().collect();
    let mut reps: Vec<u32> = states.iter().filter(|s| s.is_active).map(|s| s.current_rep).collect();
    reps.dedup();
    assert_eq!(reps, vec![1, 2, 3]);
    assert!(!states.last().unwrap().is_active);
}

#[test]
fn test_pause_extends_the_set() {
    let session = WorkoutSession::spawn(RecordingPlayer::new(), quick_options());
    let updates = session.subscribe().unwrap();

    let started = Instant::now();
    session.start_set(SetConfig::new("1-0-0-0", 1)).unwrap();
    std::thread::sleep(Duration::from_millis(300));
    session.pause().unwrap();
    std::thread::sleep(Duration::from_millis(500));
    let paused = session.execution_state().unwrap();
    assert!(paused.is_paused);
    assert!(paused.elapsed_seconds < 0.5, "{}", paused.elapsed_seconds);
    session.resume().unwrap();

    while let Ok(state) = updates.recv_timeout(Duration::from_secs(5)) {
        if !state.is_active && state.completed_reps == 1 {
            break;
        }
    }
    // 1s of active time plus the pause
    assert!(started.elapsed() >= Duration::from_millis(1_500), "{:?}", started.elapsed());
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_console_voice_speaks_a_set() {
    let buffer = SharedBuffer::default();
    let voice = ConsoleVoice::spawn(buffer.clone(), VoiceStyle::Plain);
    // Long enough for the voice to work through its backlog
    let options = CoordinatorOptions {
        completion_grace_ms: 1_500,
        ..quick_options()
    };
    let session = WorkoutSession::spawn(voice, options);

    session
        .run_set(SetConfig::new("1-0-0-0", 1).with_exercise("plank").with_set_number(2))
        .unwrap();

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines.first(), Some(&"> Set 2. Starting plank"));
    assert!(lines.contains(&"> Set complete"), "{:?}", lines);
}
