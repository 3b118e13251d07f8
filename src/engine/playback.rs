//! Contract with the cue playback side
//!
//! The engine only decides *when* a cue is due. Speaking it is left to a
//! [`CuePlayer`]: a text-to-speech bridge, the [`ConsoleVoice`] used by the
//! REPL, or a [`RecordingPlayer`] in tests.
//!
//! [`ConsoleVoice`]: crate::engine::voice::ConsoleVoice

use repcue_core::CueScript;
use std::sync::{Arc, Mutex, PoisonError};

/// Something that plays cue scripts in enqueue order (higher priority first)
pub trait CuePlayer: Send {
    /// Queue a script for playback
    fn enqueue(&mut self, script: CueScript);
    /// Suspend playback, keeping the queue
    fn pause(&mut self);
    /// Continue after [`CuePlayer::pause`]
    fn resume(&mut self);
    /// Cut off whatever is being spoken right now
    fn stop(&mut self);
    /// Drop everything still waiting in the queue
    fn clear_queue(&mut self);
}

impl<P: CuePlayer + ?Sized> CuePlayer for Box<P> {
    fn enqueue(&mut self, script: CueScript) {
        (**self).enqueue(script)
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn clear_queue(&mut self) {
        (**self).clear_queue()
    }
}

/// A call received by a [`RecordingPlayer`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlayerCall {
    Enqueue(CueScript),
    Pause,
    Resume,
    Stop,
    ClearQueue,
}

/// Player that records every call. Clones share the same log.
#[derive(Clone, Debug, Default)]
pub struct RecordingPlayer {
    calls: Arc<Mutex<Vec<PlayerCall>>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Text of every enqueued script, oldest first
    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlayerCall::Enqueue(script) => Some(script.text()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, call: PlayerCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl CuePlayer for RecordingPlayer {
    fn enqueue(&mut self, script: CueScript) {
        self.record(PlayerCall::Enqueue(script));
    }

    fn pause(&mut self) {
        self.record(PlayerCall::Pause);
    }

    fn resume(&mut self) {
        self.record(PlayerCall::Resume);
    }

    fn stop(&mut self) {
        self.record(PlayerCall::Stop);
    }

    fn clear_queue(&mut self) {
        self.record(PlayerCall::ClearQueue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repcue_core::CuePriority;

    #[test]
    fn test_recording_player_shares_log_between_clones() {
        let recorder = RecordingPlayer::new();
        let mut player: Box<dyn CuePlayer> = Box::new(recorder.clone());

        player.enqueue(CueScript::new(CuePriority::Critical).segment("Up", 300));
        player.pause();
        player.resume();
        player.stop();
        player.clear_queue();

        assert_eq!(recorder.spoken(), vec!["Up".to_string()]);
        assert_eq!(recorder.calls().len(), 5);
        assert_eq!(recorder.calls()[4], PlayerCall::ClearQueue);

        recorder.clear();
        assert!(recorder.calls().is_empty());
    }
}
