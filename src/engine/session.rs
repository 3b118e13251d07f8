//! Threaded session runtime
//!
//! [`WorkoutSession`] moves a [`SetCoordinator`] onto its own thread and
//! drives it from the wall clock: the thread sleeps until either a command
//! arrives or the coordinator's next deadline is reached. Every operation on
//! the coordinator therefore happens on one thread, and hosts talk to it
//! through a [`SessionHandle`].

use crate::engine::clock::{Clock, SystemClock};
use crate::engine::coordinator::{CoordinatorOptions, SetCoordinator};
use crate::engine::playback::CuePlayer;
use anyhow::{anyhow, Context};
use crossbeam_channel::{
    bounded, unbounded, Receiver, RecvTimeoutError, Sender, TrySendError,
};
use repcue_core::{ExecutionState, SetConfig, SetupError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Snapshots buffered per subscriber before new ones are dropped
const SUBSCRIBER_BUFFER: usize = 256;

/// Commands that can be sent to the session thread
pub enum SessionCommand {
    Start(SetConfig, Sender<Result<(), SetupError>>),
    Pause,
    Resume,
    Stop,
    Skip,
    Snapshot(Sender<ExecutionState>),
    Subscribe(Sender<ExecutionState>),
    Shutdown,
}

/// Handle for talking to a running session
pub struct SessionHandle {
    command_tx: Sender<SessionCommand>,
    is_running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SessionHandle {
    /// Start a set, replacing any set in progress. Returns the validation
    /// error when the config is rejected.
    pub fn start_set(&self, config: SetConfig) -> anyhow::Result<()> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(SessionCommand::Start(config, reply_tx))?;
        let outcome = reply_rx
            .recv()
            .context("session thread exited before starting the set")?;
        Ok(outcome?)
    }

    pub fn pause(&self) -> anyhow::Result<()> {
        self.send(SessionCommand::Pause)
    }

    pub fn resume(&self) -> anyhow::Result<()> {
        self.send(SessionCommand::Resume)
    }

    pub fn stop(&self) -> anyhow::Result<()> {
        self.send(SessionCommand::Stop)
    }

    pub fn skip(&self) -> anyhow::Result<()> {
        self.send(SessionCommand::Skip)
    }

    /// Current state of the coordinator
    pub fn execution_state(&self) -> anyhow::Result<ExecutionState> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(SessionCommand::Snapshot(reply_tx))?;
        reply_rx
            .recv()
            .context("session thread exited before answering")
    }

    /// Channel receiving a snapshot after every state change
    pub fn subscribe(&self) -> anyhow::Result<Receiver<ExecutionState>> {
        let (state_tx, state_rx) = bounded(SUBSCRIBER_BUFFER);
        self.send(SessionCommand::Subscribe(state_tx))?;
        Ok(state_rx)
    }

    /// Start a set and block until it is over, returning the final state
    pub fn run_set(&self, config: SetConfig) -> anyhow::Result<ExecutionState> {
        let updates = self.subscribe()?;
        self.start_set(config)?;

        let mut started = false;
        loop {
            let state = updates
                .recv()
                .context("session thread exited while the set was running")?;
            if state.is_active {
                started = true;
            } else if started {
                return Ok(state);
            }
        }
    }

    /// Check if the session thread is still running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Stop the session thread and wait for it
    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(SessionCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Session thread panicked");
            }
        }
    }

    fn send(&self, command: SessionCommand) -> anyhow::Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| anyhow!("session thread is not running"))
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Coordinator running on its own thread
pub struct WorkoutSession<P> {
    coordinator: SetCoordinator<SystemClock, P>,
    command_rx: Receiver<SessionCommand>,
    /// Fed by the coordinator's observer, drained after every step
    state_rx: Receiver<ExecutionState>,
    subscribers: Vec<Sender<ExecutionState>>,
    is_running: Arc<AtomicBool>,
}

impl<P: CuePlayer + 'static> WorkoutSession<P> {
    /// Create a session that runs in its own thread
    pub fn spawn(player: P, options: CoordinatorOptions) -> SessionHandle {
        let (command_tx, command_rx) = unbounded();
        let (state_tx, state_rx) = unbounded();
        let is_running = Arc::new(AtomicBool::new(true));

        let coordinator = SetCoordinator::with_options(SystemClock::new(), player, options);
        // Stays registered for the coordinator's whole life
        coordinator.on_state_change(move |state| {
            let _ = state_tx.send(state.clone());
        });

        let session = WorkoutSession {
            coordinator,
            command_rx,
            state_rx,
            subscribers: Vec::new(),
            is_running: is_running.clone(),
        };
        let thread = thread::spawn(move || session.run_loop());

        SessionHandle {
            command_tx,
            is_running,
            thread: Some(thread),
        }
    }

    /// Main session loop
    fn run_loop(mut self) {
        loop {
            let command = match self.time_to_deadline() {
                Some(timeout) => match self.command_rx.recv_timeout(timeout) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.command_rx.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                },
            };

            if let Some(command) = command {
                if !self.handle_command(command) {
                    break;
                }
            }
            self.coordinator.run_due();
            self.publish();
        }

        self.coordinator.stop_set();
        self.publish();
        self.is_running.store(false, Ordering::Relaxed);
        debug!("Session thread finished");
    }

    /// Handle a command, returns false if should shutdown
    fn handle_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::Start(config, reply) => {
                let _ = reply.send(self.coordinator.start_set(config));
            }
            SessionCommand::Pause => self.coordinator.pause_set(),
            SessionCommand::Resume => self.coordinator.resume_set(),
            SessionCommand::Stop => self.coordinator.stop_set(),
            SessionCommand::Skip => self.coordinator.skip_to_next_rep(),
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.coordinator.execution_state());
            }
            SessionCommand::Subscribe(subscriber) => self.subscribers.push(subscriber),
            SessionCommand::Shutdown => return false,
        }
        true
    }

    fn time_to_deadline(&mut self) -> Option<Duration> {
        let due = self.coordinator.next_deadline()?;
        let now = self.coordinator.clock().now_ms();
        Some(Duration::from_millis(due.saturating_sub(now)))
    }

    /// Hand pending snapshots to every subscriber, forgetting closed ones
    fn publish(&mut self) {
        while let Ok(state) = self.state_rx.try_recv() {
            self.subscribers.retain(|subscriber| match subscriber.try_send(state.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    debug!("Subscriber is lagging, dropping a snapshot");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
        }
    }
}
