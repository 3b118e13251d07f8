//! Console voice
//!
//! A [`CuePlayer`] that "speaks" by writing each cue segment as a line of
//! text. It runs on its own thread so the silence after a segment never
//! blocks the coordinator; scripts wait in a priority queue (higher priority
//! first, then enqueue order) and segments are spaced by their
//! `pause_after_ms`.

use crate::engine::playback::CuePlayer;
use colored::Colorize;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use repcue_core::{CuePriority, CueScript, CueSegment};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How spoken lines are rendered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VoiceStyle {
    #[default]
    Plain,
    Colored,
}

enum VoiceCommand {
    Enqueue(CueScript),
    Pause,
    Resume,
    Stop,
    ClearQueue,
    Shutdown,
}

struct Queued {
    priority: CuePriority,
    seq: u64,
    script: CueScript,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        // Highest priority on top, earliest enqueue among equals
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Handle to the voice thread
pub struct ConsoleVoice {
    command_tx: Sender<VoiceCommand>,
    is_running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ConsoleVoice {
    /// Start a voice writing to `writer`
    pub fn spawn<W>(writer: W, style: VoiceStyle) -> Self
    where
        W: Write + Send + 'static,
    {
        let (command_tx, command_rx) = unbounded();
        let is_running = Arc::new(AtomicBool::new(true));

        let voice = VoiceLoop {
            writer: Box::new(writer),
            style,
            command_rx,
            queue: BinaryHeap::new(),
            next_seq: 0,
            current: VecDeque::new(),
            silence_until: None,
            paused_at: None,
            is_running: is_running.clone(),
        };
        let thread = thread::spawn(move || voice.run_loop());

        Self {
            command_tx,
            is_running,
            thread: Some(thread),
        }
    }

    /// Voice writing to stdout
    pub fn stdout(style: VoiceStyle) -> Self {
        Self::spawn(io::stdout(), style)
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(AtomicOrdering::Relaxed)
    }

    /// Stop the voice thread and wait for it. Queued scripts are dropped.
    pub fn shutdown(&mut self) {
        let _ = self.command_tx.send(VoiceCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Voice thread panicked");
            }
        }
    }

    fn send(&self, command: VoiceCommand) {
        if self.command_tx.send(command).is_err() {
            debug!("Voice thread is gone, dropping command");
        }
    }
}

impl CuePlayer for ConsoleVoice {
    fn enqueue(&mut self, script: CueScript) {
        self.send(VoiceCommand::Enqueue(script));
    }

    fn pause(&mut self) {
        self.send(VoiceCommand::Pause);
    }

    fn resume(&mut self) {
        self.send(VoiceCommand::Resume);
    }

    fn stop(&mut self) {
        self.send(VoiceCommand::Stop);
    }

    fn clear_queue(&mut self) {
        self.send(VoiceCommand::ClearQueue);
    }
}

impl Drop for ConsoleVoice {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct VoiceLoop {
    writer: Box<dyn Write + Send>,
    style: VoiceStyle,
    command_rx: Receiver<VoiceCommand>,
    queue: BinaryHeap<Queued>,
    next_seq: u64,
    /// Segments of the script being spoken
    current: VecDeque<(CueSegment, CuePriority)>,
    /// End of the silence after the last spoken segment
    silence_until: Option<Instant>,
    /// Set while paused; the silence is frozen from this instant
    paused_at: Option<Instant>,
    is_running: Arc<AtomicBool>,
}

impl VoiceLoop {
    fn run_loop(mut self) {
        loop {
            self.speak_ready();

            let command = match self.wait_time() {
                Some(timeout) => match self.command_rx.recv_timeout(timeout) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match self.command_rx.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
            };
            if !self.handle_command(command) {
                break;
            }
        }
        self.is_running.store(false, AtomicOrdering::Relaxed);
    }

    /// Handle a command, returns false if should shutdown
    fn handle_command(&mut self, command: VoiceCommand) -> bool {
        match command {
            VoiceCommand::Enqueue(script) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.queue.push(Queued {
                    priority: script.priority,
                    seq,
                    script,
                });
            }
            VoiceCommand::Pause => {
                if self.paused_at.is_none() {
                    self.paused_at = Some(Instant::now());
                }
            }
            VoiceCommand::Resume => {
                if let Some(paused_at) = self.paused_at.take() {
                    // Silence that was left at the pause is still owed
                    let paused_for = paused_at.elapsed();
                    self.silence_until = self.silence_until.map(|until| until + paused_for);
                }
            }
            VoiceCommand::Stop => {
                self.current.clear();
                self.silence_until = None;
            }
            VoiceCommand::ClearQueue => {
                self.queue.clear();
            }
            VoiceCommand::Shutdown => return false,
        }
        true
    }

    /// How long to block waiting for a command, None for indefinitely
    fn wait_time(&self) -> Option<Duration> {
        if self.paused_at.is_some() {
            return None;
        }
        if self.current.is_empty() && self.queue.is_empty() {
            return None;
        }
        let until = self.silence_until?;
        Some(until.saturating_duration_since(Instant::now()))
    }

    fn speak_ready(&mut self) {
        while self.paused_at.is_none() {
            if let Some(until) = self.silence_until {
                if Instant::now() < until {
                    return;
                }
                self.silence_until = None;
            }
            if self.current.is_empty() {
                let Some(next) = self.queue.pop() else {
                    return;
                };
                let priority = next.priority;
                self.current
                    .extend(next.script.segments.into_iter().map(|s| (s, priority)));
            }
            let Some((segment, priority)) = self.current.pop_front() else {
                continue;
            };
            self.speak(&segment.text, priority);
            self.silence_until =
                Some(Instant::now() + Duration::from_millis(segment.pause_after_ms as u64));
        }
    }

    fn speak(&mut self, text: &str, priority: CuePriority) {
        let line = match self.style {
            VoiceStyle::Plain => format!("> {}", text),
            VoiceStyle::Colored => {
                let text = match priority {
                    CuePriority::Critical => text.green().bold(),
                    CuePriority::High => text.yellow().bold(),
                    CuePriority::Normal => text.normal(),
                    CuePriority::Low => text.dimmed(),
                };
                format!("{} {}", ">".bright_black(), text)
            }
        };
        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            warn!("Voice output failed: {}", e);
        }
    }
}
