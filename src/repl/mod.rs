//! REPL (Read-Eval-Print Loop) for driving sets interactively

use crate::commands::{create_registry, CommandContext, CommandResult};
use anyhow::{anyhow, Result};
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use repcue_core::{ExecutionState, Phase};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RustylineResult};
use std::thread;
use tracing::debug;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

type StatusKey = (bool, bool, u32, Option<Phase>);

/// Turns state snapshots into progress lines, one per rep/phase change
#[derive(Debug)]
pub struct StatusRenderer {
    last: StatusKey,
}

impl StatusRenderer {
    pub fn new() -> Self {
        Self {
            last: (false, false, 0, None),
        }
    }

    /// Line to print for `state`, or None if nothing worth showing changed
    pub fn render(&mut self, state: &ExecutionState) -> Option<String> {
        let key = (
            state.is_active,
            state.is_paused,
            state.current_rep,
            state.current_phase,
        );
        let previous = std::mem::replace(&mut self.last, key);
        if previous == key {
            return None;
        }

        let (was_active, ..) = previous;
        if was_active && !state.is_active {
            return Some(format!(
                "{} {} reps completed",
                "■".bright_red(),
                state.completed_reps
            ));
        }
        if !state.is_active {
            return None;
        }
        if state.is_paused {
            return Some(format!("{} paused", "‖".yellow()));
        }
        Some(format!(
            "{} rep {}/{} {}",
            "▶".bright_green(),
            state.current_rep,
            state.target_reps,
            state.phase_label().cyan()
        ))
    }
}

impl Default for StatusRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Interactive REPL
pub struct Repl {
    editor: Option<DefaultEditor>,
    ctx: CommandContext,
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(ctx: CommandContext) -> RustylineResult<Self> {
        let editor = DefaultEditor::new()?;
        let (tx_input, rx_input) = unbounded();
        Ok(Repl {
            editor: Some(editor),
            ctx,
            tx_input,
            rx_input,
        })
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!("{}", "repcue: tempo-timed set coach".bright_cyan().bold());
        println!(
            "Start a set with: {}",
            "start 3-1-1-0 8 squat".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        // Move editor to thread
        let mut editor = self
            .editor
            .take()
            .ok_or_else(|| anyhow!("REPL is already running"))?;
        let tx_input = self.tx_input.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "repcue>".bright_magenta().bold());
            match editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        let registry = create_registry();
        let updates = self.ctx.session.subscribe()?;
        let mut renderer = StatusRenderer::new();

        loop {
            crossbeam_channel::select! {
                recv(self.rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(Ok(line))) => {
                        if line.is_empty() {
                            continue;
                        }
                        match registry.execute(&line, &mut self.ctx) {
                            CommandResult::Success => {}
                            CommandResult::Message(msg) => println!("{}", msg),
                            CommandResult::Exit => {
                                println!("{}", "Goodbye!".bright_cyan());
                                break;
                            }
                            CommandResult::Error(e) => {
                                println!("{} {}", "Error:".bright_red().bold(), e.red());
                            }
                            CommandResult::NotACommand => {
                                println!(
                                    "{} Unknown command {:?}, type '{}' for a list",
                                    "Error:".bright_red().bold(),
                                    line,
                                    "help".bright_green()
                                );
                            }
                        }
                    }
                    Ok(ReplEvent::Input(Err(ReadlineError::Interrupted)))
                    | Ok(ReplEvent::Input(Err(ReadlineError::Eof))) => {
                        println!("{}", "Goodbye!".bright_cyan());
                        break;
                    }
                    Ok(ReplEvent::Input(Err(err))) => {
                        println!("{} {:?}", "Error:".bright_red().bold(), err);
                        break;
                    }
                    Err(_) => break,
                },
                recv(updates) -> msg => match msg {
                    Ok(state) => {
                        if let Some(line) = renderer.render(&state) {
                            println!("{}", line);
                        }
                    }
                    Err(_) => {
                        println!("{}", "Session ended unexpectedly".bright_red());
                        break;
                    }
                },
            }
        }

        if let Err(e) = self.ctx.session.stop() {
            debug!("Session already gone at exit: {:#}", e);
        }
        Ok(())
    }
}
