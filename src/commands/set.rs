//! Set control commands (start, pause, resume, skip, stop, status, preview)

use crate::commands::{CommandContext, CommandResult};
use colored::*;
use repcue_core::{build_cue_timeline, Cue, ExecutionState, Language, SetConfig};

/// Parse `<tempo> <reps> [exercise...]`
pub fn parse_set_args(args: &str, language: Language) -> Result<SetConfig, String> {
    let mut words = args.split_whitespace();
    let (Some(tempo), Some(reps)) = (words.next(), words.next()) else {
        return Err("Usage: <tempo> <reps> [exercise], e.g. 3-1-1-0 8 squat".to_string());
    };
    let reps: u32 = reps
        .parse()
        .map_err(|_| format!("Invalid rep count {:?}", reps))?;
    let exercise = words.collect::<Vec<_>>().join(" ");

    Ok(SetConfig::new(tempo, reps)
        .with_exercise(exercise)
        .with_language(language))
}

/// Handle `start <tempo> <reps> [exercise...]`
pub fn cmd_start(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let config = match parse_set_args(args, ctx.language) {
        Ok(config) => config.with_set_number(ctx.next_set_number),
        Err(e) => return CommandResult::Error(e),
    };
    let summary = format!("{} x {}", config.tempo, config.target_reps);

    match ctx.session.start_set(config) {
        Ok(()) => {
            let number = ctx.next_set_number;
            ctx.next_set_number += 1;
            CommandResult::Message(
                format!("Set {} started: {}", number, summary)
                    .bright_green()
                    .to_string(),
            )
        }
        Err(e) => CommandResult::Error(format!("{:#}", e)),
    }
}

/// Handle `pause`
pub fn cmd_pause(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match current_state(ctx) {
        Ok(state) if state.is_active && !state.is_paused => {
            if let Err(e) = ctx.session.pause() {
                return CommandResult::Error(format!("{:#}", e));
            }
            CommandResult::Message("Paused".yellow().to_string())
        }
        Ok(state) if state.is_paused => CommandResult::Message("Already paused".to_string()),
        Ok(_) => CommandResult::Error("No set in progress".to_string()),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `resume`
pub fn cmd_resume(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match current_state(ctx) {
        Ok(state) if state.is_paused => {
            if let Err(e) = ctx.session.resume() {
                return CommandResult::Error(format!("{:#}", e));
            }
            CommandResult::Message("Resumed".bright_green().to_string())
        }
        Ok(state) if state.is_active => CommandResult::Message("Not paused".to_string()),
        Ok(_) => CommandResult::Error("No set in progress".to_string()),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `skip`
pub fn cmd_skip(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match current_state(ctx) {
        Ok(state) if state.is_paused => CommandResult::Error("Resume before skipping".to_string()),
        Ok(state) if state.is_active => {
            if let Err(e) = ctx.session.skip() {
                return CommandResult::Error(format!("{:#}", e));
            }
            if state.current_rep >= state.target_reps {
                CommandResult::Message("Last rep skipped, set finished".to_string())
            } else {
                CommandResult::Message(format!("Skipped to rep {}", state.current_rep + 1))
            }
        }
        Ok(_) => CommandResult::Error("No set in progress".to_string()),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `stop`
pub fn cmd_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match current_state(ctx) {
        Ok(state) if state.is_active => {
            if let Err(e) = ctx.session.stop() {
                return CommandResult::Error(format!("{:#}", e));
            }
            CommandResult::Message("Stopped".red().to_string())
        }
        Ok(_) => CommandResult::Message("Nothing to stop".to_string()),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `status`
pub fn cmd_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    match current_state(ctx) {
        Ok(state) => CommandResult::Message(format_status(&state)),
        Err(e) => CommandResult::Error(e),
    }
}

/// Handle `preview <tempo> <reps> [exercise...]`
pub fn cmd_preview(args: &str, ctx: &mut CommandContext) -> CommandResult {
    let config = match parse_set_args(args, ctx.language) {
        Ok(config) => config,
        Err(e) => return CommandResult::Error(e),
    };
    match config.phases() {
        Ok(phases) => CommandResult::Message(format_timeline(&build_cue_timeline(&config, &phases))),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// One line per cue: offset, kind and text
pub fn format_timeline(cues: &[Cue]) -> String {
    cues.iter()
        .map(|cue| {
            format!(
                "{:>5}s  {:<13} {}",
                cue.trigger_at_seconds,
                cue.kind.name(),
                cue.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable summary of a state snapshot
pub fn format_status(state: &ExecutionState) -> String {
    if !state.is_active {
        return format!("Idle ({} reps completed last set)", state.completed_reps);
    }
    let mut line = format!(
        "Rep {}/{} | {} | {:.1}s / {}s ({:.0}%)",
        state.current_rep,
        state.target_reps,
        state.phase_label(),
        state.elapsed_seconds,
        state.total_duration_seconds,
        state.progress() * 100.0
    );
    if state.is_paused {
        line.push_str(" | paused");
    }
    line
}

fn current_state(ctx: &CommandContext) -> Result<ExecutionState, String> {
    ctx.session
        .execution_state()
        .map_err(|e| format!("{:#}", e))
}
