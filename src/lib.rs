//! # repcue
//!
//! Realtime side of the repcue set execution engine. The pure pieces (tempo
//! grammar, cue timeline, languages, state records) live in `repcue-core`;
//! this crate schedules them against a clock and hands due cues to a player.
//!
//! ## Modules
//!
//! - `engine`: the set coordinator, its timer queue and clocks, the threaded
//!   session runtime and the cue players (`ConsoleVoice`, `RecordingPlayer`).
//! - `commands`: the REPL command registry and set control commands.
//! - `config`: persisted settings (language, poll interval, completion grace).
//! - `repl`: the interactive Read-Eval-Print Loop.

pub mod commands;
pub mod config;
pub mod engine;
pub mod repl;

// Re-export commonly used types for convenience
pub use crate::engine::{
    CoordinatorOptions, CuePlayer, RecordingPlayer, SessionHandle, SetCoordinator, WorkoutSession,
};
pub use repcue_core::{ExecutionState, Language, Phase, SetConfig};
