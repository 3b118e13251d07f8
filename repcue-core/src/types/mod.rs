// repcue-core/src/types/mod.rs

pub mod cue;
pub mod execution_state;
pub mod language;
pub mod set_config;
pub mod tempo;

pub use cue::{Cue, CueKind, CuePriority, CueScript, CueSegment};
pub use execution_state::ExecutionState;
pub use language::Language;
pub use set_config::{SetConfig, MAX_TARGET_REPS};
pub use tempo::{
    parse_tempo, phase_at_time, Phase, RepPosition, TempoPhases, MAX_PHASE_SECONDS,
};
