//! # repcue core
//!
//! Thread-free building blocks of the repcue set execution engine: the tempo
//! grammar, cue timeline generation, cue languages, the elapsed-time baseline
//! and the execution state record. Nothing here touches clocks, threads or
//! I/O, so it can be used from any host (or compiled to WebAssembly).
//!
//! ## Features
//!
//! - **serde**: derive `Serialize`/`Deserialize` for the public data types
//!
//! ## Example
//!
//! ```
//! use repcue_core::{build_cue_timeline, SetConfig};
//!
//! let config = SetConfig::new("3-1-1-0", 2).with_exercise("squat");
//! let phases = config.phases().unwrap();
//! let cues = build_cue_timeline(&config, &phases);
//! assert_eq!(cues.last().unwrap().trigger_at_seconds, 10);
//! ```

pub mod baseline;
pub mod error;
pub mod timeline;
pub mod types;

// Re-export commonly used types
pub use baseline::Baseline;
pub use error::{SetupError, TempoError};
pub use timeline::build_cue_timeline;
pub use types::{
    parse_tempo, phase_at_time, Cue, CueKind, CuePriority, CueScript, CueSegment,
    ExecutionState, Language, Phase, RepPosition, SetConfig, TempoPhases,
};
