use crate::types::Phase;
use std::fmt;

/// Why a tempo string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TempoError {
    /// The string did not split into exactly four hyphen-separated fields
    WrongFieldCount(usize),
    /// A field is empty, signed, or not a whole number (1-based position)
    InvalidField { position: usize, field: String },
    /// A single phase exceeds [`crate::types::MAX_PHASE_SECONDS`]
    PhaseTooLong { phase: Phase, seconds: u32 },
    /// Every phase is zero, so a rep would take no time
    AllZero,
}

impl fmt::Display for TempoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TempoError::WrongFieldCount(count) => {
                write!(f, "expected 4 hyphen-separated fields, found {}", count)
            }
            TempoError::InvalidField { position, field } => {
                write!(f, "field {} ({:?}) is not a whole number of seconds", position, field)
            }
            TempoError::PhaseTooLong { phase, seconds } => {
                write!(f, "{} phase of {}s is longer than allowed", phase, seconds)
            }
            TempoError::AllZero => write!(f, "at least one phase must be longer than 0s"),
        }
    }
}

impl std::error::Error for TempoError {}

/// Why a set could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    InvalidTempo { tempo: String, source: TempoError },
    NoReps,
    TooManyReps(u32),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::InvalidTempo { tempo, source } => {
                write!(f, "invalid tempo {:?}: {}", tempo, source)
            }
            SetupError::NoReps => write!(f, "target reps must be at least 1"),
            SetupError::TooManyReps(reps) => write!(
                f,
                "target of {} reps exceeds the limit of {}",
                reps,
                crate::types::set_config::MAX_TARGET_REPS
            ),
        }
    }
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::InvalidTempo { source, .. } => Some(source),
            SetupError::NoReps | SetupError::TooManyReps(_) => None,
        }
    }
}
