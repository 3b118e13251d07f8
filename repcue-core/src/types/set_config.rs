use crate::error::SetupError;
use crate::types::{Language, TempoPhases};

/// Largest rep target a set may have
pub const MAX_TARGET_REPS: u32 = 1000;

/// Everything needed to run one set. Consumed once when the set starts.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetConfig {
    /// Tempo prescription, e.g. `"3-1-1-0"`
    pub tempo: String,
    pub target_reps: u32,
    pub exercise_name: String,
    pub language: Language,
    pub set_number: Option<u32>,
}

impl SetConfig {
    /// Create a config with an unnamed exercise, English cues and no set number
    pub fn new(tempo: impl Into<String>, target_reps: u32) -> Self {
        Self {
            tempo: tempo.into(),
            target_reps,
            exercise_name: String::new(),
            language: Language::default(),
            set_number: None,
        }
    }

    pub fn with_exercise(mut self, exercise_name: impl Into<String>) -> Self {
        self.exercise_name = exercise_name.into();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_set_number(mut self, set_number: u32) -> Self {
        self.set_number = Some(set_number);
        self
    }

    /// Validate the config and return its parsed tempo
    pub fn phases(&self) -> Result<TempoPhases, SetupError> {
        let phases =
            TempoPhases::parse(&self.tempo).map_err(|source| SetupError::InvalidTempo {
                tempo: self.tempo.clone(),
                source,
            })?;
        if self.target_reps == 0 {
            return Err(SetupError::NoReps);
        }
        if self.target_reps > MAX_TARGET_REPS {
            return Err(SetupError::TooManyReps(self.target_reps));
        }
        Ok(phases)
    }

    /// Active duration of the whole set in seconds
    pub fn total_duration_seconds(&self) -> Result<u32, SetupError> {
        let phases = self.phases()?;
        Ok(phases.rep_duration() * self.target_reps)
    }
}
