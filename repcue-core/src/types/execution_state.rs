//! Snapshot of a set in progress

use crate::types::{Cue, Phase};
use std::sync::Arc;

/// State of the set currently being executed.
///
/// The coordinator owns the live record; everything else only ever sees
/// clones. The cue timeline is shared, so cloning a snapshot is cheap.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionState {
    pub is_active: bool,
    pub is_paused: bool,
    /// 1-based rep in progress (0 when idle)
    pub current_rep: u32,
    pub target_reps: u32,
    /// `None` when idle
    pub current_phase: Option<Phase>,
    /// Active seconds since the set started, refreshed by every poll tick
    pub elapsed_seconds: f64,
    pub total_duration_seconds: u32,
    pub completed_reps: u32,
    pub cue_timeline: Arc<[Cue]>,
}

impl ExecutionState {
    /// An idle record, carrying the rep tally of the run that just ended
    pub fn idle(completed_reps: u32) -> Self {
        Self {
            is_active: false,
            is_paused: false,
            current_rep: 0,
            target_reps: 0,
            current_phase: None,
            elapsed_seconds: 0.0,
            total_duration_seconds: 0,
            completed_reps,
            cue_timeline: Arc::from(Vec::new()),
        }
    }

    /// Fresh state for a set that starts now
    pub fn started(total_duration_seconds: u32, target_reps: u32, cue_timeline: Arc<[Cue]>) -> Self {
        Self {
            is_active: true,
            is_paused: false,
            current_rep: 1,
            target_reps,
            current_phase: Some(Phase::Eccentric),
            elapsed_seconds: 0.0,
            total_duration_seconds,
            completed_reps: 0,
            cue_timeline,
        }
    }

    /// Fraction of the set's active time already spent, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.total_duration_seconds == 0 {
            return 0.0;
        }
        (self.elapsed_seconds / self.total_duration_seconds as f64).clamp(0.0, 1.0)
    }

    /// Active seconds left until the set's closing cue
    pub fn remaining_seconds(&self) -> f64 {
        (self.total_duration_seconds as f64 - self.elapsed_seconds).max(0.0)
    }

    pub fn phase_label(&self) -> &'static str {
        self.current_phase.map(|p| p.name()).unwrap_or("idle")
    }
}

impl Default for ExecutionState {
    fn default() -> Self {
        Self::idle(0)
    }
}
