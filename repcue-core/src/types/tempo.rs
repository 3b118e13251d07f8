//! Tempo grammar
//!
//! A tempo prescription is four hyphen-separated whole-second durations, in
//! the fixed order eccentric, pause at the bottom, concentric, pause at the
//! top. `"3-1-1-0"` means three seconds lowering, a one second hold, one
//! second lifting and no pause at the top.

use crate::error::TempoError;
use std::fmt;
use std::str::FromStr;

/// Upper bound for a single phase, in seconds
pub const MAX_PHASE_SECONDS: u32 = 600;

/// One of the four phases of a repetition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    Eccentric,
    PauseBottom,
    Concentric,
    PauseTop,
}

impl Phase {
    /// All phases in the order they occur within a rep
    pub const ALL: [Phase; 4] = [
        Phase::Eccentric,
        Phase::PauseBottom,
        Phase::Concentric,
        Phase::PauseTop,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Eccentric => "eccentric",
            Phase::PauseBottom => "pause_bottom",
            Phase::Concentric => "concentric",
            Phase::PauseTop => "pause_top",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Phase durations of one repetition, in seconds.
///
/// Always holds at least one non-zero phase, so [`TempoPhases::rep_duration`]
/// is never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TempoPhases {
    pub eccentric: u32,
    pub pause_bottom: u32,
    pub concentric: u32,
    pub pause_top: u32,
}

/// Where a point in time falls: which rep, which phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepPosition {
    pub rep_number: u32,
    pub phase: Phase,
}

impl TempoPhases {
    /// Build phases from raw durations, rejecting an all-zero or oversized tempo
    pub fn new(
        eccentric: u32,
        pause_bottom: u32,
        concentric: u32,
        pause_top: u32,
    ) -> Result<Self, TempoError> {
        let phases = Self {
            eccentric,
            pause_bottom,
            concentric,
            pause_top,
        };
        for phase in Phase::ALL {
            let seconds = phases.duration_of(phase);
            if seconds > MAX_PHASE_SECONDS {
                return Err(TempoError::PhaseTooLong { phase, seconds });
            }
        }
        if phases.rep_duration() == 0 {
            return Err(TempoError::AllZero);
        }
        Ok(phases)
    }

    /// Parse a `"E-B-C-T"` tempo string
    pub fn parse(tempo: &str) -> Result<Self, TempoError> {
        let fields: Vec<&str> = tempo.trim().split('-').collect();
        if fields.len() != Phase::ALL.len() {
            return Err(TempoError::WrongFieldCount(fields.len()));
        }

        let mut seconds = [0u32; 4];
        for (i, field) in fields.iter().enumerate() {
            seconds[i] = parse_field(field).ok_or_else(|| TempoError::InvalidField {
                position: i + 1,
                field: field.to_string(),
            })?;
        }

        Self::new(seconds[0], seconds[1], seconds[2], seconds[3])
    }

    pub fn duration_of(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Eccentric => self.eccentric,
            Phase::PauseBottom => self.pause_bottom,
            Phase::Concentric => self.concentric,
            Phase::PauseTop => self.pause_top,
        }
    }

    /// Offset of a phase's start from the start of the rep, in seconds
    pub fn phase_start(&self, phase: Phase) -> u32 {
        Phase::ALL
            .iter()
            .take_while(|p| **p != phase)
            .map(|p| self.duration_of(*p))
            .sum()
    }

    /// Length of one full repetition in seconds
    pub fn rep_duration(&self) -> u32 {
        self.eccentric + self.pause_bottom + self.concentric + self.pause_top
    }

    /// Phase containing `elapsed_in_rep` seconds, using `[start, end)` boundaries.
    ///
    /// Offsets at or past the end of the rep resolve to the last non-empty phase.
    pub fn phase_at(&self, elapsed_in_rep: f64) -> Phase {
        let mut boundary = 0.0;
        for phase in Phase::ALL {
            boundary += self.duration_of(phase) as f64;
            if elapsed_in_rep < boundary {
                return phase;
            }
        }
        Phase::ALL
            .iter()
            .rev()
            .copied()
            .find(|p| self.duration_of(*p) > 0)
            .unwrap_or(Phase::PauseTop)
    }

    /// Resolve a point inside `rep_number` to its phase.
    ///
    /// Returns `None` when the rep is outside `1..=target_reps` or the offset
    /// is negative or not a number.
    pub fn position_at(
        &self,
        rep_number: u32,
        target_reps: u32,
        elapsed_in_rep: f64,
    ) -> Option<RepPosition> {
        if rep_number == 0 || rep_number > target_reps {
            return None;
        }
        if elapsed_in_rep.is_nan() || elapsed_in_rep < 0.0 {
            return None;
        }
        Some(RepPosition {
            rep_number,
            phase: self.phase_at(elapsed_in_rep),
        })
    }
}

fn parse_field(field: &str) -> Option<u32> {
    let field = field.trim();
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl FromStr for TempoPhases {
    type Err = TempoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TempoPhases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.eccentric, self.pause_bottom, self.concentric, self.pause_top
        )
    }
}

/// Parse a tempo string into its four phase durations
pub fn parse_tempo(tempo: &str) -> Result<TempoPhases, TempoError> {
    TempoPhases::parse(tempo)
}

/// Which phase of `rep_number` is active `elapsed_in_rep` seconds into the rep.
///
/// `None` if the tempo is invalid or the rep is out of range.
pub fn phase_at_time(
    tempo: &str,
    rep_number: u32,
    target_reps: u32,
    elapsed_in_rep: f64,
) -> Option<RepPosition> {
    TempoPhases::parse(tempo)
        .ok()?
        .position_at(rep_number, target_reps, elapsed_in_rep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_tempo() {
        let phases = parse_tempo("3-1-1-0").unwrap();
        assert_eq!(phases.eccentric, 3);
        assert_eq!(phases.pause_bottom, 1);
        assert_eq!(phases.concentric, 1);
        assert_eq!(phases.pause_top, 0);
        assert_eq!(phases.rep_duration(), 5);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        assert_eq!(parse_tempo(" 4 - 0 - 2 - 0 ").unwrap().to_string(), "4-0-2-0");
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert_eq!(parse_tempo("3-1-1"), Err(TempoError::WrongFieldCount(3)));
        assert_eq!(parse_tempo("3-1-1-1-1"), Err(TempoError::WrongFieldCount(5)));
        assert_eq!(parse_tempo(""), Err(TempoError::WrongFieldCount(1)));
    }

    #[test]
    fn test_parse_rejects_non_numeric_and_signed() {
        assert!(matches!(
            parse_tempo("3-x-1-1"),
            Err(TempoError::InvalidField { position: 2, .. })
        ));
        assert!(matches!(
            parse_tempo("3-+1-1-1"),
            Err(TempoError::InvalidField { position: 2, .. })
        ));
        assert!(matches!(
            parse_tempo("3-1.5-1-1"),
            Err(TempoError::InvalidField { .. })
        ));
        // A negative field shows up as an extra, empty field
        assert!(parse_tempo("3--1-1-1").is_err());
    }

    #[test]
    fn test_parse_rejects_all_zero() {
        assert_eq!(parse_tempo("0-0-0-0"), Err(TempoError::AllZero));
    }

    #[test]
    fn test_parse_rejects_oversized_phase() {
        assert_eq!(
            parse_tempo("3-1-9999-0"),
            Err(TempoError::PhaseTooLong {
                phase: Phase::Concentric,
                seconds: 9999
            })
        );
    }

    #[test]
    fn test_phase_boundaries_are_closed_open() {
        let phases = parse_tempo("3-1-1-1").unwrap();
        assert_eq!(phases.phase_at(0.0), Phase::Eccentric);
        assert_eq!(phases.phase_at(2.99), Phase::Eccentric);
        assert_eq!(phases.phase_at(3.0), Phase::PauseBottom);
        assert_eq!(phases.phase_at(4.0), Phase::Concentric);
        assert_eq!(phases.phase_at(5.0), Phase::PauseTop);
        assert_eq!(phases.phase_at(5.99), Phase::PauseTop);
    }

    #[test]
    fn test_zero_length_phases_are_skipped() {
        let phases = parse_tempo("2-0-1-0").unwrap();
        assert_eq!(phases.phase_at(2.0), Phase::Concentric);
        // Past the end resolves to the last phase that actually has time
        assert_eq!(phases.phase_at(3.5), Phase::Concentric);
    }

    #[test]
    fn test_phase_start_offsets() {
        let phases = parse_tempo("3-1-2-1").unwrap();
        assert_eq!(phases.phase_start(Phase::Eccentric), 0);
        assert_eq!(phases.phase_start(Phase::PauseBottom), 3);
        assert_eq!(phases.phase_start(Phase::Concentric), 4);
        assert_eq!(phases.phase_start(Phase::PauseTop), 6);
    }

    #[test]
    fn test_phase_at_time_checks_rep_range() {
        assert_eq!(
            phase_at_time("3-1-1-0", 2, 2, 3.5),
            Some(RepPosition {
                rep_number: 2,
                phase: Phase::PauseBottom
            })
        );
        assert_eq!(phase_at_time("3-1-1-0", 0, 2, 1.0), None);
        assert_eq!(phase_at_time("3-1-1-0", 3, 2, 1.0), None);
        assert_eq!(phase_at_time("bogus", 1, 2, 1.0), None);
        assert_eq!(phase_at_time("3-1-1-0", 1, 2, -0.5), None);
    }
}
