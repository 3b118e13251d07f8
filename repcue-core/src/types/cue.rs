//! Cue types
//!
//! A [`Cue`] is one timed piece of feedback within a set. When its moment
//! arrives it is handed to the playback side as a [`CueScript`].

use crate::types::Phase;

/// What a cue is announcing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CueKind {
    /// A second of the eccentric count ("3", "2", "1")
    Countdown,
    /// Entry into a phase ("hold", "up", "squeeze"), also the opening cue
    PhaseChange,
    /// Start of a new rep ("Rep 2")
    RepAnnounce,
    /// Motivation near the end, also the closing cue
    Encouragement,
}

impl CueKind {
    pub fn name(&self) -> &'static str {
        match self {
            CueKind::Countdown => "countdown",
            CueKind::PhaseChange => "phase_change",
            CueKind::RepAnnounce => "rep_announce",
            CueKind::Encouragement => "encouragement",
        }
    }
}

/// A single scheduled unit of feedback.
///
/// `trigger_at_seconds` is measured in active time from the start of the set;
/// time spent paused is never part of it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cue {
    pub text: String,
    pub trigger_at_seconds: u32,
    pub kind: CueKind,
    pub phase: Option<Phase>,
    pub rep_number: Option<u32>,
    /// Silence to leave after speaking this cue
    pub pause_after_ms: u32,
}

impl Cue {
    pub fn new(text: impl Into<String>, trigger_at_seconds: u32, kind: CueKind) -> Self {
        Self {
            text: text.into(),
            trigger_at_seconds,
            kind,
            phase: None,
            rep_number: None,
            pause_after_ms: 0,
        }
    }

    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn with_rep(mut self, rep_number: u32) -> Self {
        self.rep_number = Some(rep_number);
        self
    }

    pub fn with_pause_after(mut self, pause_after_ms: u32) -> Self {
        self.pause_after_ms = pause_after_ms;
        self
    }

    /// Trigger point in milliseconds of active time
    pub fn trigger_at_ms(&self) -> u64 {
        self.trigger_at_seconds as u64 * 1000
    }
}

/// Playback priority. Higher priorities are spoken before lower ones that are
/// still queued, but never cut off something already being spoken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CuePriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// One spoken segment followed by a stretch of silence
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CueSegment {
    pub text: String,
    pub pause_after_ms: u32,
}

/// What the playback engine receives: segments spoken in order
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CueScript {
    pub segments: Vec<CueSegment>,
    pub priority: CuePriority,
}

impl CueScript {
    pub fn new(priority: CuePriority) -> Self {
        Self {
            segments: Vec::new(),
            priority,
        }
    }

    pub fn segment(mut self, text: impl Into<String>, pause_after_ms: u32) -> Self {
        self.segments.push(CueSegment {
            text: text.into(),
            pause_after_ms,
        });
        self
    }

    /// A single-segment, highest-priority script for a timed cue
    pub fn from_cue(cue: &Cue) -> Self {
        Self::new(CuePriority::Critical).segment(cue.text.clone(), cue.pause_after_ms)
    }

    /// All segment texts joined with spaces
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
