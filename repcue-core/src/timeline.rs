//! Cue timeline generation
//!
//! Turns a validated tempo and a [`SetConfig`] into the ordered list of cues
//! for the whole set. The output depends only on its inputs, and cue offsets
//! are in active time: pauses never appear in the timeline.

use crate::types::{Cue, CueKind, Language, Phase, SetConfig, TempoPhases};

/// Silence after the opening cue
pub const START_PAUSE_MS: u32 = 500;
/// Silence after each countdown number
pub const COUNTDOWN_PAUSE_MS: u32 = 200;
/// Silence after "hold" / "up" / "squeeze"
pub const PHASE_CHANGE_PAUSE_MS: u32 = 300;
/// Silence after "Rep N"
pub const REP_ANNOUNCE_PAUSE_MS: u32 = 300;
/// Silence after the last-rep encouragement
pub const ENCOURAGEMENT_PAUSE_MS: u32 = 500;
/// Silence after "set complete"
pub const COMPLETE_PAUSE_MS: u32 = 1000;

/// Build the cue timeline for a set.
///
/// Cues come out in non-decreasing `trigger_at_seconds` order and the last
/// one, the closing cue, sits at `target_reps × rep_duration`.
pub fn build_cue_timeline(config: &SetConfig, phases: &TempoPhases) -> Vec<Cue> {
    let language = config.language;
    let rep_duration = phases.rep_duration();
    let target_reps = config.target_reps;
    let mut cues = Vec::new();

    cues.push(
        Cue::new(
            language.starting(&config.exercise_name, config.set_number),
            0,
            CueKind::PhaseChange,
        )
        .with_phase(Phase::Eccentric)
        .with_pause_after(START_PAUSE_MS),
    );

    for rep in 1..=target_reps {
        let rep_start = (rep - 1) * rep_duration;

        if rep > 1 {
            cues.push(
                Cue::new(language.rep(rep), rep_start, CueKind::RepAnnounce)
                    .with_rep(rep)
                    .with_pause_after(REP_ANNOUNCE_PAUSE_MS),
            );
        }

        for second in 0..phases.eccentric {
            cues.push(
                Cue::new(
                    language.countdown(phases.eccentric - second),
                    rep_start + second,
                    CueKind::Countdown,
                )
                .with_phase(Phase::Eccentric)
                .with_rep(rep)
                .with_pause_after(COUNTDOWN_PAUSE_MS),
            );
        }

        for phase in [Phase::PauseBottom, Phase::Concentric, Phase::PauseTop] {
            if phases.duration_of(phase) == 0 {
                continue;
            }
            cues.push(
                Cue::new(
                    phase_word(language, phase),
                    rep_start + phases.phase_start(phase),
                    CueKind::PhaseChange,
                )
                .with_phase(phase)
                .with_rep(rep)
                .with_pause_after(PHASE_CHANGE_PAUSE_MS),
            );
        }

        if rep == target_reps {
            cues.push(
                Cue::new(
                    language.last_rep(),
                    rep_start + rep_duration - 1,
                    CueKind::Encouragement,
                )
                .with_rep(rep)
                .with_pause_after(ENCOURAGEMENT_PAUSE_MS),
            );
        }
    }

    cues.push(
        Cue::new(
            language.set_complete(),
            target_reps * rep_duration,
            CueKind::Encouragement,
        )
        .with_pause_after(COMPLETE_PAUSE_MS),
    );

    debug_assert!(cues
        .windows(2)
        .all(|w| w[0].trigger_at_seconds <= w[1].trigger_at_seconds));
    cues
}

fn phase_word(language: Language, phase: Phase) -> &'static str {
    match phase {
        Phase::PauseBottom => language.hold(),
        Phase::Concentric => language.up(),
        Phase::PauseTop => language.squeeze(),
        Phase::Eccentric => "",
    }
}
