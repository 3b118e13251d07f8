//! Elapsed-time baseline
//!
//! Active time in a set is never stored; it is derived from a start mark and
//! an accumulator of time that should not count:
//!
//! ```text
//! elapsed_ms = now_ms - start_ms - paused_accumulator_ms
//! ```
//!
//! Pausing grows the accumulator by the length of the pause. Skipping ahead
//! shrinks it by the skip distance (it may go negative). All times are
//! milliseconds on one monotonic clock.

/// Start mark plus accumulated excluded time for one set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Baseline {
    start_ms: u64,
    paused_accumulator_ms: i64,
    paused_at_ms: Option<u64>,
}

impl Baseline {
    /// Baseline for a set starting at `now_ms`
    pub fn start(now_ms: u64) -> Self {
        Self {
            start_ms: now_ms,
            paused_accumulator_ms: 0,
            paused_at_ms: None,
        }
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn paused_accumulator_ms(&self) -> i64 {
        self.paused_accumulator_ms
    }

    pub fn paused_at_ms(&self) -> Option<u64> {
        self.paused_at_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at_ms.is_some()
    }

    /// Active milliseconds at `now_ms`. Frozen at the pause mark while paused.
    pub fn elapsed_ms(&self, now_ms: u64) -> i64 {
        let reference = self.paused_at_ms.unwrap_or(now_ms);
        reference as i64 - self.start_ms as i64 - self.paused_accumulator_ms
    }

    /// Active seconds at `now_ms`, never negative
    pub fn elapsed_seconds(&self, now_ms: u64) -> f64 {
        self.elapsed_ms(now_ms).max(0) as f64 / 1000.0
    }

    /// Mark the start of a pause. Returns false if already paused.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        if self.paused_at_ms.is_some() {
            return false;
        }
        self.paused_at_ms = Some(now_ms);
        true
    }

    /// End a pause, folding its length into the accumulator.
    ///
    /// Returns the pause length, or `None` if not paused.
    pub fn resume(&mut self, now_ms: u64) -> Option<u64> {
        let paused_at = self.paused_at_ms.take()?;
        let pause_ms = now_ms.saturating_sub(paused_at);
        self.paused_accumulator_ms += pause_ms as i64;
        Some(pause_ms)
    }

    /// Advance derived elapsed time by `delta_ms` without touching the clock.
    ///
    /// Negative deltas are ignored: elapsed time only ever moves forward.
    pub fn shift_by(&mut self, delta_ms: i64) {
        self.paused_accumulator_ms -= delta_ms.max(0);
    }

    /// Milliseconds from `now_ms` until active time reaches `trigger_ms`.
    ///
    /// `None` when that moment has already passed.
    pub fn delay_until(&self, now_ms: u64, trigger_ms: u64) -> Option<u64> {
        let delay = trigger_ms as i64 - self.elapsed_ms(now_ms);
        if delay < 0 {
            None
        } else {
            Some(delay as u64)
        }
    }
}
