//! Countdown clock for a timed attempt.
//!
//! The countdown holds no interval handle of its own: the host loop measures
//! wall-clock seconds (the TUI uses `Instant` deltas) and calls [`Countdown::tick`]
//! once per elapsed second. Tearing the session down is just dropping the
//! value, so nothing can fire after the session ends.

/// What a single one-second tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Normal decrement.
    Tick,
    /// The remaining time crossed the warning threshold. Fires at most once.
    LowTime,
    /// The clock reached zero. Fires exactly once; the caller must auto-submit.
    Expired,
    /// The clock already expired earlier; nothing changed.
    Finished,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: u32,
    warn_threshold: u32,
    warned: bool,
    expired: bool,
}

impl Countdown {
    pub fn new(total_secs: u32, warn_threshold_secs: u32) -> Self {
        Self {
            remaining: total_secs,
            warn_threshold: warn_threshold_secs,
            // A clock that starts at or below the threshold should not warn
            warned: total_secs <= warn_threshold_secs,
            expired: total_secs == 0,
        }
    }

    /// Advance the clock by one second. Never goes negative; after the single
    /// `Expired` event every further call returns `Finished`.
    pub fn tick(&mut self) -> TimerEvent {
        if self.expired {
            return TimerEvent::Finished;
        }

        self.remaining -= 1;

        if self.remaining == 0 {
            self.expired = true;
            return TimerEvent::Expired;
        }

        if !self.warned && self.remaining <= self.warn_threshold {
            self.warned = true;
            return TimerEvent::LowTime;
        }

        TimerEvent::Tick
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.expired
    }

    pub fn is_low(&self) -> bool {
        self.remaining <= self.warn_threshold
    }

    /// HH:MM:SS, as shown in the exam header.
    pub fn format_hms(&self) -> String {
        let hrs = self.remaining / 3600;
        let mins = (self.remaining % 3600) / 60;
        let secs = self.remaining % 60;
        format!("{:02}:{:02}:{:02}", hrs, mins, secs)
    }
}
