use serde::{Deserialize, Serialize};

use crate::settings::{DEFAULT_LONG_BREAK_MINUTES, DEFAULT_SHORT_BREAK_MINUTES, DEFAULT_WORK_MINUTES};

/// Number of completed work periods that earns a long break.
pub const LONG_BREAK_INTERVAL: u32 = 4;

/// Longest period the engine will time: the largest duration settings can
/// hold (`u32::MAX` minutes). Keeps deadlines inside chrono's range.
pub const MAX_PERIOD_SECS: u64 = u32::MAX as u64 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodState {
    Stopped,
    Working,
    ShortBreak,
    LongBreak,
}

/// Semantic ring color; the renderer maps it to a concrete color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodColor {
    /// Warm accent used for work and the idle screen.
    Primary,
    /// Cool accent used for breaks.
    Secondary,
}

impl PeriodState {
    pub fn label(self) -> &'static str {
        match self {
            PeriodState::Stopped => "Press play to start",
            PeriodState::Working => "Work",
            PeriodState::ShortBreak => "Short Break",
            PeriodState::LongBreak => "Long Break",
        }
    }

    pub fn color(self) -> PeriodColor {
        match self {
            PeriodState::Stopped | PeriodState::Working => PeriodColor::Primary,
            PeriodState::ShortBreak | PeriodState::LongBreak => PeriodColor::Secondary,
        }
    }
}

/// Period lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDurations {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
}

impl PeriodDurations {
    /// The fixed 25/5/15 preset.
    pub fn classic() -> Self {
        Self::from_minutes(
            DEFAULT_WORK_MINUTES,
            DEFAULT_SHORT_BREAK_MINUTES,
            DEFAULT_LONG_BREAK_MINUTES,
        )
    }

    pub fn from_minutes(work: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            work_secs: u64::from(work) * 60,
            short_break_secs: u64::from(short_break) * 60,
            long_break_secs: u64::from(long_break) * 60,
        }
    }

    /// Lengths in seconds, each capped at [`MAX_PERIOD_SECS`].
    pub fn from_secs(work: u64, short_break: u64, long_break: u64) -> Self {
        Self {
            work_secs: work,
            short_break_secs: short_break,
            long_break_secs: long_break,
        }
        .clamped()
    }

    /// Cap each length at [`MAX_PERIOD_SECS`].
    pub fn clamped(self) -> Self {
        Self {
            work_secs: self.work_secs.min(MAX_PERIOD_SECS),
            short_break_secs: self.short_break_secs.min(MAX_PERIOD_SECS),
            long_break_secs: self.long_break_secs.min(MAX_PERIOD_SECS),
        }
    }

    /// Length of `state`. Stopped pre-stages a work period.
    pub fn for_state(&self, state: PeriodState) -> u64 {
        match state {
            PeriodState::Stopped | PeriodState::Working => self.work_secs,
            PeriodState::ShortBreak => self.short_break_secs,
            PeriodState::LongBreak => self.long_break_secs,
        }
    }
}

impl Default for PeriodDurations {
    fn default() -> Self {
        Self::classic()
    }
}
