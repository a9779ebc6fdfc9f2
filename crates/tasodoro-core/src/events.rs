use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::PeriodState;

/// Every state change in the engine produces an Event.
/// Renderers poll `snapshot()`; hosts react to events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        period: PeriodState,
        remaining_secs: f64,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        period: PeriodState,
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    /// A period ran out and the next one started automatically.
    PeriodCompleted {
        finished: PeriodState,
        next: PeriodState,
        completed_pomodoros: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// New settings were picked up; the engine is back at Stopped.
    SettingsApplied {
        work_secs: u64,
        short_break_secs: u64,
        long_break_secs: u64,
        at: DateTime<Utc>,
    },
}
