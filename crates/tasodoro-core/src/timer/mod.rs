mod clock;
mod display;
mod engine;
mod period;
mod ticker;

pub use clock::{Clock, MockClock, SystemClock};
pub use display::{format_remaining, progress_fraction};
pub use engine::{EngineState, PomodoroEngine, Snapshot};
pub use period::{
    PeriodColor, PeriodDurations, PeriodState, LONG_BREAK_INTERVAL, MAX_PERIOD_SECS,
};
pub use ticker::run_ticks;
