//! Pomodoro engine implementation.
//!
//! The engine is a deadline-based state machine. It does not use internal
//! threads - the caller drives it by calling `on_tick()` periodically (see
//! [`run_ticks`](super::run_ticks)). Remaining time is always derived from
//! the absolute end time, so late or missed ticks never cause drift.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Working -> ShortBreak | LongBreak -> Working -> ...
//! ```
//!
//! Periods advance on their own once the deadline passes. `stop()` pauses in
//! place; only `reset()` (or a settings change) returns to Stopped.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PomodoroEngine::new(settings.subscribe(), SystemClock);
//! engine.start();
//! // In a loop:
//! engine.on_tick(); // Returns Some(Event) when a period completes
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::clock::{Clock, SystemClock};
use super::display::{format_remaining, progress_fraction};
use super::period::{
    PeriodColor, PeriodDurations, PeriodState, LONG_BREAK_INTERVAL, MAX_PERIOD_SECS,
};
use crate::events::Event;
use crate::settings::Settings;

/// Serializable engine state.
///
/// `end_at` is only set while running; `remaining_secs` is the authoritative
/// value whenever the engine is paused or stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub current: PeriodState,
    pub total_secs: u64,
    pub remaining_secs: f64,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_pomodoros: u32,
    #[serde(default)]
    pub work_sessions: u32,
    pub durations: PeriodDurations,
}

impl EngineState {
    fn stopped(durations: PeriodDurations) -> Self {
        let total_secs = durations.for_state(PeriodState::Stopped);
        Self {
            current: PeriodState::Stopped,
            total_secs,
            remaining_secs: total_secs as f64,
            end_at: None,
            completed_pomodoros: 0,
            work_sessions: 0,
            durations,
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: PeriodState,
    pub label: String,
    pub color: PeriodColor,
    pub is_running: bool,
    pub remaining_secs: f64,
    pub total_secs: u64,
    pub time_display: String,
    /// Fraction of the period remaining: 1 at the start, 0 at the end.
    pub progress: f64,
    pub completed_pomodoros: u32,
    pub work_sessions: u32,
    pub ends_at: Option<DateTime<Utc>>,
    pub at: DateTime<Utc>,
}

/// Core timer engine.
///
/// Durations come from a settings subscription (or are fixed at
/// construction). The engine only reads settings; a change resets it to
/// Stopped the next time it is driven.
#[derive(Debug)]
pub struct PomodoroEngine<C = SystemClock> {
    state: EngineState,
    settings: Option<watch::Receiver<Settings>>,
    clock: C,
}

impl<C: Clock> PomodoroEngine<C> {
    /// Create an engine that follows `settings`. Starts Stopped.
    pub fn new(settings: watch::Receiver<Settings>, clock: C) -> Self {
        let mut engine = Self {
            state: EngineState::stopped(PeriodDurations::default()),
            settings: Some(settings),
            clock,
        };
        engine.load_settings_and_reset();
        engine
    }

    /// Create an engine with fixed durations and no settings subscription.
    pub fn with_durations(durations: PeriodDurations, clock: C) -> Self {
        Self {
            state: EngineState::stopped(durations.clamped()),
            settings: None,
            clock,
        }
    }

    /// Rebuild an engine from persisted state.
    ///
    /// The subscription's current value is treated as already applied, so
    /// restoring does not reset the timer.
    pub fn restore(
        mut state: EngineState,
        settings: Option<watch::Receiver<Settings>>,
        clock: C,
    ) -> Self {
        state.durations = state.durations.clamped();
        state.total_secs = state.total_secs.min(MAX_PERIOD_SECS);
        let total = state.total_secs as f64;
        state.remaining_secs = if state.remaining_secs.is_nan() {
            total
        } else {
            state.remaining_secs.clamp(0.0, total)
        };
        if state.current == PeriodState::Stopped {
            state.end_at = None;
        }

        let mut settings = settings;
        if let Some(rx) = settings.as_mut() {
            let _ = rx.borrow_and_update();
        }
        Self {
            state,
            settings,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine_state(&self) -> &EngineState {
        &self.state
    }

    pub fn current_state(&self) -> PeriodState {
        self.state.current
    }

    pub fn is_running(&self) -> bool {
        self.state.end_at.is_some()
    }

    pub fn remaining_secs(&self) -> f64 {
        self.state.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.state.total_secs
    }

    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        self.state.end_at
    }

    pub fn completed_pomodoros(&self) -> u32 {
        self.state.completed_pomodoros
    }

    pub fn work_sessions(&self) -> u32 {
        self.state.work_sessions
    }

    pub fn durations(&self) -> PeriodDurations {
        self.state.durations
    }

    pub fn label(&self) -> &'static str {
        self.state.current.label()
    }

    pub fn color(&self) -> PeriodColor {
        self.state.current.color()
    }

    pub fn time_display(&self) -> String {
        format_remaining(self.state.remaining_secs)
    }

    pub fn progress(&self) -> f64 {
        progress_fraction(self.state.remaining_secs, self.state.total_secs)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.current,
            label: self.label().to_string(),
            color: self.color(),
            is_running: self.is_running(),
            remaining_secs: self.state.remaining_secs,
            total_secs: self.state.total_secs,
            time_display: self.time_display(),
            progress: self.progress(),
            completed_pomodoros: self.state.completed_pomodoros,
            work_sessions: self.state.work_sessions,
            ends_at: self.state.end_at,
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume. Starting from Stopped begins a work period.
    pub fn start(&mut self) -> Option<Event> {
        self.poll_settings();
        self.begin()
    }

    /// Pause, keeping the exact remaining time.
    pub fn stop(&mut self) -> Option<Event> {
        if let Some(applied) = self.poll_settings() {
            return Some(applied);
        }
        self.halt()
    }

    /// Back to Stopped with fresh settings and zeroed counters.
    pub fn reset(&mut self) -> Option<Event> {
        self.halt();
        self.load_settings_and_reset();
        self.state.completed_pomodoros = 0;
        self.state.work_sessions = 0;
        tracing::debug!("timer reset");
        Some(Event::TimerReset {
            at: self.clock.now(),
        })
    }

    /// Call periodically while running. Returns `Some(Event::PeriodCompleted)`
    /// when the deadline has passed and the next period was started.
    pub fn on_tick(&mut self) -> Option<Event> {
        if let Some(applied) = self.poll_settings() {
            return Some(applied);
        }
        let end = self.state.end_at?;
        let left_ms = (end - self.clock.now()).num_milliseconds();
        if left_ms > 0 {
            self.state.remaining_secs = self.clamp_remaining(left_ms as f64 / 1000.0);
            None
        } else {
            self.state.remaining_secs = 0.0;
            self.transition_to_next_state()
        }
    }

    /// Finish the current period and start the next one.
    ///
    /// Called by `on_tick()` at the deadline; calling it directly skips the
    /// rest of the current period. Only finished work periods are counted.
    /// From Stopped there is nothing to finish, so this behaves like `start()`.
    pub fn transition_to_next_state(&mut self) -> Option<Event> {
        let finished = self.state.current;
        if finished == PeriodState::Stopped {
            return self.start();
        }
        self.halt();

        let next = match finished {
            PeriodState::Working => {
                if self.state.remaining_secs <= 0.0 {
                    self.state.work_sessions = self.state.work_sessions.saturating_add(1);
                    self.state.completed_pomodoros =
                        self.state.completed_pomodoros.saturating_add(1);
                }
                self.next_break()
            }
            _ => PeriodState::Working,
        };

        self.setup_period(next);
        self.begin();
        tracing::debug!(
            finished = ?finished,
            next = ?next,
            completed = self.state.completed_pomodoros,
            "period transition"
        );
        Some(Event::PeriodCompleted {
            finished,
            next,
            completed_pomodoros: self.state.completed_pomodoros,
            at: self.clock.now(),
        })
    }

    /// Apply a pending settings change, if any. The engine goes back to
    /// Stopped; counters are kept.
    pub fn poll_settings(&mut self) -> Option<Event> {
        let rx = self.settings.as_mut()?;
        if !rx.has_changed().unwrap_or(false) {
            return None;
        }
        self.halt();
        self.load_settings_and_reset();
        let d = self.state.durations;
        tracing::info!(
            work_secs = d.work_secs,
            short_break_secs = d.short_break_secs,
            long_break_secs = d.long_break_secs,
            "settings applied"
        );
        Some(Event::SettingsApplied {
            work_secs: d.work_secs,
            short_break_secs: d.short_break_secs,
            long_break_secs: d.long_break_secs,
            at: self.clock.now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(&mut self) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        if self.state.current == PeriodState::Stopped {
            self.setup_period(PeriodState::Working);
        }
        let now = self.clock.now();
        let remaining_ms = (self.state.remaining_secs * 1000.0).round() as i64;
        let end_at = Duration::try_milliseconds(remaining_ms)
            .and_then(|remaining| now.checked_add_signed(remaining))
            .unwrap_or_else(|| {
                tracing::warn!(remaining_ms, "deadline out of range, capping");
                DateTime::<Utc>::MAX_UTC
            });
        self.state.end_at = Some(end_at);
        Some(Event::TimerStarted {
            period: self.state.current,
            remaining_secs: self.state.remaining_secs,
            total_secs: self.state.total_secs,
            at: now,
        })
    }

    fn halt(&mut self) -> Option<Event> {
        let end = self.state.end_at.take()?;
        let now = self.clock.now();
        let left_ms = (end - now).num_milliseconds().max(0);
        self.state.remaining_secs = self.clamp_remaining(left_ms as f64 / 1000.0);
        Some(Event::TimerStopped {
            period: self.state.current,
            remaining_secs: self.state.remaining_secs,
            at: now,
        })
    }

    fn next_break(&self) -> PeriodState {
        if self.state.work_sessions > 0 && self.state.work_sessions % LONG_BREAK_INTERVAL == 0 {
            PeriodState::LongBreak
        } else {
            PeriodState::ShortBreak
        }
    }

    fn setup_period(&mut self, period: PeriodState) {
        self.state.current = period;
        self.state.total_secs = self.state.durations.for_state(period);
        self.state.remaining_secs = self.state.total_secs as f64;
        tracing::debug!(period = ?period, total_secs = self.state.total_secs, "period set up");
    }

    fn load_settings_and_reset(&mut self) {
        if let Some(rx) = self.settings.as_mut() {
            self.state.durations = rx.borrow_and_update().durations();
        }
        self.setup_period(PeriodState::Stopped);
    }

    fn clamp_remaining(&self, secs: f64) -> f64 {
        secs.clamp(0.0, self.state.total_secs as f64)
    }
}
