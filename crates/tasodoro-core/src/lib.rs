//! # Tasodoro Core Library
//!
//! The timer logic behind the Tasodoro Pomodoro timer. Every front end (the
//! CLI here, a GUI elsewhere) is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Settings**: user durations persisted through a key-value store, with
//!   change notification over a `watch` channel
//! - **Timer Engine**: a deadline-based state machine that requires the caller
//!   to periodically invoke `on_tick()`
//! - **Storage**: SQLite key-value preferences and TOML configuration
//! - **Render**: pure progress-ring layout for front ends
//!
//! ## Key Components
//!
//! - [`PomodoroEngine`]: Core timer state machine
//! - [`SettingsStore`]: Durations and classic/custom mode
//! - [`Database`]: Local preference store
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod render;
pub mod settings;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use render::{
    bar_cells, layout_ring, parse_hex_color, text_bar, Bounds, RingFill, RingLayout, RingStyle,
};
pub use settings::{SettingField, SettingValue, Settings, SettingsStore};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use timer::{
    run_ticks, Clock, EngineState, MockClock, PeriodColor, PeriodDurations, PeriodState,
    PomodoroEngine, Snapshot, SystemClock,
};
