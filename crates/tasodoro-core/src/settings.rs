//! User-configurable timer durations.
//!
//! [`SettingsStore`] owns the current [`Settings`], writes every change
//! through to a [`KeyValueStore`] immediately, and publishes the new value on
//! a `watch` channel. The timer engine holds a receiver and never writes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::{Result, ValidationError};
use crate::storage::KeyValueStore;
use crate::timer::PeriodDurations;

pub const DEFAULT_CLASSIC_MODE: bool = true;
pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;

/// Timer settings. Durations are in minutes.
///
/// In classic mode the custom durations are kept but ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub is_classic_mode: bool,
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            is_classic_mode: DEFAULT_CLASSIC_MODE,
            work_duration: DEFAULT_WORK_MINUTES,
            short_break_duration: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_duration: DEFAULT_LONG_BREAK_MINUTES,
        }
    }
}

impl Settings {
    pub fn is_custom_mode(&self) -> bool {
        !self.is_classic_mode
    }

    /// Durations the engine should run with.
    pub fn durations(&self) -> PeriodDurations {
        if self.is_classic_mode {
            PeriodDurations::classic()
        } else {
            PeriodDurations::from_minutes(
                self.work_duration,
                self.short_break_duration,
                self.long_break_duration,
            )
        }
    }

    pub fn value(&self, field: SettingField) -> SettingValue {
        match field {
            SettingField::ClassicMode => SettingValue::Bool(self.is_classic_mode),
            SettingField::WorkDuration => SettingValue::Minutes(self.work_duration),
            SettingField::ShortBreakDuration => SettingValue::Minutes(self.short_break_duration),
            SettingField::LongBreakDuration => SettingValue::Minutes(self.long_break_duration),
        }
    }

    fn assign(&mut self, field: SettingField, value: SettingValue) {
        match (field, value) {
            (SettingField::ClassicMode, SettingValue::Bool(v)) => self.is_classic_mode = v,
            (SettingField::WorkDuration, SettingValue::Minutes(v)) => self.work_duration = v,
            (SettingField::ShortBreakDuration, SettingValue::Minutes(v)) => {
                self.short_break_duration = v
            }
            (SettingField::LongBreakDuration, SettingValue::Minutes(v)) => {
                self.long_break_duration = v
            }
            // validate() rules out mismatched pairs
            _ => {}
        }
    }
}

/// One persisted settings field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingField {
    ClassicMode,
    WorkDuration,
    ShortBreakDuration,
    LongBreakDuration,
}

impl SettingField {
    pub const ALL: [SettingField; 4] = [
        SettingField::ClassicMode,
        SettingField::WorkDuration,
        SettingField::ShortBreakDuration,
        SettingField::LongBreakDuration,
    ];

    /// Storage key.
    pub fn key(self) -> &'static str {
        match self {
            SettingField::ClassicMode => "is_classic_mode",
            SettingField::WorkDuration => "work_duration",
            SettingField::ShortBreakDuration => "short_break_duration",
            SettingField::LongBreakDuration => "long_break_duration",
        }
    }

    pub fn default_value(self) -> SettingValue {
        Settings::default().value(self)
    }

    /// Parse user or stored text into a value for this field, validated.
    pub fn parse_value(self, raw: &str) -> Result<SettingValue, ValidationError> {
        let raw = raw.trim();
        let value = match self {
            SettingField::ClassicMode => raw
                .parse::<bool>()
                .map(SettingValue::Bool)
                .map_err(|_| self.invalid(format!("expected true or false, got '{raw}'")))?,
            _ => raw
                .parse::<u32>()
                .map(SettingValue::Minutes)
                .map_err(|_| {
                    self.invalid(format!("expected a whole number of minutes, got '{raw}'"))
                })?,
        };
        self.validate(value)?;
        Ok(value)
    }

    /// Check that `value` has the right shape and range for this field.
    pub fn validate(self, value: SettingValue) -> Result<(), ValidationError> {
        match (self, value) {
            (SettingField::ClassicMode, SettingValue::Bool(_)) => Ok(()),
            (SettingField::ClassicMode, SettingValue::Minutes(_)) => {
                Err(self.invalid("expected true or false".into()))
            }
            (_, SettingValue::Bool(_)) => Err(self.invalid("expected a number of minutes".into())),
            (_, SettingValue::Minutes(0)) => {
                Err(self.invalid("must be a positive number of minutes".into()))
            }
            (_, SettingValue::Minutes(_)) => Ok(()),
        }
    }

    fn invalid(self, message: String) -> ValidationError {
        ValidationError::InvalidValue {
            field: self.key().to_string(),
            message,
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SettingField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        match normalized.as_str() {
            "is_classic_mode" | "classic_mode" | "classic" => Ok(SettingField::ClassicMode),
            "work_duration" | "work" => Ok(SettingField::WorkDuration),
            "short_break_duration" | "short_break" => Ok(SettingField::ShortBreakDuration),
            "long_break_duration" | "long_break" => Ok(SettingField::LongBreakDuration),
            _ => Err(ValidationError::UnknownField(s.to_string())),
        }
    }
}

/// A typed settings value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Minutes(u32),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{v}"),
            SettingValue::Minutes(v) => write!(f, "{v}"),
        }
    }
}

/// Settings service over a key-value store.
pub struct SettingsStore<S> {
    store: S,
    current: Settings,
    notifier: watch::Sender<Settings>,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Open the store and load the persisted settings.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    pub fn open(store: S) -> Result<Self> {
        let current = read_settings(&store)?;
        let (notifier, _) = watch::channel(current);
        Ok(Self {
            store,
            current,
            notifier,
        })
    }

    /// Re-read every field from storage. Missing or unreadable values fall
    /// back to their defaults. Subscribers are notified if anything changed.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read; the in-memory
    /// settings are left as they were.
    pub fn load(&mut self) -> Result<Settings> {
        let loaded = read_settings(&self.store)?;
        self.replace(loaded);
        Ok(loaded)
    }

    pub fn settings(&self) -> Settings {
        self.current
    }

    pub fn is_custom_mode(&self) -> bool {
        self.current.is_custom_mode()
    }

    /// Subscribe to settings changes. The receiver starts at the current
    /// value, marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.notifier.subscribe()
    }

    /// Validate, persist, then publish one field.
    ///
    /// Setting a field to its current value is a no-op.
    ///
    /// # Errors
    /// Returns a validation error for out-of-range or mistyped values, or the
    /// storage error if the write fails. In both cases the previous value is
    /// kept and nobody is notified.
    pub fn set(&mut self, field: SettingField, value: SettingValue) -> Result<()> {
        field.validate(value)?;
        if self.current.value(field) == value {
            return Ok(());
        }

        if let Err(e) = self.store.set(field.key(), &value.to_string()) {
            tracing::warn!(field = %field, error = %e, "failed to persist setting");
            return Err(e);
        }

        let mut next = self.current;
        next.assign(field, value);
        tracing::info!(field = %field, value = %value, "setting changed");
        self.replace(next);
        Ok(())
    }

    /// Parse `raw` for `field` and set it.
    ///
    /// # Errors
    /// See [`SettingsStore::set`].
    pub fn set_str(&mut self, field: SettingField, raw: &str) -> Result<()> {
        let value = field.parse_value(raw)?;
        self.set(field, value)
    }

    pub fn set_classic_mode(&mut self, enabled: bool) -> Result<()> {
        self.set(SettingField::ClassicMode, SettingValue::Bool(enabled))
    }

    pub fn set_work_duration(&mut self, minutes: u32) -> Result<()> {
        self.set(SettingField::WorkDuration, SettingValue::Minutes(minutes))
    }

    pub fn set_short_break_duration(&mut self, minutes: u32) -> Result<()> {
        self.set(SettingField::ShortBreakDuration, SettingValue::Minutes(minutes))
    }

    pub fn set_long_break_duration(&mut self, minutes: u32) -> Result<()> {
        self.set(SettingField::LongBreakDuration, SettingValue::Minutes(minutes))
    }

    /// Write the defaults for every field.
    ///
    /// # Errors
    /// Stops at the first storage failure; fields written before it keep
    /// their new value.
    pub fn reset_to_defaults(&mut self) -> Result<()> {
        for field in SettingField::ALL {
            self.set(field, field.default_value())?;
        }
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn replace(&mut self, next: Settings) {
        if next != self.current {
            self.current = next;
            self.notifier.send_replace(next);
        }
    }
}

fn read_settings<S: KeyValueStore>(store: &S) -> Result<Settings> {
    let mut settings = Settings::default();
    for field in SettingField::ALL {
        let Some(raw) = store.get(field.key())? else {
            continue;
        };
        match field.parse_value(&raw) {
            Ok(value) => settings.assign(field, value),
            Err(e) => {
                tracing::warn!(field = %field, error = %e, "ignoring stored value, using default");
            }
        }
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::error::{CoreError, DatabaseError};
    use crate::storage::MemoryStore;

    /// Store whose writes always fail.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
    }

    /// Store whose reads fail once `locked` is set.
    struct LockedStore {
        inner: MemoryStore,
        locked: AtomicBool,
    }

    impl KeyValueStore for LockedStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.locked.load(Ordering::SeqCst) {
                return Err(DatabaseError::Locked.into());
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.inner.set(key, value)
        }
    }

    #[test]
    fn load_uses_defaults_when_empty() {
        let store = SettingsStore::open(MemoryStore::new()).unwrap();
        assert_eq!(store.settings(), Settings::default());
        assert!(!store.is_custom_mode());
        assert!(store.store().is_empty());
    }

    #[test]
    fn load_reads_stored_values() {
        let kv = MemoryStore::new();
        kv.set("is_classic_mode", "false").unwrap();
        kv.set("work_duration", "50").unwrap();
        let store = SettingsStore::open(kv).unwrap();
        let s = store.settings();
        assert!(store.is_custom_mode());
        assert_eq!(s.work_duration, 50);
        assert_eq!(s.short_break_duration, DEFAULT_SHORT_BREAK_MINUTES);
    }

    #[test]
    fn corrupt_stored_value_falls_back_to_default() {
        let kv = MemoryStore::new();
        kv.set("work_duration", "-3").unwrap();
        kv.set("long_break_duration", "0").unwrap();
        let store = SettingsStore::open(kv).unwrap();
        assert_eq!(store.settings().work_duration, DEFAULT_WORK_MINUTES);
        assert_eq!(store.settings().long_break_duration, DEFAULT_LONG_BREAK_MINUTES);
    }

    #[test]
    fn set_persists_immediately() {
        let mut store = SettingsStore::open(MemoryStore::new()).unwrap();
        store.set_work_duration(40).unwrap();
        assert_eq!(store.store().get("work_duration").unwrap().as_deref(), Some("40"));
        store.set_classic_mode(false).unwrap();
        assert_eq!(store.store().get("is_classic_mode").unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn set_rejects_zero_and_keeps_previous() {
        let mut store = SettingsStore::open(MemoryStore::new()).unwrap();
        store.set_short_break_duration(7).unwrap();
        let err = store.set_short_break_duration(0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(store.settings().short_break_duration, 7);
    }

    #[test]
    fn set_rejects_mismatched_value_type() {
        let mut store = SettingsStore::open(MemoryStore::new()).unwrap();
        assert!(store.set(SettingField::ClassicMode, SettingValue::Minutes(3)).is_err());
        assert!(store.set(SettingField::WorkDuration, SettingValue::Bool(false)).is_err());
        assert_eq!(store.settings(), Settings::default());
    }

    #[test]
    fn set_notifies_subscribers() {
        let mut store = SettingsStore::open(MemoryStore::new()).unwrap();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());
        store.set_long_break_duration(20).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().long_break_duration, 20);
    }

    #[test]
    fn setting_same_value_does_not_notify() {
        let mut store = SettingsStore::open(MemoryStore::new()).unwrap();
        let rx = store.subscribe();
        store.set_work_duration(DEFAULT_WORK_MINUTES).unwrap();
        assert!(!rx.has_changed().unwrap());
        assert!(store.store().is_empty());
    }

    #[test]
    fn storage_failure_is_surfaced_and_state_kept() {
        let mut store = SettingsStore::open(ReadOnlyStore(MemoryStore::new())).unwrap();
        let rx = store.subscribe();
        let err = store.set_work_duration(45).unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
        assert_eq!(store.settings().work_duration, DEFAULT_WORK_MINUTES);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn load_failure_keeps_current_settings() {
        let mut store = SettingsStore::open(LockedStore {
            inner: MemoryStore::new(),
            locked: AtomicBool::new(false),
        })
        .unwrap();
        store.set_work_duration(40).unwrap();
        let rx = store.subscribe();

        store.store().inner.set("work_duration", "50").unwrap();
        store.store().locked.store(true, Ordering::SeqCst);
        let err = store.load().unwrap_err();
        assert!(matches!(err, CoreError::Database(DatabaseError::Locked)));
        assert_eq!(store.settings().work_duration, 40);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn open_surfaces_read_failure() {
        let kv = LockedStore {
            inner: MemoryStore::new(),
            locked: AtomicBool::new(true),
        };
        assert!(matches!(
            SettingsStore::open(kv),
            Err(CoreError::Database(DatabaseError::Locked))
        ));
    }

    #[test]
    fn reload_picks_up_external_writes() {
        let mut store = SettingsStore::open(MemoryStore::new()).unwrap();
        let rx = store.subscribe();
        store.store().set("short_break_duration", "9").unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.short_break_duration, 9);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn reset_to_defaults_restores_everything() {
        let mut store = SettingsStore::open(MemoryStore::new()).unwrap();
        store.set_classic_mode(false).unwrap();
        store.set_work_duration(10).unwrap();
        store.reset_to_defaults().unwrap();
        assert_eq!(store.settings(), Settings::default());
        assert_eq!(store.store().get("work_duration").unwrap().as_deref(), Some("25"));
    }

    #[test]
    fn classic_mode_ignores_custom_durations() {
        let settings = Settings {
            is_classic_mode: true,
            work_duration: 10,
            short_break_duration: 2,
            long_break_duration: 3,
        };
        assert_eq!(settings.durations(), PeriodDurations::classic());

        let custom = Settings {
            is_classic_mode: false,
            ..settings
        };
        assert_eq!(custom.durations().work_secs, 600);
        assert_eq!(custom.durations().short_break_secs, 120);
    }

    #[test]
    fn field_names_parse_leniently() {
        assert_eq!("work".parse::<SettingField>().unwrap(), SettingField::WorkDuration);
        assert_eq!(
            "short-break".parse::<SettingField>().unwrap(),
            SettingField::ShortBreakDuration
        );
        assert_eq!(
            "is_classic_mode".parse::<SettingField>().unwrap(),
            SettingField::ClassicMode
        );
        assert!("volume".parse::<SettingField>().is_err());
    }

    #[test]
    fn parse_value_validates() {
        assert_eq!(
            SettingField::WorkDuration.parse_value(" 30 ").unwrap(),
            SettingValue::Minutes(30)
        );
        assert!(SettingField::WorkDuration.parse_value("0").is_err());
        assert!(SettingField::WorkDuration.parse_value("ten").is_err());
        assert_eq!(
            SettingField::ClassicMode.parse_value("false").unwrap(),
            SettingValue::Bool(false)
        );
        assert!(SettingField::ClassicMode.parse_value("yes").is_err());
    }
}
