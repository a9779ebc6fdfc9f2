pub mod config;
pub mod settings;
pub mod timer;

use serde::Serialize;
use tasodoro_core::{
    Clock, Database, EngineState, Event, KeyValueStore, PomodoroEngine, SettingsStore, Snapshot,
    SystemClock,
};

const ENGINE_KEY: &str = "timer_engine";

/// What every timer-affecting command prints.
#[derive(Serialize)]
pub struct Report {
    /// What happened between the previous invocation and this one, such as
    /// a period that ran out while nobody was watching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caught_up: Option<Event>,
    pub event: Option<Event>,
    pub snapshot: Snapshot,
}

impl Report {
    pub fn new<C: Clock>(
        caught_up: Option<Event>,
        event: Option<Event>,
        engine: &PomodoroEngine<C>,
    ) -> Self {
        Self {
            caught_up,
            event,
            snapshot: engine.snapshot(),
        }
    }
}

/// Load the stored engine, or a fresh one, subscribed to `settings`.
pub fn load_engine<S: KeyValueStore>(
    db: &Database,
    settings: &SettingsStore<S>,
) -> PomodoroEngine<SystemClock> {
    if let Ok(Some(json)) = db.kv_get(ENGINE_KEY) {
        match serde_json::from_str::<EngineState>(&json) {
            Ok(state) => {
                return PomodoroEngine::restore(state, Some(settings.subscribe()), SystemClock)
            }
            Err(e) => tracing::warn!(error = %e, "discarding unreadable timer state"),
        }
    }
    PomodoroEngine::new(settings.subscribe(), SystemClock)
}

pub fn save_engine(
    db: &Database,
    engine: &PomodoroEngine<SystemClock>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(engine.engine_state())?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

pub fn print_report(report: &Report) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
