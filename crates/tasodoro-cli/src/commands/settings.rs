use clap::Subcommand;
use serde::Serialize;
use tasodoro_core::{Database, SettingField, Settings, SettingsStore};

use super::{load_engine, save_engine};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print one setting
    Get {
        /// Field name (classic, work, short-break, long-break)
        field: SettingField,
    },
    /// Change one setting; the timer returns to idle
    Set {
        /// Field name (classic, work, short-break, long-break)
        field: SettingField,
        /// `true`/`false` for classic, minutes for durations
        value: String,
    },
    /// Print all settings as JSON
    List,
    /// Restore the classic 25/5/15 defaults
    Reset,
}

#[derive(Serialize)]
struct SettingsView {
    #[serde(flatten)]
    settings: Settings,
    is_custom_mode: bool,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut store = SettingsStore::open(&db)?;

    match action {
        SettingsAction::Get { field } => {
            println!("{}", store.settings().value(field));
        }
        SettingsAction::Set { field, value } => {
            let mut engine = load_engine(&db, &store);
            store.set_str(field, &value)?;
            if engine.poll_settings().is_some() {
                save_engine(&db, &engine)?;
            }
            println!("ok");
        }
        SettingsAction::List => {
            let settings = store.settings();
            let view = SettingsView {
                settings,
                is_custom_mode: settings.is_custom_mode(),
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        SettingsAction::Reset => {
            let mut engine = load_engine(&db, &store);
            store.reset_to_defaults()?;
            if engine.poll_settings().is_some() {
                save_engine(&db, &engine)?;
            }
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
