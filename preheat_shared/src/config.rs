//! Pre-heat configuration shared by the engine and its hosts.
//!
//! Every field maps one-to-one to a key in the host's [`SettingsStore`].
//! Missing keys are written back with their defaults on load so the host
//! UI always shows the effective configuration.
//!
//! ## Example: TOML settings file
//!
//! ```toml
//! nozzle_setpoint_default = 215
//! bed_setpoint_default = 60
//! search_nozzle = true
//! search_bed = true
//! search_chamber = false
//! max_search_lines = 2500
//! preheat_on_file_load = true
//! preheat_on_printer_connected = true
//! ```

use crate::host_traits::{SettingValue, SettingsError, SettingsStore};
use crate::{HeaterRole, HeaterTarget};
use serde::{Deserialize, Serialize};

/// Settings store keys.
pub mod keys {
    pub const NOZZLE_SETPOINT_DEFAULT: &str = "nozzle_setpoint_default";
    pub const BED_SETPOINT_DEFAULT: &str = "bed_setpoint_default";
    pub const CHAMBER_SETPOINT_DEFAULT: &str = "chamber_setpoint_default";
    pub const SEARCH_NOZZLE: &str = "search_nozzle";
    pub const SEARCH_BED: &str = "search_bed";
    pub const SEARCH_CHAMBER: &str = "search_chamber";
    pub const MAX_SEARCH_LINES: &str = "max_search_lines";
    pub const PREHEAT_ON_FILE_LOAD: &str = "preheat_on_file_load";
    pub const PREHEAT_ON_PRINTER_CONNECTED: &str = "preheat_on_printer_connected";
    pub const PREHEAT_ON_STARTUP: &str = "preheat_on_startup";
    pub const USE_LAST_USED_TOOL_TEMPERATURE: &str = "use_last_used_tool_temperature";
    pub const USE_LAST_USED_BED_TEMPERATURE: &str = "use_last_used_bed_temperature";
    pub const CHECK_BEDREADY_BEFORE_PREHEAT: &str = "check_bedready_before_preheat";
    pub const LAST_BED_TEMP_SETPOINT: &str = "last_bed_temp_setpoint";
    pub const LAST_TOOL_TEMP_SETPOINT: &str = "last_tool_temp_setpoint";
}

/// Defaults and search switches for scanning a print file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SetpointConfig {
    #[serde(default = "default_nozzle_setpoint")]
    pub nozzle_setpoint_default: HeaterTarget,
    #[serde(default = "default_bed_setpoint")]
    pub bed_setpoint_default: HeaterTarget,
    #[serde(default)]
    pub chamber_setpoint_default: HeaterTarget,
    #[serde(default = "default_true")]
    pub search_nozzle: bool,
    #[serde(default = "default_true")]
    pub search_bed: bool,
    #[serde(default)]
    pub search_chamber: bool,
    /// Highest 0-based line index inspected. `None` or `0` scans the whole file.
    #[serde(default = "default_max_search_lines")]
    pub max_search_lines: Option<u64>,
}

impl Default for SetpointConfig {
    fn default() -> Self {
        Self {
            nozzle_setpoint_default: default_nozzle_setpoint(),
            bed_setpoint_default: default_bed_setpoint(),
            chamber_setpoint_default: None,
            search_nozzle: true,
            search_bed: true,
            search_chamber: false,
            max_search_lines: default_max_search_lines(),
        }
    }
}

impl SetpointConfig {
    pub fn default_for(&self, role: HeaterRole) -> HeaterTarget {
        match role {
            HeaterRole::Nozzle => self.nozzle_setpoint_default,
            HeaterRole::Bed => self.bed_setpoint_default,
            HeaterRole::Chamber => self.chamber_setpoint_default,
        }
    }

    pub fn searches(&self, role: HeaterRole) -> bool {
        match role {
            HeaterRole::Nozzle => self.search_nozzle,
            HeaterRole::Bed => self.search_bed,
            HeaterRole::Chamber => self.search_chamber,
        }
    }

    /// Effective line budget; zero means unbounded.
    pub fn search_budget(&self) -> Option<u64> {
        self.max_search_lines.filter(|n| *n > 0)
    }
}

/// Complete pre-heat configuration: setpoint defaults plus trigger switches.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PreheatSettings {
    #[serde(flatten)]
    pub setpoints: SetpointConfig,
    #[serde(default = "default_true")]
    pub preheat_on_file_load: bool,
    #[serde(default = "default_true")]
    pub preheat_on_printer_connected: bool,
    #[serde(default)]
    pub preheat_on_startup: bool,
    #[serde(default)]
    pub use_last_used_tool_temperature: bool,
    #[serde(default)]
    pub use_last_used_bed_temperature: bool,
    #[serde(default)]
    pub check_bedready_before_preheat: bool,
}

impl Default for PreheatSettings {
    fn default() -> Self {
        Self {
            setpoints: SetpointConfig::default(),
            preheat_on_file_load: true,
            preheat_on_printer_connected: true,
            preheat_on_startup: false,
            use_last_used_tool_temperature: false,
            use_last_used_bed_temperature: false,
            check_bedready_before_preheat: false,
        }
    }
}

impl PreheatSettings {
    /// All settings as store entries, in a stable order.
    pub fn entries(&self) -> Vec<(&'static str, SettingValue)> {
        let sp = &self.setpoints;
        vec![
            (keys::NOZZLE_SETPOINT_DEFAULT, sp.nozzle_setpoint_default.into()),
            (keys::BED_SETPOINT_DEFAULT, sp.bed_setpoint_default.into()),
            (keys::CHAMBER_SETPOINT_DEFAULT, sp.chamber_setpoint_default.into()),
            (keys::SEARCH_NOZZLE, sp.search_nozzle.into()),
            (keys::SEARCH_BED, sp.search_bed.into()),
            (keys::SEARCH_CHAMBER, sp.search_chamber.into()),
            (keys::MAX_SEARCH_LINES, sp.max_search_lines.into()),
            (keys::PREHEAT_ON_FILE_LOAD, self.preheat_on_file_load.into()),
            (keys::PREHEAT_ON_PRINTER_CONNECTED, self.preheat_on_printer_connected.into()),
            (keys::PREHEAT_ON_STARTUP, self.preheat_on_startup.into()),
            (keys::USE_LAST_USED_TOOL_TEMPERATURE, self.use_last_used_tool_temperature.into()),
            (keys::USE_LAST_USED_BED_TEMPERATURE, self.use_last_used_bed_temperature.into()),
            (keys::CHECK_BEDREADY_BEFORE_PREHEAT, self.check_bedready_before_preheat.into()),
        ]
    }

    /// Write defaults for every key the store does not hold yet.
    ///
    /// Null defaults are skipped: an absent key already reads as "no target".
    /// Keys holding a value of the wrong type are left for the user to fix.
    pub fn populate_defaults(store: &mut dyn SettingsStore) -> Result<usize, SettingsError> {
        let mut written = 0;
        for (key, value) in Self::default().entries() {
            if value.is_null() || store.contains(key) {
                continue;
            }
            tracing::debug!("Populating missing setting '{}' = {:?}", key, value);
            store.set(key, value)?;
            written += 1;
        }
        Ok(written)
    }

    /// Read the settings from `store`, falling back to defaults for missing
    /// or mistyped values.
    pub fn from_store(store: &dyn SettingsStore) -> Self {
        let defaults = Self::default();
        let d = &defaults.setpoints;
        Self {
            setpoints: SetpointConfig {
                nozzle_setpoint_default: read_target(store, keys::NOZZLE_SETPOINT_DEFAULT, d.nozzle_setpoint_default),
                bed_setpoint_default: read_target(store, keys::BED_SETPOINT_DEFAULT, d.bed_setpoint_default),
                chamber_setpoint_default: read_target(store, keys::CHAMBER_SETPOINT_DEFAULT, d.chamber_setpoint_default),
                search_nozzle: read_bool(store, keys::SEARCH_NOZZLE, d.search_nozzle),
                search_bed: read_bool(store, keys::SEARCH_BED, d.search_bed),
                search_chamber: read_bool(store, keys::SEARCH_CHAMBER, d.search_chamber),
                max_search_lines: read_budget(store, d.max_search_lines),
            },
            preheat_on_file_load: read_bool(store, keys::PREHEAT_ON_FILE_LOAD, defaults.preheat_on_file_load),
            preheat_on_printer_connected: read_bool(
                store,
                keys::PREHEAT_ON_PRINTER_CONNECTED,
                defaults.preheat_on_printer_connected,
            ),
            preheat_on_startup: read_bool(store, keys::PREHEAT_ON_STARTUP, defaults.preheat_on_startup),
            use_last_used_tool_temperature: read_bool(
                store,
                keys::USE_LAST_USED_TOOL_TEMPERATURE,
                defaults.use_last_used_tool_temperature,
            ),
            use_last_used_bed_temperature: read_bool(
                store,
                keys::USE_LAST_USED_BED_TEMPERATURE,
                defaults.use_last_used_bed_temperature,
            ),
            check_bedready_before_preheat: read_bool(
                store,
                keys::CHECK_BEDREADY_BEFORE_PREHEAT,
                defaults.check_bedready_before_preheat,
            ),
        }
    }

    pub fn log_all(&self) {
        for (key, value) in self.entries() {
            tracing::debug!("  {} = {:?}", key, value);
        }
    }
}

fn read_target(store: &dyn SettingsStore, key: &str, default: HeaterTarget) -> HeaterTarget {
    match store.get(key) {
        None => default,
        Some(SettingValue::Null) => None,
        Some(value) => match value.as_f64() {
            Some(t) if t >= 0.0 => Some(t),
            _ => {
                tracing::warn!("Ignoring invalid setpoint '{}' = {:?}", key, value);
                default
            }
        },
    }
}

fn read_bool(store: &dyn SettingsStore, key: &str, default: bool) -> bool {
    match store.get(key) {
        None => default,
        Some(value) => value.as_bool().unwrap_or_else(|| {
            tracing::warn!("Ignoring invalid switch '{}' = {:?}", key, value);
            default
        }),
    }
}

fn read_budget(store: &dyn SettingsStore, default: Option<u64>) -> Option<u64> {
    match store.get(keys::MAX_SEARCH_LINES) {
        None => default,
        Some(SettingValue::Null) => None,
        Some(value) => match value.as_u64() {
            Some(n) => Some(n),
            None => {
                tracing::warn!("Ignoring invalid search budget {:?}", value);
                default
            }
        },
    }
}

fn default_true() -> bool { true }
fn default_nozzle_setpoint() -> HeaterTarget { Some(215.0) }
fn default_bed_setpoint() -> HeaterTarget { Some(60.0) }
fn default_max_search_lines() -> Option<u64> { Some(2500) }
