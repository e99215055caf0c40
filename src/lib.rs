//! Automatic pre-heating for 3D printer hosts.
//!
//! * [`scanner`] - first nozzle/bed/chamber setpoints in a G-code file
//! * [`observer`] - last heater targets confirmed by telemetry
//! * [`engine`] - trigger handling and heater command emission
//! * [`settings_store`] - TOML and in-memory settings backends
//! * [`host`] - event queue, shared engine handle and command sink for hosts

pub mod engine;
pub mod error;
pub mod host;
pub mod observer;
pub mod scanner;
pub mod settings_store;

pub use engine::{PreheatEngine, PreheatOutcome, SkipReason};
pub use error::{PreheatError, ScanError};
pub use observer::TemperatureObserver;
pub use scanner::{FileSetpointScanner, ScanOutcome, ScanStop};
pub use settings_store::{MemorySettingsStore, TomlSettingsStore};

pub use preheat_shared::config::{PreheatSettings, SetpointConfig};
pub use preheat_shared::{FileOrigin, HeaterRole, HeaterTarget, ScanResult, TemperatureSnapshot, TriggerEvent};
