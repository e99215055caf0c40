// preheat_shared: shared traits and types for the pre-heat engine and its hosts

pub mod config;
pub mod event_interface;
pub mod file_manager;
pub mod gcode_utils;
pub mod host_traits;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Setpoints below this are cool-down/off commands, not print targets.
pub const MINIMAL_SETPOINT_TEMPERATURE: f64 = 20.0;

/// Target temperature in °C. `None` means "do not command this heater".
pub type HeaterTarget = Option<f64>;

/// Telemetry reading per channel: `(current, target)`.
pub type HeaterReading = (Option<f64>, Option<f64>);

/// One telemetry snapshot, e.g. `{"B": (45.2, 60.0), "T0": (178.9, 210.0)}`.
pub type TemperatureSnapshot = BTreeMap<String, HeaterReading>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaterRole {
    Nozzle,
    Bed,
    Chamber,
}

impl HeaterRole {
    pub const ALL: [HeaterRole; 3] = [HeaterRole::Nozzle, HeaterRole::Bed, HeaterRole::Chamber];

    /// G-code used to set this heater without waiting.
    pub fn set_command(&self) -> &'static str {
        match self {
            HeaterRole::Nozzle => "M104",
            HeaterRole::Bed => "M140",
            HeaterRole::Chamber => "M141",
        }
    }

    /// G-code used to set this heater and wait for it.
    pub fn wait_command(&self) -> &'static str {
        match self {
            HeaterRole::Nozzle => "M109",
            HeaterRole::Bed => "M190",
            HeaterRole::Chamber => "M191",
        }
    }
}

impl fmt::Display for HeaterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaterRole::Nozzle => write!(f, "Nozzle"),
            HeaterRole::Bed => write!(f, "Bed"),
            HeaterRole::Chamber => write!(f, "Chamber"),
        }
    }
}

/// Resolved targets for all three heaters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub nozzle: HeaterTarget,
    pub bed: HeaterTarget,
    pub chamber: HeaterTarget,
}

impl ScanResult {
    pub fn new(nozzle: HeaterTarget, bed: HeaterTarget, chamber: HeaterTarget) -> Self {
        Self { nozzle, bed, chamber }
    }

    /// Result of a failed scan: nothing gets heated.
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn get(&self, role: HeaterRole) -> HeaterTarget {
        match role {
            HeaterRole::Nozzle => self.nozzle,
            HeaterRole::Bed => self.bed,
            HeaterRole::Chamber => self.chamber,
        }
    }

    pub fn set(&mut self, role: HeaterRole, target: HeaterTarget) {
        match role {
            HeaterRole::Nozzle => self.nozzle = target,
            HeaterRole::Bed => self.bed = target,
            HeaterRole::Chamber => self.chamber = target,
        }
    }
}

/// Where a selected print file lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrigin {
    Local,
    SdCard,
}

impl fmt::Display for FileOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOrigin::Local => write!(f, "local"),
            FileOrigin::SdCard => write!(f, "sdcard"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerEvent {
    FileSelected { origin: FileOrigin, path: String },
    PrinterConnected,
    ProcessStartup,
}

/// Last heater targets confirmed through telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservedTemperatureState {
    pub last_bed: HeaterTarget,
    pub last_tool: HeaterTarget,
}
