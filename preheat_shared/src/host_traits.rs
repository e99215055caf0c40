// Trait-based interfaces for the host services the pre-heat engine consumes

use crate::FileOrigin;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings parse error: {0}")]
    Parse(String),
    #[error("Settings serialize error: {0}")]
    Serialize(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathError {
    #[error("Unsupported file origin: {0}")]
    UnsupportedOrigin(FileOrigin),
    #[error("Invalid path '{0}'")]
    InvalidPath(String),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Command channel closed")]
    ChannelClosed,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BedReadinessError {
    #[error("Bed readiness check unavailable")]
    Unavailable,
    #[error("Bed readiness check failed: {0}")]
    Failed(String),
}

/// A single settings value as stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Null,
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            SettingValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Int(i) => Some(*i as f64),
            SettingValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Non-negative whole numbers only.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            SettingValue::Int(i) => u64::try_from(*i).ok(),
            SettingValue::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as u64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SettingValue::Null)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<Option<f64>> for SettingValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(SettingValue::Null, SettingValue::Float)
    }
}

impl From<Option<u64>> for SettingValue {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(v) => SettingValue::Int(i64::try_from(v).unwrap_or(i64::MAX)),
            None => SettingValue::Null,
        }
    }
}

/// Key/value settings storage owned by the host.
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<SettingValue>;
    fn set(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError>;

    /// Whether the store holds `key` at all, including values `get` cannot represent.
    fn contains(&self, key: &str) -> bool;

    fn get_bool(&self, key: &str) -> bool {
        self.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_f64())
    }

    fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.as_u64())
    }
}

/// Resolves a print file reference to its location on disk.
pub trait FilePathResolver: Send + Sync {
    fn path_on_disk(&self, origin: FileOrigin, path: &str) -> Result<PathBuf, PathError>;
}

/// Fire-and-forget channel to the printer firmware.
pub trait CommandChannel: Send + Sync {
    fn send(&self, command: &str) -> Result<(), CommandError>;
}

/// Answer of an external bed-ready check.
#[derive(Debug, Clone, PartialEq)]
pub struct BedCheck {
    pub bed_clear: bool,
    pub similarity: Option<f64>,
}

/// External check that the bed is clear of a previous print.
pub trait BedReadiness: Send + Sync {
    fn check_bed(&self) -> Result<BedCheck, BedReadinessError>;
}
