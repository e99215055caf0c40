// src/error.rs - Error types for scanning and pre-heat triggers
use preheat_shared::host_traits::{CommandError, PathError, SettingsError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read '{}' at line {line}: {source}", path.display())]
    Read {
        path: PathBuf,
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum PreheatError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}
