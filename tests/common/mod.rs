// Shared fakes for the host collaborators used by the integration tests
#![allow(dead_code)]

use parking_lot::Mutex;
use preheat_rs::MemorySettingsStore;
use preheat_shared::host_traits::{
    BedCheck, BedReadiness, BedReadinessError, CommandChannel, CommandError, SettingValue, SettingsError,
    SettingsStore,
};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Records every command sent; clones share the log.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    sent: Arc<Mutex<Vec<String>>>,
    attempts: Arc<Mutex<usize>>,
    fail_on: Option<usize>,
}

impl RecordingChannel {
    /// Channel that rejects only its `n`-th send (1-based).
    pub fn failing_on(n: usize) -> Self {
        Self { fail_on: Some(n), ..Self::default() }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

impl CommandChannel for RecordingChannel {
    fn send(&self, command: &str) -> Result<(), CommandError> {
        let mut attempts = self.attempts.lock();
        *attempts += 1;
        if self.fail_on == Some(*attempts) {
            return Err(CommandError::ChannelClosed);
        }
        self.sent.lock().push(command.to_string());
        Ok(())
    }
}

pub struct ClosedChannel;

impl CommandChannel for ClosedChannel {
    fn send(&self, _command: &str) -> Result<(), CommandError> {
        Err(CommandError::ChannelClosed)
    }
}

/// Settings store whose contents stay inspectable after it moved into an engine.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<MemorySettingsStore>>,
    writes: Arc<Mutex<usize>>,
}

impl SharedStore {
    pub fn new(store: MemorySettingsStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
            writes: Arc::default(),
        }
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock()
    }

    /// Change a value behind the engine's back, as a host settings dialog would.
    pub fn put(&self, key: &str, value: SettingValue) {
        self.inner.lock().set(key, value).unwrap();
    }
}

impl SettingsStore for SharedStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.inner.lock().get(key)
    }

    fn set(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        *self.writes.lock() += 1;
        self.inner.lock().set(key, value)
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }
}

/// Store that reads fine but cannot persist anything.
#[derive(Default)]
pub struct ReadOnlyStore {
    pub inner: MemorySettingsStore,
}

impl SettingsStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, _value: SettingValue) -> Result<(), SettingsError> {
        Err(SettingsError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("read-only store: {}", key),
        )))
    }

    fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }
}

pub struct FixedBedCheck(pub Result<BedCheck, BedReadinessError>);

impl FixedBedCheck {
    pub fn clear() -> Self {
        Self(Ok(BedCheck { bed_clear: true, similarity: Some(0.99) }))
    }

    pub fn blocked() -> Self {
        Self(Ok(BedCheck { bed_clear: false, similarity: Some(0.42) }))
    }
}

impl BedReadiness for FixedBedCheck {
    fn check_bed(&self) -> Result<BedCheck, BedReadinessError> {
        self.0.clone()
    }
}

/// Write `lines` verbatim to a temporary G-code file.
pub fn gcode_file(lines: &[&str]) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".gcode").tempfile().unwrap();
    for line in lines {
        file.write_all(line.as_bytes()).unwrap();
    }
    file.flush().unwrap();
    file
}
