// src/settings_store.rs - Settings store backends
use preheat_shared::host_traits::{SettingValue, SettingsError, SettingsStore};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Flat TOML file holding the pre-heat settings.
///
/// Every `set` rewrites the whole file through a temporary sibling and a
/// rename. TOML has no null, so `SettingValue::Null` removes the key.
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
    values: toml::Table,
}

impl TomlSettingsStore {
    /// Load `path`, or start empty when it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str::<toml::Table>(&contents).map_err(|e| {
                tracing::error!("Failed to parse settings TOML '{}': {}", path.display(), e);
                SettingsError::Parse(e.to_string())
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No settings at '{}', starting from defaults", path.display());
                toml::Table::new()
            }
            Err(e) => {
                tracing::error!("Failed to read settings file '{}': {}", path.display(), e);
                return Err(SettingsError::Io(e));
            }
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let contents = toml::to_string(&self.values).map_err(|e| SettingsError::Serialize(e.to_string()))?;
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SettingsStore for TomlSettingsStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        match self.values.get(key)? {
            toml::Value::Boolean(b) => Some(SettingValue::Bool(*b)),
            toml::Value::Integer(i) => Some(SettingValue::Int(*i)),
            toml::Value::Float(f) => Some(SettingValue::Float(*f)),
            other => {
                tracing::warn!("Unsupported value for setting '{}': {}", key, other);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        let previous = match value {
            SettingValue::Bool(b) => self.values.insert(key.to_string(), toml::Value::Boolean(b)),
            SettingValue::Int(i) => self.values.insert(key.to_string(), toml::Value::Integer(i)),
            SettingValue::Float(f) => self.values.insert(key.to_string(), toml::Value::Float(f)),
            SettingValue::Null => self.values.remove(key),
        };
        if previous.as_ref() == self.values.get(key) {
            return Ok(());
        }
        self.save()
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// In-memory store for embedding hosts that persist settings themselves.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, SettingValue>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<SettingValue>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}
