// src/observer.rs - Track last heater targets confirmed by telemetry
use preheat_shared::config::keys;
use preheat_shared::host_traits::{SettingsError, SettingsStore};
use preheat_shared::{HeaterTarget, MINIMAL_SETPOINT_TEMPERATURE, ObservedTemperatureState, TemperatureSnapshot};

/// Telemetry channel reporting the heated bed.
pub const BED_CHANNEL: &str = "B";
/// Telemetry channel reporting the first tool.
pub const TOOL_CHANNEL: &str = "T0";

#[derive(Debug, Clone, Default)]
pub struct TemperatureObserver {
    state: ObservedTemperatureState,
}

impl TemperatureObserver {
    pub fn new(state: ObservedTemperatureState) -> Self {
        Self { state }
    }

    /// Restore the last known targets persisted by a previous run.
    pub fn load(store: &dyn SettingsStore) -> Self {
        let state = ObservedTemperatureState {
            last_bed: store.get_f64(keys::LAST_BED_TEMP_SETPOINT),
            last_tool: store.get_f64(keys::LAST_TOOL_TEMP_SETPOINT),
        };
        tracing::debug!("Restored last known setpoints: {:?}", state);
        Self { state }
    }

    pub fn state(&self) -> ObservedTemperatureState {
        self.state
    }

    /// Record the bed (`B`) and tool (`T0`) targets from one snapshot.
    ///
    /// Targets below [`MINIMAL_SETPOINT_TEMPERATURE`] or missing never touch
    /// the stored state. Returns whether anything changed; changes are
    /// persisted before returning. On a persistence failure the in-memory
    /// state is kept.
    pub fn observe(
        &mut self,
        snapshot: &TemperatureSnapshot,
        store: &mut dyn SettingsStore,
    ) -> Result<bool, SettingsError> {
        let mut changed = false;
        if let Some(target) = qualifying_target(snapshot, BED_CHANNEL) {
            changed |= replace(&mut self.state.last_bed, target);
        }
        if let Some(target) = qualifying_target(snapshot, TOOL_CHANNEL) {
            changed |= replace(&mut self.state.last_tool, target);
        }
        if changed {
            tracing::debug!("Last known setpoints changed: {:?}", self.state);
            self.persist(store)?;
        }
        Ok(changed)
    }

    pub fn persist(&self, store: &mut dyn SettingsStore) -> Result<(), SettingsError> {
        store.set(keys::LAST_BED_TEMP_SETPOINT, self.state.last_bed.into())?;
        store.set(keys::LAST_TOOL_TEMP_SETPOINT, self.state.last_tool.into())?;
        Ok(())
    }
}

fn qualifying_target(snapshot: &TemperatureSnapshot, channel: &str) -> Option<f64> {
    snapshot
        .get(channel)
        .and_then(|(_, target)| *target)
        .filter(|t| *t >= MINIMAL_SETPOINT_TEMPERATURE)
}

fn replace(slot: &mut HeaterTarget, target: f64) -> bool {
    if *slot == Some(target) {
        return false;
    }
    *slot = Some(target);
    true
}
