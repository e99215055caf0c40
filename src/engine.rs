// src/engine.rs - Pre-heat decisions for file, connect and startup triggers
use crate::error::PreheatError;
use crate::observer::TemperatureObserver;
use crate::scanner::FileSetpointScanner;
use preheat_shared::config::{PreheatSettings, SetpointConfig};
use preheat_shared::gcode_utils::heater_command;
use preheat_shared::host_traits::{BedReadiness, CommandChannel, FilePathResolver, SettingsStore};
use preheat_shared::{
    FileOrigin, HeaterRole, HeaterTarget, ObservedTemperatureState, ScanResult, TemperatureSnapshot, TriggerEvent,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PreheatOutcome {
    /// Commands sent, in emission order.
    Heated(Vec<String>),
    Skipped(SkipReason),
    /// The trigger's option is switched off.
    Disabled,
    /// File selected from a non-local origin.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BedNotClear,
    BedReadinessUnavailable,
    NoTargets,
}

/// Decides what to pre-heat and when.
///
/// One engine per running host. It owns its settings snapshot and the
/// last-known heater targets; all host services are reached through the
/// collaborator traits. Entry points are synchronous; wrap the engine in
/// [`crate::host::SharedPreheatEngine`] if triggers arrive from several threads.
pub struct PreheatEngine {
    settings: PreheatSettings,
    observer: TemperatureObserver,
    store: Box<dyn SettingsStore>,
    files: Box<dyn FilePathResolver>,
    commands: Box<dyn CommandChannel>,
    bed_readiness: Option<Box<dyn BedReadiness>>,
}

impl PreheatEngine {
    pub fn new(
        mut store: Box<dyn SettingsStore>,
        files: Box<dyn FilePathResolver>,
        commands: Box<dyn CommandChannel>,
    ) -> Self {
        if let Err(e) = PreheatSettings::populate_defaults(&mut *store) {
            tracing::error!("Failed to store default pre-heat settings: {}", e);
        }
        let settings = PreheatSettings::from_store(&*store);
        let observer = TemperatureObserver::load(&*store);
        tracing::debug!("Pre-heat engine initialized");
        settings.log_all();
        Self {
            settings,
            observer,
            store,
            files,
            commands,
            bed_readiness: None,
        }
    }

    /// Attach the optional bed-ready capability.
    pub fn with_bed_readiness(mut self, check: Box<dyn BedReadiness>) -> Self {
        self.bed_readiness = Some(check);
        self
    }

    pub fn settings(&self) -> &PreheatSettings {
        &self.settings
    }

    pub fn observed(&self) -> ObservedTemperatureState {
        self.observer.state()
    }

    /// Re-read the settings after the host saved new values.
    pub fn reload_settings(&mut self) {
        self.settings = PreheatSettings::from_store(&*self.store);
        tracing::debug!("Pre-heat settings reloaded");
        self.settings.log_all();
    }

    /// Trigger boundary: failures are logged here and result in no heating.
    pub fn on_event(&mut self, event: &TriggerEvent) -> Option<PreheatOutcome> {
        match self.handle_event(event) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!("Pre-heat for {:?} failed: {}", event, e);
                None
            }
        }
    }

    pub fn handle_event(&mut self, event: &TriggerEvent) -> Result<PreheatOutcome, PreheatError> {
        match event {
            TriggerEvent::FileSelected { origin, path } => self.preheat_for_file(*origin, path),
            TriggerEvent::PrinterConnected => self.preheat_on_connect(),
            TriggerEvent::ProcessStartup => self.preheat_on_startup(),
        }
    }

    pub fn preheat_for_file(&self, origin: FileOrigin, path: &str) -> Result<PreheatOutcome, PreheatError> {
        if !self.settings.preheat_on_file_load {
            return Ok(PreheatOutcome::Disabled);
        }
        if origin != FileOrigin::Local {
            tracing::debug!("Ignoring {} file selection: {}", origin, path);
            return Ok(PreheatOutcome::Ignored);
        }
        let selected = self.files.path_on_disk(origin, path)?;
        tracing::info!("Start pre-heat on file loaded: {}", selected.display());

        let outcome = FileSetpointScanner::new(&self.settings.setpoints).try_scan(&selected)?;
        let targets = outcome.result;
        self.do_preheat(targets.nozzle, targets.bed, targets.chamber)
    }

    pub fn preheat_on_connect(&self) -> Result<PreheatOutcome, PreheatError> {
        if !self.settings.preheat_on_printer_connected {
            return Ok(PreheatOutcome::Disabled);
        }
        tracing::info!("Starting pre-heat on printer connected");
        let targets = self.connect_targets();
        self.do_preheat(targets.nozzle, targets.bed, targets.chamber)
    }

    pub fn preheat_on_startup(&self) -> Result<PreheatOutcome, PreheatError> {
        if !self.settings.preheat_on_startup {
            return Ok(PreheatOutcome::Disabled);
        }
        tracing::info!("Starting pre-heat after startup");
        let sp = &self.settings.setpoints;
        self.do_preheat(sp.nozzle_setpoint_default, sp.bed_setpoint_default, sp.chamber_setpoint_default)
    }

    /// Targets for a connect trigger: last known values when enabled and
    /// known, configured defaults otherwise. The chamber has no last-known
    /// tracking and always uses its default.
    pub fn connect_targets(&self) -> ScanResult {
        let sp: &SetpointConfig = &self.settings.setpoints;
        let observed = self.observer.state();
        ScanResult::new(
            prefer_last(self.settings.use_last_used_tool_temperature, observed.last_tool, sp.nozzle_setpoint_default),
            prefer_last(self.settings.use_last_used_bed_temperature, observed.last_bed, sp.bed_setpoint_default),
            sp.chamber_setpoint_default,
        )
    }

    /// Gate on bed readiness, then send one command per present, positive target.
    ///
    /// A rejected command is logged and the remaining heaters are still sent;
    /// the outcome lists only the commands the channel accepted. The call
    /// fails only when no command got through.
    pub fn do_preheat(
        &self,
        nozzle: HeaterTarget,
        bed: HeaterTarget,
        chamber: HeaterTarget,
    ) -> Result<PreheatOutcome, PreheatError> {
        if self.settings.check_bedready_before_preheat {
            if let Some(reason) = self.bed_not_ready() {
                return Ok(PreheatOutcome::Skipped(reason));
            }
        }

        let targets = ScanResult::new(nozzle, bed, chamber);
        let heaters: Vec<(HeaterRole, f64)> = HeaterRole::ALL
            .into_iter()
            .filter_map(|role| targets.get(role).filter(|t| *t > 0.0 && t.is_finite()).map(|t| (role, t)))
            .collect();
        if heaters.is_empty() {
            tracing::info!("No pre-heat targets resolved");
            return Ok(PreheatOutcome::Skipped(SkipReason::NoTargets));
        }

        let summary: Vec<String> = heaters.iter().map(|(role, t)| format!("{}: {}", role, t)).collect();
        tracing::info!("Pre-heating {}", summary.join(" "));

        let mut sent = Vec::with_capacity(heaters.len());
        let mut last_error = None;
        for (role, target) in heaters {
            let command = heater_command(role, target);
            match self.commands.send(&command) {
                Ok(()) => sent.push(command),
                Err(e) => {
                    tracing::error!("Failed to send {} command '{}': {}", role, command, e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) if sent.is_empty() => Err(e.into()),
            _ => Ok(PreheatOutcome::Heated(sent)),
        }
    }

    /// Pass-through telemetry hook; the snapshot is returned unmodified.
    pub fn observe(&mut self, snapshot: TemperatureSnapshot) -> TemperatureSnapshot {
        if let Err(e) = self.observer.observe(&snapshot, &mut *self.store) {
            tracing::error!("Failed to persist last known setpoints: {}", e);
        }
        snapshot
    }

    fn bed_not_ready(&self) -> Option<SkipReason> {
        let Some(check) = &self.bed_readiness else {
            tracing::warn!("Bed ready check requested but not available; skipping pre-heat");
            return Some(SkipReason::BedReadinessUnavailable);
        };
        match check.check_bed() {
            Ok(result) if result.bed_clear => None,
            Ok(result) => {
                tracing::info!("Bed is not clear (similarity {:?}); skipping pre-heat", result.similarity);
                Some(SkipReason::BedNotClear)
            }
            Err(e) => {
                tracing::warn!("{}; skipping pre-heat", e);
                Some(SkipReason::BedReadinessUnavailable)
            }
        }
    }
}

fn prefer_last(enabled: bool, last: HeaterTarget, default: HeaterTarget) -> HeaterTarget {
    match last {
        Some(t) if enabled && t > 0.0 => Some(t),
        _ => default,
    }
}
