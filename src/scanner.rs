// src/scanner.rs - Find the first heater setpoints in a print file
use crate::error::ScanError;
use preheat_shared::config::SetpointConfig;
use preheat_shared::gcode_utils::{classify_heater_line, parse_heater_command};
use preheat_shared::{HeaterRole, MINIMAL_SETPOINT_TEMPERATURE, ScanResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Why a scan stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// Every searched heater resolved at this 0-based line index.
    AllFound { line: u64 },
    /// The line budget ran out before every searched heater resolved.
    BudgetExhausted { budget: u64 },
    EndOfFile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOutcome {
    pub result: ScanResult,
    pub lines_scanned: u64,
    pub stop: ScanStop,
}

/// Bounded linear scan for the first nozzle, bed and chamber setpoints.
///
/// Heaters with searching disabled keep their configured default. For the
/// others the first `M104/M109`, `M140/M190` or `M141/M191` line carrying a
/// value of at least [`MINIMAL_SETPOINT_TEMPERATURE`] wins; lower values are
/// cool-down commands and are skipped.
#[derive(Debug, Clone, Copy)]
pub struct FileSetpointScanner<'a> {
    config: &'a SetpointConfig,
}

impl<'a> FileSetpointScanner<'a> {
    pub fn new(config: &'a SetpointConfig) -> Self {
        Self { config }
    }

    /// Fail-safe scan: any I/O failure yields [`ScanResult::absent`] so that
    /// nothing gets heated from a partially read file.
    pub fn scan(&self, path: &Path) -> ScanResult {
        match self.try_scan(path) {
            Ok(outcome) => outcome.result,
            Err(e) => {
                tracing::error!("Setpoint scan aborted: {}", e);
                ScanResult::absent()
            }
        }
    }

    pub fn try_scan(&self, path: &Path) -> Result<ScanOutcome, ScanError> {
        let file = File::open(path).map_err(|source| ScanError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.scan_reader(BufReader::new(file), path)
    }

    /// Scan any buffered source; `source` only labels errors and log lines.
    pub fn scan_reader<R: BufRead>(&self, reader: R, source: &Path) -> Result<ScanOutcome, ScanError> {
        let mut result = ScanResult::new(
            self.config.default_for(HeaterRole::Nozzle),
            self.config.default_for(HeaterRole::Bed),
            self.config.default_for(HeaterRole::Chamber),
        );
        let mut pending: Vec<HeaterRole> = HeaterRole::ALL
            .into_iter()
            .filter(|role| self.config.searches(*role))
            .collect();
        let budget = self.config.search_budget();

        tracing::debug!("Searching {} for: {:?}", source.display(), pending);

        let mut lines_scanned = 0u64;
        for (index, line) in reader.lines().enumerate() {
            let index = index as u64;
            if let Some(max) = budget {
                if index > max {
                    tracing::warn!(
                        "Could not find temperature setpoints for {:?} within {} lines of {}",
                        pending,
                        max,
                        source.display()
                    );
                    return Ok(ScanOutcome {
                        result,
                        lines_scanned,
                        stop: ScanStop::BudgetExhausted { budget: max },
                    });
                }
            }
            let line = line.map_err(|e| ScanError::Read {
                path: source.to_path_buf(),
                line: index,
                source: e,
            })?;
            lines_scanned += 1;

            if let Some(role) = classify_heater_line(&line).filter(|r| pending.contains(r)) {
                tracing::debug!("  {} temp: {}", role, line.trim_end());
                if let Some(setpoint) = parse_heater_command(&line).filter(|t| *t >= MINIMAL_SETPOINT_TEMPERATURE) {
                    tracing::info!("  {} temp: {}", role, setpoint);
                    result.set(role, Some(setpoint));
                    pending.retain(|r| *r != role);
                }
            }

            if pending.is_empty() {
                tracing::info!("Found all temperature setpoints after {} lines", index);
                return Ok(ScanOutcome {
                    result,
                    lines_scanned,
                    stop: ScanStop::AllFound { line: index },
                });
            }
        }

        if !pending.is_empty() {
            tracing::warn!("Reached end of {} without setpoints for {:?}", source.display(), pending);
        }
        Ok(ScanOutcome {
            result,
            lines_scanned,
            stop: ScanStop::EndOfFile,
        })
    }
}
