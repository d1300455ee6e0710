//! Engine configuration.

use actuator::ActuatorConfig;
use serde::{Deserialize, Serialize};
use simcore::{DEFAULT_HISTORY_CAPACITY, HiddenPlantConstants, SimError, SimResult};
use std::path::Path;
use std::time::Duration;

/// Knobs that are fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Samples kept in the history window
    pub history_capacity: usize,
    /// Snapshot cadence toward the display layer (ms)
    pub flush_interval_ms: u64,
    pub actuator: ActuatorConfig,
    /// Hidden constants in effect until the first `randomize`
    pub initial_constants: HiddenPlantConstants,
    /// Sled mass sampling range (kg)
    pub mass_range: [f64; 2],
    /// Actuator coupling sampling range
    pub gain_range: [f64; 2],
    /// RNG seed for reproducible `randomize`; OS entropy when absent
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            flush_interval_ms: 16,
            actuator: ActuatorConfig::default(),
            initial_constants: HiddenPlantConstants::default(),
            mass_range: [0.5, 5.0],
            gain_range: [0.5, 3.0],
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_constants(mut self, constants: HiddenPlantConstants) -> Self {
        self.initial_constants = constants;
        self
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn validate(&self) -> SimResult<()> {
        let ensure = |ok: bool, msg: &str| {
            if ok {
                Ok(())
            } else {
                Err(SimError::InvalidConfig(msg.to_string()))
            }
        };
        ensure(self.history_capacity > 0, "history_capacity must be > 0")?;
        ensure(self.flush_interval_ms > 0, "flush_interval_ms must be > 0")?;
        ensure(
            self.actuator.tau_lag.is_finite() && self.actuator.tau_lag >= 0.0,
            "actuator.tau_lag must be finite and >= 0",
        )?;
        ensure(
            self.actuator.deadband.is_finite() && self.actuator.deadband >= 0.0,
            "actuator.deadband must be finite and >= 0",
        )?;
        ensure(
            self.actuator.output_limit.is_finite() && self.actuator.output_limit > 0.0,
            "actuator.output_limit must be finite and > 0",
        )?;
        for (name, [lo, hi]) in [("mass_range", self.mass_range), ("gain_range", self.gain_range)] {
            if !(lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be positive and ordered, got [{lo}, {hi}]"
                )));
            }
        }
        Ok(())
    }
}
