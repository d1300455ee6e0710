//! Flywheel - rotational inertia with viscous drag and a constant load torque

use serde::{Deserialize, Serialize};
use simcore::{HiddenPlantConstants, PlantState, euler, guarded_divisor};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlywheelConfig {
    /// Viscous drag coefficient (N·m·s/rad)
    pub drag: f64,
    /// Moment of inertia (kg·m²)
    pub inertia_j: f64,
    /// Constant torque opposing the drive (N·m)
    pub load_torque: f64,
}

/// Advance the flywheel by one step; `y` is the instantaneous speed.
pub fn advance(
    config: &FlywheelConfig,
    state: PlantState,
    u_eff: f64,
    constants: &HiddenPlantConstants,
    dt: f64,
) -> PlantState {
    let torque = constants.gain * u_eff - config.drag * state.omega - config.load_torque;
    let omega = euler(state.omega, torque / guarded_divisor(config.inertia_j), dt);
    PlantState { y: omega, omega, ..state }
}
