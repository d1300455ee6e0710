//! Sled - translational mass with viscous friction
//!
//! No restoring force: with zero input the sled coasts down to rest wherever it is.

use serde::{Deserialize, Serialize};
use simcore::{HiddenPlantConstants, PlantState, euler, guarded_divisor};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SledConfig {
    /// Viscous friction coefficient (N·s/m)
    pub friction: f64,
}

/// Advance the sled by one step.
///
/// Velocity is updated first and the NEW velocity moves the position, so
/// `y` is the sled position.
pub fn advance(
    config: &SledConfig,
    state: PlantState,
    u_eff: f64,
    constants: &HiddenPlantConstants,
    dt: f64,
) -> PlantState {
    let force = constants.gain * u_eff - config.friction * state.v;
    let v = euler(state.v, force / guarded_divisor(constants.mass), dt);
    let y = euler(state.y, v, dt);
    PlantState { y, v, ..state }
}
