//! Plant selection
//!
//! The two plants are interchangeable behind one closed enum; the session picks
//! the variant from its parameters and never mixes them within a step.

use serde::{Deserialize, Serialize};
use simcore::{HiddenPlantConstants, MIN_DIVISOR, PlantKind, PlantState, SimulationParameters};

use crate::flywheel::{self, FlywheelConfig};
use crate::sled::{self, SledConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlantModel {
    Sled(SledConfig),
    Flywheel(FlywheelConfig),
}

impl Default for PlantModel {
    fn default() -> Self {
        PlantModel::Sled(SledConfig { friction: 0.0 })
    }
}

impl PlantModel {
    /// Build the plant selected by `params.plant` from the matching fields.
    pub fn from_params(params: &SimulationParameters) -> Self {
        match params.plant {
            PlantKind::Sled => PlantModel::Sled(SledConfig {
                friction: params.friction,
            }),
            PlantKind::Flywheel => {
                if params.inertia_j < MIN_DIVISOR {
                    log::warn!(
                        "flywheel inertia {} is below {MIN_DIVISOR}, it will be floored",
                        params.inertia_j
                    );
                }
                PlantModel::Flywheel(FlywheelConfig {
                    drag: params.drag,
                    inertia_j: params.inertia_j,
                    load_torque: params.load_torque,
                })
            }
        }
    }

    pub fn kind(&self) -> PlantKind {
        match self {
            PlantModel::Sled(_) => PlantKind::Sled,
            PlantModel::Flywheel(_) => PlantKind::Flywheel,
        }
    }

    /// Advance the selected plant by one step with effective input `u_eff`.
    pub fn advance(
        &self,
        state: PlantState,
        u_eff: f64,
        constants: &HiddenPlantConstants,
        dt: f64,
    ) -> PlantState {
        match self {
            PlantModel::Sled(cfg) => sled::advance(cfg, state, u_eff, constants, dt),
            PlantModel::Flywheel(cfg) => flywheel::advance(cfg, state, u_eff, constants, dt),
        }
    }
}
