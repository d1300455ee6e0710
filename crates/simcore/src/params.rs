//! User-visible simulation parameters and hidden plant constants.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{SimError, SimResult};

/// Which physical system the loop drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantKind {
    /// Translational mass with viscous friction, no restoring force
    #[default]
    Sled,
    /// Rotational inertia with viscous drag and a constant opposing load
    Flywheel,
}

/// Parameters supplied by the display layer on `start` / `update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    /// Fixed timestep (s)
    pub dt: f64,
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain
    #[serde(default)]
    pub kd: f64,
    /// Target value for `y`
    pub setpoint: f64,
    /// Sled viscous friction coefficient (N·s/m)
    pub friction: f64,
    #[serde(default)]
    pub plant: PlantKind,
    /// Flywheel viscous drag (N·m·s/rad)
    #[serde(default = "default_drag")]
    pub drag: f64,
    /// Flywheel moment of inertia (kg·m²)
    #[serde(default = "default_inertia_j")]
    pub inertia_j: f64,
    /// Flywheel constant opposing torque (N·m)
    #[serde(default)]
    pub load_torque: f64,
}

fn default_drag() -> f64 {
    0.1
}

fn default_inertia_j() -> f64 {
    1.0
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            dt: 0.01,
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            setpoint: 0.0,
            friction: 0.5,
            plant: PlantKind::Sled,
            drag: default_drag(),
            inertia_j: default_inertia_j(),
            load_torque: 0.0,
        }
    }
}

impl SimulationParameters {
    /// Sled parameters with a P controller
    pub fn sled(dt: f64, kp: f64, setpoint: f64, friction: f64) -> Self {
        Self { dt, kp, setpoint, friction, ..Default::default() }
    }

    /// Flywheel parameters with a P controller
    pub fn flywheel(dt: f64, kp: f64, setpoint: f64, drag: f64, inertia_j: f64, load_torque: f64) -> Self {
        Self {
            dt,
            kp,
            setpoint,
            plant: PlantKind::Flywheel,
            drag,
            inertia_j,
            load_torque,
            ..Default::default()
        }
    }

    /// Set the integral and derivative gains
    pub fn with_gains(mut self, ki: f64, kd: f64) -> Self {
        self.ki = ki;
        self.kd = kd;
        self
    }

    /// Contract check for parameters arriving from outside a session.
    ///
    /// Sessions never call this; they assume conformant input and rely on the
    /// numeric guards instead.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidParameter {
                name: "dt",
                reason: format!("must be finite and > 0, got {}", self.dt),
            });
        }
        let fields = [
            ("kp", self.kp),
            ("ki", self.ki),
            ("kd", self.kd),
            ("setpoint", self.setpoint),
            ("friction", self.friction),
            ("drag", self.drag),
            ("inertiaJ", self.inertia_j),
            ("loadTorque", self.load_torque),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SimError::InvalidParameter {
                    name,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Physical constants the user never sees, regenerated only by `randomize`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HiddenPlantConstants {
    /// Sled inertial mass (kg)
    pub mass: f64,
    /// Actuator-to-force/torque coupling `K`
    pub gain: f64,
}

impl Default for HiddenPlantConstants {
    fn default() -> Self {
        Self { mass: 1.0, gain: 1.0 }
    }
}

impl HiddenPlantConstants {
    /// Draw new constants uniformly from the inclusive ranges `[lo, hi]`.
    pub fn sample<R: Rng + ?Sized>(rng: &mut R, mass_range: [f64; 2], gain_range: [f64; 2]) -> Self {
        Self {
            mass: sample_in(rng, mass_range),
            gain: sample_in(rng, gain_range),
        }
    }
}

// Bounds may arrive in either order
fn sample_in<R: Rng + ?Sized>(rng: &mut R, [a, b]: [f64; 2]) -> f64 {
    rng.gen_range(a.min(b)..=a.max(b))
}
