//! One simulation session: parameters, hidden constants and all loop state.

use actuator::Actuator;
use control::{PidConfig, PidController};
use mechanics::PlantModel;
use rand::SeedableRng;
use rand::rngs::StdRng;
use simcore::{
    ActuatorState, ControllerState, HiddenPlantConstants, HistoryBuffer, LoopState, Model,
    PlantState, SimulationParameters, Snapshot,
};

use crate::config::EngineConfig;

/// Everything observable about one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSample {
    /// Time the sample is recorded at (before advancing the clock)
    pub t: f64,
    pub y: f64,
    /// Lagged actuator output, as recorded in history
    pub u: f64,
    /// Saturated controller command
    pub u_cmd: f64,
    /// Plant input after the deadband
    pub u_eff: f64,
    pub setpoint: f64,
}

/// Exclusively owns the state of one running demo. Independent sessions share
/// nothing, so two of them can run side by side at different timesteps.
pub struct SessionState {
    params: SimulationParameters,
    constants: HiddenPlantConstants,
    plant_model: PlantModel,
    controller: PidController,
    actuator: Actuator,
    plant: PlantState,
    t: f64,
    running: bool,
    history: HistoryBuffer,
    rng: StdRng,
    mass_range: [f64; 2],
    gain_range: [f64; 2],
}

impl SessionState {
    pub fn new(config: &EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let params = SimulationParameters::default();
        Self {
            plant_model: PlantModel::from_params(&params),
            controller: PidController::new(PidConfig::default()),
            params,
            constants: config.initial_constants,
            actuator: Actuator::new(config.actuator),
            plant: PlantState::default(),
            t: 0.0,
            running: false,
            history: HistoryBuffer::new(config.history_capacity),
            rng,
            mass_range: config.mass_range,
            gain_range: config.gain_range,
        }
    }

    /// Zero every piece of dynamic state, then adopt `params`.
    pub fn start(&mut self, params: SimulationParameters, running: bool) {
        self.clear_dynamic_state();
        self.adopt(params);
        self.running = running;
        log::info!(
            "session start: plant={:?} dt={} kp={} ki={} kd={} setpoint={} running={}",
            self.params.plant,
            self.params.dt,
            self.params.kp,
            self.params.ki,
            self.params.kd,
            self.params.setpoint,
            running
        );
    }

    /// Adopt new parameters without touching controller memory, plant state or history.
    pub fn update(&mut self, params: SimulationParameters, running: bool) {
        if params.plant != self.params.plant {
            log::debug!(
                "plant switched {:?} -> {:?} without reset, continuing from current state",
                self.params.plant,
                params.plant
            );
        }
        self.adopt(params);
        self.running = running;
        log::debug!("session update: dt={} running={}", self.params.dt, running);
    }

    /// Resample the hidden constants; nothing else changes.
    pub fn randomize(&mut self) {
        self.constants =
            HiddenPlantConstants::sample(&mut self.rng, self.mass_range, self.gain_range);
        log::info!(
            "hidden constants randomized: mass={:.3} gain={:.3}",
            self.constants.mass,
            self.constants.gain
        );
    }

    /// Zero dynamic state and history, keeping parameters and hidden constants.
    pub fn reset(&mut self) {
        self.clear_dynamic_state();
        log::debug!("session reset");
    }

    fn clear_dynamic_state(&mut self) {
        self.controller.reset();
        self.actuator.reset();
        self.plant = PlantState::default();
        self.t = 0.0;
        self.history.clear();
    }

    fn adopt(&mut self, params: SimulationParameters) {
        self.controller.set_gains(params.kp, params.ki, params.kd);
        self.controller.set_setpoint(params.setpoint);
        self.plant_model = PlantModel::from_params(&params);
        self.params = params;
    }

    /// Controller -> actuator -> plant -> history, then advance the clock.
    /// Does nothing while paused.
    pub fn step(&mut self) -> Option<StepSample> {
        if !self.running {
            return None;
        }
        let dt = self.params.dt;

        let u_cmd = self.controller.update(self.plant.y, dt);
        let u_eff = self.actuator.step(u_cmd, dt);
        self.plant = self.plant_model.advance(self.plant, u_eff, &self.constants, dt);

        let sample = StepSample {
            t: self.t,
            y: self.plant.y,
            u: self.actuator.output(),
            u_cmd,
            u_eff,
            setpoint: self.params.setpoint,
        };
        self.history.push(sample.t, sample.y, sample.u, sample.setpoint);
        self.t += dt;
        Some(sample)
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn constants(&self) -> HiddenPlantConstants {
        self.constants
    }

    pub fn plant_model(&self) -> &PlantModel {
        &self.plant_model
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pause or resume without changing anything else
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn controller_state(&self) -> ControllerState {
        self.controller.state()
    }

    pub fn actuator_state(&self) -> ActuatorState {
        self.actuator.state()
    }

    pub fn plant_state(&self) -> PlantState {
        self.plant
    }

    pub fn loop_state(&self) -> LoopState {
        LoopState {
            t: self.t,
            controller: self.controller.state(),
            actuator: self.actuator.state(),
            plant: self.plant,
        }
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn snapshot(&self) -> Snapshot {
        self.history.snapshot()
    }
}
