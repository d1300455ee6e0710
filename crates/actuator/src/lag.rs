use serde::{Deserialize, Serialize};
use simcore::{ActuatorState, Model, euler, guarded_divisor};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// First-order lag time constant (s)
    pub tau_lag: f64,
    /// Magnitude below which no motion is produced
    pub deadband: f64,
    /// Physical output limit, symmetric
    pub output_limit: f64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        ActuatorConfig {
            tau_lag: 0.08,
            deadband: 0.02,
            output_limit: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Actuator {
    pub config: ActuatorConfig,
    state: ActuatorState,
}

impl Actuator {
    pub fn new(config: ActuatorConfig) -> Self {
        Actuator {
            config,
            state: ActuatorState::default(),
        }
    }

    /// Advance the lag toward `command` and return the effective plant input.
    pub fn step(&mut self, command: f64, dt: f64) -> f64 {
        let limit = self.config.output_limit;
        let rate = (command - self.state.output) / guarded_divisor(self.config.tau_lag);

        self.state.command = command;
        self.state.output = euler(self.state.output, rate, dt).clamp(-limit, limit);
        self.state.effective = if self.state.output.abs() < self.config.deadband {
            0.0
        } else {
            self.state.output
        };
        self.state.effective
    }

    /// Lagged output before the deadband
    pub fn output(&self) -> f64 {
        self.state.output
    }

    pub fn effective(&self) -> f64 {
        self.state.effective
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }
}

impl Model for Actuator {
    fn reset(&mut self) {
        self.state = ActuatorState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_first_order_lag_step() {
        let mut act = Actuator::new(ActuatorConfig::default());
        act.step(1.0, 0.01);
        // du = (1 - 0) / 0.08 * 0.01
        assert_abs_diff_eq!(act.output(), 0.125, epsilon = 1e-12);
        assert_eq!(act.state().command, 1.0);
    }

    #[test]
    fn test_converges_to_command() {
        let mut act = Actuator::new(ActuatorConfig::default());
        for _ in 0..1000 {
            act.step(0.6, 0.001);
        }
        assert_abs_diff_eq!(act.output(), 0.6, epsilon = 1e-5);
        assert_abs_diff_eq!(act.effective(), 0.6, epsilon = 1e-5);
    }

    #[test]
    fn test_deadband_zeroes_small_output() {
        let mut act = Actuator::new(ActuatorConfig::default());
        let u_eff = act.step(0.01, 0.01);
        assert!(act.output().abs() > 0.0);
        assert!(act.output().abs() < 0.02);
        assert_eq!(u_eff, 0.0);
    }

    #[test]
    fn test_output_clamped_when_step_overshoots() {
        // dt much larger than tau: the raw Euler step overshoots past the command
        let mut act = Actuator::new(ActuatorConfig::default());
        act.step(1.0, 1.0);
        assert_eq!(act.output(), 1.0);
        act.step(-1.0, 1.0);
        assert_eq!(act.output(), -1.0);
    }

    #[test]
    fn test_zero_tau_is_guarded() {
        let mut act = Actuator::new(ActuatorConfig {
            tau_lag: 0.0,
            ..Default::default()
        });
        let u_eff = act.step(0.5, 0.01);
        assert!(u_eff.is_finite());
        assert!(u_eff.abs() <= 1.0);
    }

    #[test]
    fn test_reset_zeroes_state() {
        let mut act = Actuator::new(ActuatorConfig::default());
        act.step(1.0, 0.05);
        act.reset();
        assert_eq!(act.state(), ActuatorState::default());
    }
}
