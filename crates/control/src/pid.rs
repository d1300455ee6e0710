//! PID Controller
//!
//! A P/PI/PID law with a clamped derivative estimate, conditional-integration
//! anti-windup and hard output saturation.

use serde::{Deserialize, Serialize};
use simcore::{ControllerState, Model, guarded_divisor};

/// Configuration for a PID controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidConfig {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
    /// Maximum integral accumulator magnitude (blow-up guard)
    pub i_max: f64,
    /// Maximum derivative estimate magnitude (setpoint-step guard)
    pub d_max: f64,
    /// Minimum output value
    pub output_min: f64,
    /// Maximum output value
    pub output_max: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            i_max: 1000.0,
            d_max: 1000.0,
            output_min: -1.0,
            output_max: 1.0,
        }
    }
}

impl PidConfig {
    /// Create a P-only controller
    pub fn p(kp: f64) -> Self {
        Self { kp, ..Default::default() }
    }

    /// Create a PI controller
    pub fn pi(kp: f64, ki: f64) -> Self {
        Self { kp, ki, ..Default::default() }
    }

    /// Create a PID controller
    pub fn pid(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd, ..Default::default() }
    }

    /// Set output limits
    pub fn with_limits(mut self, min: f64, max: f64) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }
}

/// PID Controller with state
#[derive(Debug, Clone)]
pub struct PidController {
    config: PidConfig,
    state: ControllerState,
    setpoint: f64,
}

impl PidController {
    /// Create a new controller with the given configuration
    pub fn new(config: PidConfig) -> Self {
        Self {
            config,
            state: ControllerState::default(),
            setpoint: 0.0,
        }
    }

    /// Set the target setpoint
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    /// Get the current setpoint
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    /// Replace the gains, keeping the accumulated integral and previous error
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.config.kp = kp;
        self.config.ki = ki;
        self.config.kd = kd;
    }

    /// Update the controller with a new measurement and return the saturated command
    ///
    /// The command is computed twice: a tentative value (with last step's
    /// integral) decides whether the integral may grow, then the final value is
    /// recomputed with the possibly updated integral.
    pub fn update(&mut self, measurement: f64, dt: f64) -> f64 {
        let PidConfig { kp, ki, kd, .. } = self.config;
        let error = self.setpoint - measurement;

        // Derivative on error, clamped so a setpoint step cannot spike the output
        let d_error = ((error - self.state.prev_error) / guarded_divisor(dt))
            .clamp(-self.config.d_max, self.config.d_max);

        let tentative = kp * error + kd * d_error + ki * self.state.integral;

        if !self.would_wind_up(tentative, error) {
            self.state.integral = (self.state.integral + error * dt)
                .clamp(-self.config.i_max, self.config.i_max);
        }

        let output = (kp * error + ki * self.state.integral + kd * d_error)
            .clamp(self.config.output_min, self.config.output_max);

        self.state.prev_error = error;
        output
    }

    /// Saturated high while still pushing up, or saturated low while still pushing down
    fn would_wind_up(&self, tentative: f64, error: f64) -> bool {
        (tentative > self.config.output_max && error > 0.0)
            || (tentative < self.config.output_min && error < 0.0)
    }

    /// Get the current integral accumulator value
    pub fn integral(&self) -> f64 {
        self.state.integral
    }

    /// Get the controller's dynamic state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &PidConfig {
        &self.config
    }
}

impl Model for PidController {
    fn reset(&mut self) {
        self.state = ControllerState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_p_only_proportional_output() {
        let config = PidConfig::p(2.0).with_limits(-100.0, 100.0);
        let mut ctrl = PidController::new(config);
        ctrl.set_setpoint(10.0);

        // With measurement=4, error=6, P output should be 12
        let output = ctrl.update(4.0, 0.01);
        assert_abs_diff_eq!(output, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_default_limits_saturate_at_unity() {
        let mut ctrl = PidController::new(PidConfig::p(100.0));
        ctrl.set_setpoint(10.0);
        assert_abs_diff_eq!(ctrl.update(0.0, 0.01), 1.0);

        ctrl.set_setpoint(-10.0);
        assert_abs_diff_eq!(ctrl.update(0.0, 0.01), -1.0);
    }

    #[test]
    fn test_integral_frozen_while_saturated_high() {
        let mut ctrl = PidController::new(PidConfig::pi(0.0, 5.0));
        ctrl.set_setpoint(100.0);

        // First step: tentative = 0, so the integral grows to e*dt = 1.0
        ctrl.update(0.0, 0.01);
        assert_abs_diff_eq!(ctrl.integral(), 1.0, epsilon = 1e-12);

        // Now ki*ei = 5 > 1 with positive error: no further growth
        for _ in 0..50 {
            ctrl.update(0.0, 0.01);
        }
        assert_abs_diff_eq!(ctrl.integral(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_integral_unwinds_when_error_flips() {
        let mut ctrl = PidController::new(PidConfig::pi(0.0, 5.0));
        ctrl.set_setpoint(100.0);
        ctrl.update(0.0, 0.01);
        let wound = ctrl.integral();

        // Saturated high but error now negative: integrating is allowed
        ctrl.update(200.0, 0.01);
        assert!(ctrl.integral() < wound);
    }

    #[test]
    fn test_integral_frozen_while_saturated_low() {
        let mut ctrl = PidController::new(PidConfig::pi(0.0, 5.0));
        ctrl.set_setpoint(-100.0);
        ctrl.update(0.0, 0.01);
        let first = ctrl.integral();
        for _ in 0..20 {
            ctrl.update(0.0, 0.01);
        }
        assert_abs_diff_eq!(ctrl.integral(), first, epsilon = 1e-12);
    }

    #[test]
    fn test_integral_clamped_to_limit() {
        // No gains, so the tentative command never saturates and the clamp is the only guard
        let mut ctrl = PidController::new(PidConfig::default());
        ctrl.set_setpoint(1e6);
        ctrl.update(0.0, 1.0);
        assert_abs_diff_eq!(ctrl.integral(), 1000.0);

        ctrl.set_setpoint(-1e6);
        ctrl.update(0.0, 1.0);
        ctrl.update(0.0, 1.0);
        assert_abs_diff_eq!(ctrl.integral(), -1000.0);
    }

    #[test]
    fn test_derivative_clamped_on_setpoint_step() {
        let config = PidConfig::pid(0.0, 0.0, 1.0).with_limits(-1e9, 1e9);
        let mut ctrl = PidController::new(config);
        ctrl.set_setpoint(10.0);

        // (10 - 0) / 0.001 = 10000, clamped to 1000
        let output = ctrl.update(0.0, 0.001);
        assert_abs_diff_eq!(output, 1000.0);
    }

    #[test]
    fn test_zero_dt_stays_finite() {
        let mut ctrl = PidController::new(PidConfig::pid(1.0, 1.0, 1.0));
        ctrl.set_setpoint(3.0);
        let output = ctrl.update(0.0, 0.0);
        assert!(output.is_finite());
        assert!(ctrl.integral().is_finite());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut ctrl = PidController::new(PidConfig::pi(0.1, 1.0));
        ctrl.set_setpoint(1.0);

        for _ in 0..10 {
            ctrl.update(0.0, 0.1);
        }
        assert!(ctrl.integral() > 0.0);

        ctrl.reset();
        assert_eq!(ctrl.state(), ControllerState::default());
    }

    #[test]
    fn test_set_gains_keeps_memory() {
        let mut ctrl = PidController::new(PidConfig::pi(0.1, 1.0));
        ctrl.set_setpoint(1.0);
        for _ in 0..10 {
            ctrl.update(0.0, 0.1);
        }
        let before = ctrl.state();
        ctrl.set_gains(0.5, 2.0, 0.1);
        assert_eq!(ctrl.state(), before);
        assert_eq!(ctrl.config().kd, 0.1);
    }

    #[test]
    fn test_output_always_within_limits() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let kp = rng.gen_range(-1e4..1e4);
            let ki = rng.gen_range(-1e4..1e4);
            let kd = rng.gen_range(-1e4..1e4);
            let mut ctrl = PidController::new(PidConfig::pid(kp, ki, kd));
            ctrl.set_setpoint(rng.gen_range(-50.0..50.0));
            for _ in 0..20 {
                let u = ctrl.update(rng.gen_range(-50.0..50.0), 0.01);
                assert!(u.abs() <= 1.0);
            }
        }
    }
}
