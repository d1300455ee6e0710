//! Fixed-step scheduling of one session.
//!
//! Two cadences drive a session: the physics tick, which runs one or more
//! integration steps at a wall-clock interval derived from `dt`, and the flush,
//! which copies the history out at a fixed rate regardless of `dt`. The
//! scheduler only computes and applies them; whoever owns the clock (the worker
//! thread, or a test) decides when `tick` and `flush` are called.

use simcore::Snapshot;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::protocol::Command;
use crate::session::SessionState;

/// Physics cadence derived from a timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    /// Wall-clock period between ticks
    pub interval: Duration,
    /// Integration steps per tick, so simulated time tracks wall time 1:1
    pub steps_per_tick: usize,
}

impl Cadence {
    pub fn from_dt(dt: f64) -> Self {
        let dt_ms = dt * 1000.0;
        let interval_ms = dt_ms.floor().max(1.0);
        let steps_per_tick = (dt_ms / interval_ms).round().max(1.0) as usize;
        Cadence {
            interval: Duration::from_millis(interval_ms as u64),
            steps_per_tick,
        }
    }
}

pub struct Scheduler {
    session: SessionState,
    physics: Option<Cadence>,
    flush_interval: Duration,
}

impl Scheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Scheduler {
            session: SessionState::new(config),
            physics: None,
            flush_interval: config.flush_interval(),
        }
    }

    /// Apply a command. Returns `true` when the physics cadence was (re)armed
    /// and the clock owner should restart its physics deadline. `start` always
    /// re-arms; `update` only when the new `dt` changes the cadence, so a burst
    /// of updates does not hold the tick back.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Start { params, running } => {
                self.session.start(params, running);
                self.arm();
                true
            }
            Command::Update { params, running } => {
                self.session.update(params, running);
                let previous = self.physics;
                self.arm();
                previous != self.physics
            }
            Command::Randomize => {
                self.session.randomize();
                false
            }
            Command::Reset => {
                self.session.reset();
                false
            }
        }
    }

    fn arm(&mut self) {
        let cadence = Cadence::from_dt(self.session.params().dt);
        log::debug!(
            "cadence armed: interval={:?} steps_per_tick={} flush={:?}",
            cadence.interval,
            cadence.steps_per_tick,
            self.flush_interval
        );
        self.physics = Some(cadence);
    }

    /// `false` until the first `start`/`update`
    pub fn is_armed(&self) -> bool {
        self.physics.is_some()
    }

    pub fn cadence(&self) -> Option<Cadence> {
        self.physics
    }

    pub fn flush_interval(&self) -> Duration {
        self.flush_interval
    }

    /// One physics tick. Returns the number of steps actually integrated
    /// (zero while idle or paused).
    pub fn tick(&mut self) -> usize {
        let Some(cadence) = self.physics else {
            return 0;
        };
        let mut executed = 0;
        for _ in 0..cadence.steps_per_tick {
            if self.session.step().is_some() {
                executed += 1;
            }
        }
        executed
    }

    /// Copy of the current history for the display layer.
    pub fn flush(&self) -> Snapshot {
        let snapshot = self.session.snapshot();
        log::trace!("flush: {} samples", snapshot.len());
        snapshot
    }

    /// Integrate `steps` steps back to back, ignoring the wall-clock cadence.
    pub fn run_steps(&mut self, steps: usize) -> usize {
        (0..steps).filter(|_| self.session.step().is_some()).count()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcore::SimulationParameters;

    fn start(dt: f64, running: bool) -> Command {
        Command::Start {
            params: SimulationParameters::sled(dt, 1.0, 1.0, 0.5),
            running,
        }
    }

    #[test]
    fn test_cadence_from_dt() {
        assert_eq!(
            Cadence::from_dt(0.01),
            Cadence { interval: Duration::from_millis(10), steps_per_tick: 1 }
        );
        // Sub-millisecond steps are clamped to a 1 ms tick
        assert_eq!(
            Cadence::from_dt(0.0005),
            Cadence { interval: Duration::from_millis(1), steps_per_tick: 1 }
        );
        assert_eq!(Cadence::from_dt(0.0107).interval, Duration::from_millis(10));
        assert_eq!(Cadence::from_dt(0.0107).steps_per_tick, 1);
        assert_eq!(Cadence::from_dt(0.0).steps_per_tick, 1);
    }

    #[test]
    fn test_idle_until_started() {
        let mut sched = Scheduler::new(&EngineConfig::default());
        assert!(!sched.is_armed());
        assert_eq!(sched.tick(), 0);
        assert!(!sched.handle(Command::Randomize));
        assert!(!sched.is_armed());
        assert!(sched.handle(start(0.01, true)));
        assert!(sched.is_armed());
    }

    #[test]
    fn test_tick_runs_steps_per_tick() {
        let mut sched = Scheduler::new(&EngineConfig::default());
        sched.handle(start(0.01, true));
        assert_eq!(sched.tick(), 1);
        assert_eq!(sched.flush().len(), 1);
    }

    #[test]
    fn test_paused_tick_advances_nothing() {
        let mut sched = Scheduler::new(&EngineConfig::default());
        sched.handle(start(0.01, false));
        assert!(sched.is_armed());
        assert_eq!(sched.tick(), 0);
        assert_eq!(sched.session().time(), 0.0);
        assert!(sched.flush().is_empty());
    }

    #[test]
    fn test_update_rearms_with_new_dt() {
        let mut sched = Scheduler::new(&EngineConfig::default());
        sched.handle(start(0.01, true));
        let params = SimulationParameters::sled(0.025, 1.0, 1.0, 0.5);
        assert!(sched.handle(Command::Update { params, running: true }));
        assert_eq!(sched.cadence().unwrap().interval, Duration::from_millis(25));
    }

    #[test]
    fn test_update_with_same_dt_keeps_cadence() {
        let mut sched = Scheduler::new(&EngineConfig::default());
        sched.handle(start(0.02, true));
        let params = SimulationParameters::sled(0.02, 1.5, 1.0, 0.5);
        assert!(!sched.handle(Command::Update { params: params.clone(), running: true }));
        assert!(!sched.handle(Command::Update { params, running: false }));
        assert_eq!(sched.session().params().kp, 1.5);
        assert!(!sched.session().is_running());
    }

    #[test]
    fn test_first_update_arms_idle_scheduler() {
        let mut sched = Scheduler::new(&EngineConfig::default());
        let params = SimulationParameters::sled(0.02, 1.0, 1.0, 0.5);
        assert!(sched.handle(Command::Update { params, running: true }));
        assert!(sched.is_armed());
    }

    #[test]
    fn test_coarse_tick_runs_several_steps() {
        assert_eq!(
            Cadence::from_dt(0.0015),
            Cadence { interval: Duration::from_millis(1), steps_per_tick: 2 }
        );
        assert_eq!(Cadence::from_dt(0.0018).steps_per_tick, 2);

        let mut sched = Scheduler::new(&EngineConfig::default());
        sched.handle(start(0.0015, true));
        assert_eq!(sched.tick(), 2);
        assert_eq!(sched.flush().len(), 2);
        assert!((sched.session().time() - 0.003).abs() < 1e-12);
    }

    #[test]
    fn test_reset_keeps_cadence() {
        let mut sched = Scheduler::new(&EngineConfig::default());
        sched.handle(start(0.01, true));
        sched.run_steps(20);
        assert!(!sched.handle(Command::Reset));
        assert!(sched.is_armed());
        assert!(sched.flush().is_empty());
        assert_eq!(sched.tick(), 1);
    }

    #[test]
    fn test_flush_interval_from_config() {
        let config = EngineConfig { flush_interval_ms: 33, ..Default::default() };
        let sched = Scheduler::new(&config);
        assert_eq!(sched.flush_interval(), Duration::from_millis(33));
    }
}
