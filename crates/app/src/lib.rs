//! Real-time closed-loop simulation sessions
//!
//! This crate provides:
//! - `SessionState`: one owned control loop (controller, actuator, plant, history)
//! - `Scheduler`: physics and flush cadences over a session, steppable by hand
//! - `SessionHandle`: a session running on its own thread behind channels
//! - The JSON command/event protocol and the engine configuration

pub mod config;
pub mod protocol;
pub mod scheduler;
pub mod session;
pub mod worker;

pub use config::EngineConfig;
pub use protocol::{Command, Event, parse_command};
pub use scheduler::{Cadence, Scheduler};
pub use session::{SessionState, StepSample};
pub use worker::{Commander, SessionHandle};
