//! Actuator between controller command and plant input.
//!
//! Models a drive with a first-order response, a minimum actuation threshold
//! and a hard physical output limit.

pub mod lag;

pub use lag::{Actuator, ActuatorConfig};
