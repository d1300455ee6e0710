//! Shared data model for the closed-loop simulator.
//!
//! This crate provides:
//! - Loop state carried between steps (controller, actuator, plant)
//! - User-visible parameters and hidden plant constants
//! - The bounded history buffer that feeds visualization
//! - Numeric guards and the Euler update used by every model

pub mod error;
pub mod history;
pub mod integrators;
pub mod params;
pub mod traits;

pub use error::*;
pub use history::*;
pub use integrators::*;
pub use params::*;
pub use traits::*;
