//! Feedback control for the simulated plants
//!
//! This crate provides:
//! - PID controllers with conditional-integration anti-windup and hard output limits

pub mod pid;

pub use pid::*;
