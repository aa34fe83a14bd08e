//! # Brain library.
//!
//! This library allows other crates in the workspace, and the binaries of this crate, to access
//! items defined inside the brain crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy module - mapping, planning and flight sequencing
pub mod auto;

/// Simulated vehicle - stands in for the flight controller and localisation during development
pub mod sim_vehicle;
