//! # Brain Executable Parameters
//!
//! This module provide parameters for the brain executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainExecParams {
    /// Frequency of the main control cycle
    pub cycle_frequency_hz: f64,

    /// Time to wait after initialisation before the first cycle, giving the vehicle time to
    /// settle
    pub startup_pause_s: f64,

    /// Period between publications of the occupancy grid
    pub occupancy_publish_period_s: f64,

    /// Period between saves of the flight telemetry
    pub tm_save_period_s: f64,

    /// Fixed list of goals to visit in order. If empty the explorer chooses goals instead.
    #[serde(default)]
    pub goals: Vec<[f64; 2]>,
}
