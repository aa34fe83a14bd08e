//! # FlightMgr Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::auto::nav::RrtParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightMgrParams {
    /// Altitude at which all waypoints are flown.
    pub flight_altitude_m: f64,

    /// Distance from a waypoint at which it is considered reached.
    pub waypoint_tolerance_m: f64,

    /// Heading error at which a scan heading is considered reached.
    pub yaw_tolerance_rad: f64,

    /// Largest heading change commanded in one go during a scan.
    pub scan_step_rad: f64,

    /// Number of planner iterations run in each cycle while planning.
    pub plan_iterations_per_cycle: usize,

    /// Furthest the vehicle is moved to get clear of an obstacle it is too close to plan from.
    #[serde(default = "default_escape_distance_m")]
    pub escape_distance_m: f64,

    pub rrt: RrtParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for FlightMgrParams {
    fn default() -> Self {
        Self {
            flight_altitude_m: 0.3,
            waypoint_tolerance_m: 0.1,
            yaw_tolerance_rad: 0.1,
            scan_step_rad: std::f64::consts::FRAC_PI_2,
            plan_iterations_per_cycle: 200,
            escape_distance_m: default_escape_distance_m(),
            rrt: RrtParams::default(),
        }
    }
}

impl FlightMgrParams {
    /// Check the parameters, returning a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.waypoint_tolerance_m > 0.0) {
            return Err(format!(
                "waypoint_tolerance_m must be positive, got {}",
                self.waypoint_tolerance_m
            ));
        }
        if !(self.yaw_tolerance_rad > 0.0) {
            return Err(format!(
                "yaw_tolerance_rad must be positive, got {}",
                self.yaw_tolerance_rad
            ));
        }
        if !(self.scan_step_rad > 0.0) {
            return Err(format!(
                "scan_step_rad must be positive, got {}",
                self.scan_step_rad
            ));
        }
        if self.plan_iterations_per_cycle == 0 {
            return Err("plan_iterations_per_cycle must be at least 1".into());
        }
        if !(self.escape_distance_m >= 0.0) {
            return Err(format!(
                "escape_distance_m must not be negative, got {}",
                self.escape_distance_m
            ));
        }
        if !(self.rrt.goal_bias >= 0.0 && self.rrt.goal_bias <= 1.0) {
            return Err(format!(
                "rrt.goal_bias must be between 0 and 1, got {}",
                self.rrt.goal_bias
            ));
        }
        if !(self.rrt.goal_tolerance_m >= 0.0) {
            return Err(format!(
                "rrt.goal_tolerance_m must not be negative, got {}",
                self.rrt.goal_tolerance_m
            ));
        }
        if self.rrt.num_collision_steps == 0 {
            return Err("rrt.num_collision_steps must be at least 1".into());
        }
        if self.rrt.max_iterations == 0 {
            return Err("rrt.max_iterations must be at least 1".into());
        }
        if let Some(t) = self.rrt.max_planning_time_s {
            if !(t > 0.0) {
                return Err(format!(
                    "rrt.max_planning_time_s must be positive, got {}",
                    t
                ));
            }
        }

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_escape_distance_m() -> f64 {
    0.5
}
