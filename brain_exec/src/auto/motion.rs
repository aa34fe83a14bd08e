//! # Motion commands
//!
//! Commands sent from the flight manager to the vehicle's position controller. Commands are
//! idempotent, the flight manager repeats the current command every cycle until the vehicle's
//! pose shows it has been reached.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use util::maths::{get_ang_dist_2pi, wrap_2pi};

use super::loc::Pose;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A target position and heading for the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Setpoint {
    pub position_m: Vector3<f64>,

    pub yaw_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionCmd {
    /// Fly to the setpoint's position and altitude.
    Position(Setpoint),

    /// Turn in place to the setpoint's heading.
    Yaw(Setpoint),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The vehicle's motion command interface.
pub trait MotionSink {
    fn send(&mut self, cmd: &MotionCmd);
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Setpoint {
    pub fn new(x_m: f64, y_m: f64, z_m: f64, yaw_rad: f64) -> Self {
        Self {
            position_m: Vector3::new(x_m, y_m, z_m),
            yaw_rad,
        }
    }

    /// True if the pose is within `tolerance_m` of the setpoint's position.
    pub fn is_position_reached(&self, pose: &Pose, tolerance_m: f64) -> bool {
        (pose.position_m - self.position_m).norm() <= tolerance_m
    }

    /// True if the pose's heading is within `tolerance_rad` of the setpoint's heading.
    pub fn is_yaw_reached(&self, pose: &Pose, tolerance_rad: f64) -> bool {
        get_ang_dist_2pi(wrap_2pi(pose.yaw_rad), wrap_2pi(self.yaw_rad)).abs() <= tolerance_rad
    }
}

impl MotionCmd {
    pub fn setpoint(&self) -> &Setpoint {
        match self {
            MotionCmd::Position(s) => s,
            MotionCmd::Yaw(s) => s,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_reached() {
        let sp = Setpoint::new(1.0, 1.0, 0.3, 0.1);

        assert!(sp.is_position_reached(&Pose::new(1.05, 1.0, 0.3, 0.0), 0.1));
        assert!(!sp.is_position_reached(&Pose::new(1.0, 1.0, 0.0, 0.0), 0.1));

        // Heading wraps around
        let sp = Setpoint::new(0.0, 0.0, 0.0, 2.0 * PI - 0.02);
        assert!(sp.is_yaw_reached(&Pose::new(0.0, 0.0, 0.0, 0.02), 0.05));
        assert!(sp.is_yaw_reached(&Pose::new(0.0, 0.0, 0.0, -0.01), 0.05));
        assert!(!sp.is_yaw_reached(&Pose::new(0.0, 0.0, 0.0, PI), 0.05));
    }
}
