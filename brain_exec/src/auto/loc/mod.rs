//! # Localisation module
//!
//! This module provides the vehicle's pose to the rest of the autonomy system. The pose itself
//! comes from an external [`PoseProvider`], which also reports whether the localisation has
//! converged. The [`LocMgr`] only hands out a pose once the provider is localised, so callers can
//! treat `None` as "not yet localised".

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point2, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading in the map frame) of the vehicle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose {
    /// The position in the map frame
    pub position_m: Vector3<f64>,

    /// Heading about the map's z axis, 0 along +x
    pub yaw_rad: f64,
}

/// Provides an interface for the Localisation system of the vehicle.
pub struct LocMgr {
    source: Box<dyn PoseProvider>,
}

/// A pose source whose pose is set manually.
#[derive(Debug, Clone, Default)]
pub struct OnSetPose {
    localised: bool,

    pose: Option<Pose>,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// An external source of the vehicle's pose.
pub trait PoseProvider {
    /// True once the localisation has converged and the pose can be trusted.
    fn is_localised(&self) -> bool;

    /// The latest pose estimate, if any has been received.
    fn pose(&self) -> Option<Pose>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, z_m: f64, yaw_rad: f64) -> Self {
        Self {
            position_m: Vector3::new(x_m, y_m, z_m),
            yaw_rad,
        }
    }

    /// The horizontal position of the vehicle.
    pub fn position_2d(&self) -> Point2<f64> {
        Point2::new(self.position_m.x, self.position_m.y)
    }
}

impl LocMgr {
    pub fn new(source: Box<dyn PoseProvider>) -> Self {
        Self { source }
    }

    /// Get the current pose, or `None` if the vehicle is not localised.
    pub fn get_pose(&self) -> Option<Pose> {
        if self.source.is_localised() {
            self.source.pose()
        } else {
            None
        }
    }
}

impl OnSetPose {
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = Some(pose);
    }

    pub fn set_localised(&mut self, localised: bool) {
        self.localised = localised;
    }
}

impl PoseProvider for OnSetPose {
    fn is_localised(&self) -> bool {
        self.localised
    }

    fn pose(&self) -> Option<Pose> {
        self.pose
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
