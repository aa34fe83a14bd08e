//! #  [`FlightMgr<FollowPath>`] implementation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info};

use super::{
    params::FlightMgrParams, states::Scan, FlightMgrError, FlightMgrPersistantData,
    FlightMgrState, StateAction, StepOutput,
};
use crate::auto::{
    loc::Pose,
    motion::{MotionCmd, Setpoint},
    path::Path,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// FollowPath state of the FlightMgr.
///
/// Commands each waypoint in order, repeating the command every cycle until the pose is within
/// tolerance of it. A waypoint is only considered reached after it has been commanded at least
/// once.
///
/// Possible transitions:
/// - Scan, once the last waypoint is reached.
#[derive(Debug)]
pub struct FollowPath {
    waypoints: Vec<Setpoint>,

    /// Index of the waypoint currently being flown to.
    index: usize,

    /// True if the current waypoint has been commanded.
    issued: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FollowPath {
    pub fn new(waypoints: Vec<Setpoint>) -> Self {
        Self {
            waypoints,
            index: 0,
            issued: false,
        }
    }

    /// Build the waypoints from a planned path, at flight altitude and holding the given heading.
    pub fn from_path(params: &FlightMgrParams, path: &Path, yaw_rad: f64) -> Self {
        Self::new(
            path.iter()
                .map(|p| Setpoint::new(p.x, p.y, params.flight_altitude_m, yaw_rad))
                .collect(),
        )
    }

    /// Insert a waypoint before all others which has already been commanded.
    pub(super) fn insert_issued(&mut self, waypoint: Setpoint) {
        self.waypoints.insert(0, waypoint);
        self.index = 0;
        self.issued = true;
    }

    pub fn waypoints(&self) -> &[Setpoint] {
        &self.waypoints
    }

    pub fn step(
        &mut self,
        params: &FlightMgrParams,
        persistant: &mut FlightMgrPersistantData,
        pose: &Pose,
    ) -> Result<StepOutput, FlightMgrError> {
        let current = *self
            .waypoints
            .get(self.index)
            .ok_or(FlightMgrError::NoWaypoint(self.index))?;

        if self.issued && current.is_position_reached(pose, params.waypoint_tolerance_m) {
            debug!(
                "Waypoint {}/{} reached",
                self.index + 1,
                self.waypoints.len()
            );

            self.index += 1;
            self.issued = false;

            if self.index >= self.waypoints.len() {
                info!("Path complete, scanning");
                return Ok(StepOutput {
                    action: StateAction::Replace(FlightMgrState::Scan(Scan::new(params, pose))),
                    cmd: None,
                });
            }
        }

        let target = *self
            .waypoints
            .get(self.index)
            .ok_or(FlightMgrError::NoWaypoint(self.index))?;

        self.issued = true;
        persistant.tm.waypoint_index = Some(self.index);

        Ok(StepOutput {
            action: StateAction::None,
            cmd: Some(MotionCmd::Position(target)),
        })
    }
}
