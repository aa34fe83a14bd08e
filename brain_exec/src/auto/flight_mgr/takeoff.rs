//! #  [`FlightMgr<Takeoff>`] implementation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use super::{
    params::FlightMgrParams, states::FollowPath, FlightMgrError, FlightMgrPersistantData,
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

/// Takeoff state of the FlightMgr.
///
/// Commands a climb straight up to flight altitude, then hands the path over to FollowPath with
/// the climb as its first waypoint.
///
/// Possible transitions:
/// - FollowPath, immediately.
#[derive(Debug)]
pub struct Takeoff {
    /// The first planned path, to be flown once airborne.
    path: Path,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Takeoff {
    pub fn new(path: Path) -> Self {
        Self { path }
    }

    pub fn step(
        &mut self,
        params: &FlightMgrParams,
        persistant: &mut FlightMgrPersistantData,
        pose: &Pose,
    ) -> Result<StepOutput, FlightMgrError> {
        let hold = Setpoint::new(
            pose.position_m.x,
            pose.position_m.y,
            params.flight_altitude_m,
            pose.yaw_rad,
        );

        info!("Taking off to {:.2} m above {}", params.flight_altitude_m, pose.position_2d());

        let mut follow = FollowPath::from_path(params, &self.path, pose.yaw_rad);
        follow.insert_issued(hold);

        persistant.has_taken_off = true;

        Ok(StepOutput {
            action: StateAction::Replace(FlightMgrState::FollowPath(follow)),
            cmd: Some(MotionCmd::Position(hold)),
        })
    }
}
