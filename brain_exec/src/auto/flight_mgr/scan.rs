//! #  [`FlightMgr<Scan>`] implementation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::f64::consts::TAU;

use log::{debug, info};
use nalgebra::Vector3;
use util::maths::wrap_2pi;

use super::{
    params::FlightMgrParams, states::Idle, FlightMgrError, FlightMgrPersistantData,
    FlightMgrState, StateAction, StepOutput,
};
use crate::auto::{
    loc::Pose,
    motion::{MotionCmd, Setpoint},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Scan state of the FlightMgr.
///
/// Turns a full circle in place, in equal heading steps no larger than `scan_step_rad`. Each
/// heading is commanded until it is reached before moving on to the next.
///
/// Possible transitions:
/// - Idle, once the full circle is complete.
#[derive(Debug)]
pub struct Scan {
    /// Position held during the scan.
    position_m: Vector3<f64>,

    start_yaw_rad: f64,

    step_rad: f64,

    num_steps: usize,

    /// Number of headings reached so far.
    num_reached: usize,

    /// True if the current heading has been commanded.
    issued: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Scan {
    pub fn new(params: &FlightMgrParams, pose: &Pose) -> Self {
        let num_steps = ((TAU / params.scan_step_rad).ceil() as usize).max(1);

        debug!("Starting scan of {} steps", num_steps);

        Self {
            position_m: pose.position_m,
            start_yaw_rad: pose.yaw_rad,
            step_rad: TAU / num_steps as f64,
            num_steps,
            num_reached: 0,
            issued: false,
        }
    }

    /// The heading currently being turned to.
    fn target(&self) -> Setpoint {
        Setpoint {
            position_m: self.position_m,
            yaw_rad: wrap_2pi(
                self.start_yaw_rad + self.step_rad * (self.num_reached + 1) as f64,
            ),
        }
    }

    pub fn step(
        &mut self,
        params: &FlightMgrParams,
        persistant: &mut FlightMgrPersistantData,
        pose: &Pose,
    ) -> Result<StepOutput, FlightMgrError> {
        if self.issued && self.target().is_yaw_reached(pose, params.yaw_tolerance_rad) {
            self.num_reached += 1;
            self.issued = false;

            if self.num_reached >= self.num_steps {
                persistant.tm.num_scans += 1;
                info!("Scan complete");

                return Ok(StepOutput {
                    action: StateAction::Replace(FlightMgrState::Idle(Idle::new())),
                    cmd: None,
                });
            }
        }

        self.issued = true;

        Ok(StepOutput {
            action: StateAction::None,
            cmd: Some(MotionCmd::Yaw(self.target())),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
