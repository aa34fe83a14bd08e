//! #  [`FlightMgr<Idle>`] implementation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, warn};
use nalgebra::Point2;

use super::{
    params::FlightMgrParams,
    states::{FollowPath, Scan, Takeoff},
    FlightMgrError, FlightMgrPersistantData, FlightMgrState, StateAction, StepOutput,
};
use crate::auto::{
    loc::Pose,
    motion::{MotionCmd, Setpoint},
    nav::{NavError, RequestPoint, RrtSearch, SearchStatus},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Idle state of the FlightMgr.
///
/// Selects a goal and plans a path to it, a limited number of planner iterations per cycle.
///
/// Possible transitions:
/// - Takeoff, when the first path is found.
/// - FollowPath, when any later path is found.
/// - Scan, if the vehicle is airborne and already at the goal.
///
/// If the vehicle is too close to an obstacle to plan from, it is first moved to the nearest
/// passable point and the goal is kept until planning can start.
#[derive(Debug, Default)]
pub struct Idle {
    /// The search currently in progress.
    search: Option<RrtSearch>,

    /// Goal waiting for the vehicle to get clear of an obstacle.
    pending_goal: Option<Point2<f64>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

enum SearchStart {
    Started(RrtSearch),

    /// The start is not passable, move here first.
    Escape(Setpoint),

    NotStarted,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Idle {
    pub fn new() -> Self {
        Self {
            search: None,
            pending_goal: None,
        }
    }

    pub fn step(
        &mut self,
        params: &FlightMgrParams,
        persistant: &mut FlightMgrPersistantData,
        pose: &Pose,
    ) -> Result<StepOutput, FlightMgrError> {
        // Start a new search if there's nothing in progress
        let mut search = match self.search.take() {
            Some(s) => s,
            None => match self.start_search(params, persistant, pose) {
                SearchStart::Started(s) => s,
                SearchStart::Escape(sp) => {
                    return Ok(StepOutput {
                        action: StateAction::None,
                        cmd: Some(MotionCmd::Position(sp)),
                    })
                }
                SearchStart::NotStarted => return Ok(StepOutput::none()),
            },
        };

        let status = search.step(&persistant.map, params.plan_iterations_per_cycle);

        if params.rrt.save_reports && !matches!(status, Ok(SearchStatus::InProgress)) {
            match status {
                Ok(SearchStatus::Complete(ref path)) => search.save_report(Some(path)),
                _ => search.save_report(None),
            }
        }

        let path = match status {
            Ok(SearchStatus::InProgress) => {
                self.search = Some(search);
                return Ok(StepOutput::none());
            }
            Ok(SearchStatus::Complete(path)) => path,
            Err(e) => {
                warn!("Planning failed: {}", e);
                persistant.goal_selector.reject(search.goal());
                persistant.tm.num_plan_failures += 1;
                return Ok(StepOutput::none());
            }
        };

        persistant.tm.num_plans += 1;
        persistant.tm.path = Some(path.clone());
        persistant.goal_selector.visited(search.goal());

        let next = if path.is_empty() {
            if !persistant.has_taken_off {
                info!("Already at goal {}, waiting for a new goal", search.goal());
                return Ok(StepOutput::none());
            }

            info!("Already at goal {}, scanning", search.goal());
            FlightMgrState::Scan(Scan::new(params, pose))
        } else if !persistant.has_taken_off {
            FlightMgrState::Takeoff(Takeoff::new(path))
        } else {
            FlightMgrState::FollowPath(FollowPath::from_path(params, &path, pose.yaw_rad))
        };

        Ok(StepOutput {
            action: StateAction::Replace(next),
            cmd: None,
        })
    }

    /// Begin planning to the pending goal, or to a new one from the goal selector.
    fn start_search(
        &mut self,
        params: &FlightMgrParams,
        persistant: &mut FlightMgrPersistantData,
        pose: &Pose,
    ) -> SearchStart {
        let start = pose.position_2d();

        let target_m = match self.pending_goal.take() {
            Some(g) => g,
            None => {
                let proposal = match persistant.goal_selector.next_goal(&start) {
                    Some(p) => p,
                    None => return SearchStart::NotStarted,
                };
                info!(
                    "Planning from {} to {} (expected gain {})",
                    start, proposal.target_m, proposal.expected_gain
                );
                proposal.target_m
            }
        };

        persistant.tm.goal = Some(target_m);

        match persistant
            .planner
            .start_search(start, target_m, &persistant.map)
        {
            Ok(s) => SearchStart::Started(s),
            Err(NavError::UnreachableRequest {
                which: RequestPoint::Start,
                ..
            }) => {
                self.pending_goal = Some(target_m);

                match persistant
                    .map
                    .nearest_passable(&start, params.escape_distance_m)
                {
                    Some(p) => {
                        warn!(
                            "Start {} is not passable, moving to {} before planning to {}",
                            start, p, target_m
                        );
                        SearchStart::Escape(Setpoint::new(
                            p.x,
                            p.y,
                            pose.position_m.z,
                            pose.yaw_rad,
                        ))
                    }
                    None => {
                        warn!(
                            "Start {} is not passable and there is no passable point within {} m",
                            start, params.escape_distance_m
                        );
                        persistant.tm.num_plan_failures += 1;
                        SearchStart::NotStarted
                    }
                }
            }
            Err(e) => {
                warn!("Cannot plan to {}: {}", target_m, e);
                persistant.goal_selector.reject(&target_m);
                persistant.tm.num_plan_failures += 1;
                SearchStart::NotStarted
            }
        }
    }
}
