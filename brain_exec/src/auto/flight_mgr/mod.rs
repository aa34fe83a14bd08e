//! # FlightMgr module
//!
//! This module implements the [`FlightMgr`] state machine, which sequences the vehicle through
//! exploration flights. The state machine is broken down into a number of states:
//!
//! - `Idle` - Waiting for localisation, selecting a goal and planning a path to it.
//! - `Takeoff` - Commands a climb to flight altitude above the current position. Only entered
//!   before the first path.
//! - `FollowPath` - Commands each waypoint of the path in turn, waiting until it is reached.
//! - `Scan` - Turns a full circle in place so the cameras can see everything around the vehicle.
//! - `EmergencyLanding` - Entered from any state when the vehicle must land. Terminal, no further
//!   commands are issued.
//!
//! The manager is stepped once per control cycle with a [`FlightCtx`] containing the current
//! pose and the must land flag. No step blocks: planning is spread over several cycles and
//! waypoints are waited on by re-checking the pose each cycle, so the must land flag is acted on
//! in the same cycle it is raised.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod follow_path;
mod idle;
mod params;
mod scan;
mod takeoff;
pub mod tm;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt::Display, sync::Arc};

use log::{error, info, warn};
use serde::Serialize;

pub use self::{params::FlightMgrParams, tm::FlightTm};

use super::{
    explore::GoalSelector, loc::Pose, map::AirspaceMap, motion::MotionCmd, nav::RrtPlanner,
};

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub mod states {
    pub use super::follow_path::FollowPath;
    pub use super::idle::Idle;
    pub use super::scan::Scan;
    pub use super::takeoff::Takeoff;
}

use states::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Flight Manager
///
/// This struct is responsible for managing the flight state of the vehicle.
pub struct FlightMgr {
    /// Parameters for the FlightMgr and all it's states.
    pub params: FlightMgrParams,

    /// Persistant data of the FlightMgr.
    ///
    /// This is data which is valid over all states, such as the map and the planner.
    pub persistant: FlightMgrPersistantData,

    state: FlightMgrState,

    /// True while the pose has been unavailable, used to log loss and recovery only once.
    pose_lost: bool,
}

pub struct FlightMgrPersistantData {
    /// The airspace map, shared read only with the rest of the exec.
    pub map: Arc<AirspaceMap>,

    pub planner: RrtPlanner,

    /// Chooses where to fly to next.
    pub goal_selector: Box<dyn GoalSelector>,

    /// Set once the takeoff hold has been commanded, after which no further takeoff is needed.
    pub has_taken_off: bool,

    /// Telemetry packet summarising the flight state.
    pub tm: FlightTm,
}

/// The context the FlightMgr is stepped with.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlightCtx {
    /// Current pose, `None` if the vehicle is not localised.
    pub pose: Option<Pose>,

    /// Sticky flag raised by the battery monitor.
    pub must_land: bool,
}

/// Output of a single FlightMgr step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightOutput {
    /// Command to send to the vehicle this cycle, if any.
    pub cmd: Option<MotionCmd>,

    /// State of the FlightMgr after the step.
    pub state: FlightState,
}

/// Output of a state's step function.
pub struct StepOutput {
    /// Action to perform on the state machine itself
    pub action: StateAction,

    /// Command to send to the vehicle
    pub cmd: Option<MotionCmd>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the flight manager.
#[derive(Debug, thiserror::Error)]
pub enum FlightMgrError {
    #[error("Failed to load FlightMgrParams: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid FlightMgrParams: {0}")]
    InvalidParams(String),

    #[error("The path being followed has no waypoint {0}")]
    NoWaypoint(usize),
}

/// Externally visible flight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlightState {
    Idle,
    Takeoff,
    FollowingPath,
    Scanning,
    EmergencyLanding,
}

#[derive(Debug)]
pub enum FlightMgrState {
    Idle(Idle),
    Takeoff(Takeoff),
    FollowPath(FollowPath),
    Scan(Scan),
    EmergencyLanding,
}

/// Actions that can be performed on the state machine at the end of a state's step function.
#[derive(Debug)]
pub enum StateAction {
    None,
    Replace(FlightMgrState),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FlightMgr {
    /// Load the parameters from the given file and create the manager.
    pub fn init(
        params_path: &str,
        map: Arc<AirspaceMap>,
        goal_selector: Box<dyn GoalSelector>,
    ) -> Result<Self, FlightMgrError> {
        let params: FlightMgrParams =
            util::params::load(params_path).map_err(FlightMgrError::ParamLoadError)?;

        Self::new(params, map, goal_selector)
    }

    pub fn new(
        params: FlightMgrParams,
        map: Arc<AirspaceMap>,
        goal_selector: Box<dyn GoalSelector>,
    ) -> Result<Self, FlightMgrError> {
        params.validate().map_err(FlightMgrError::InvalidParams)?;

        Ok(Self {
            persistant: FlightMgrPersistantData {
                map,
                planner: RrtPlanner::new(params.rrt.clone()),
                goal_selector,
                has_taken_off: false,
                tm: FlightTm::default(),
            },
            params,
            state: FlightMgrState::Idle(Idle::new()),
            pose_lost: false,
        })
    }

    /// Step the state machine for one control cycle.
    pub fn step(&mut self, ctx: &FlightCtx) -> FlightOutput {
        self.persistant.tm.pose = ctx.pose;
        self.persistant.tm.must_land = ctx.must_land;

        // Must land overrides everything, including any plan in progress
        if ctx.must_land && !self.is_terminated() {
            warn!("Must land raised, aborting {} for emergency landing", self.state);
            self.set_state(FlightMgrState::EmergencyLanding);
        }

        if self.is_terminated() {
            return self.output(None);
        }

        let pose = match ctx.pose {
            Some(p) => {
                if self.pose_lost {
                    info!("Pose available, resuming {}", self.state);
                    self.pose_lost = false;
                }
                p
            }
            None => {
                if !self.pose_lost {
                    warn!("No pose available, holding {}", self.state);
                    self.pose_lost = true;
                }
                return self.output(None);
            }
        };

        self.persistant
            .goal_selector
            .observe(&pose.position_2d());

        let out = self.state.step(&self.params, &mut self.persistant, &pose);

        if let StateAction::Replace(s) = out.action {
            self.set_state(s);
        }

        self.output(out.cmd)
    }

    /// The current flight state.
    pub fn state(&self) -> FlightState {
        self.state.flight_state()
    }

    /// True once the manager has entered emergency landing.
    pub fn is_terminated(&self) -> bool {
        matches!(self.state, FlightMgrState::EmergencyLanding)
    }

    pub fn get_tm(&self) -> FlightTm {
        self.persistant.tm.clone()
    }

    fn set_state(&mut self, state: FlightMgrState) {
        self.state = state;
        self.persistant.tm.state = self.state.flight_state();

        if !matches!(self.state, FlightMgrState::FollowPath(_)) {
            self.persistant.tm.waypoint_index = None;
        }

        info!("FlightMgr state change to: {}", self.state);
    }

    fn output(&self, cmd: Option<MotionCmd>) -> FlightOutput {
        FlightOutput {
            cmd,
            state: self.state(),
        }
    }
}

impl Default for FlightState {
    fn default() -> Self {
        FlightState::Idle
    }
}

impl Display for FlightMgrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlightMgrState::Idle(_) => write!(f, "FlightMgrState::Idle"),
            FlightMgrState::Takeoff(_) => write!(f, "FlightMgrState::Takeoff"),
            FlightMgrState::FollowPath(_) => write!(f, "FlightMgrState::FollowPath"),
            FlightMgrState::Scan(_) => write!(f, "FlightMgrState::Scan"),
            FlightMgrState::EmergencyLanding => write!(f, "FlightMgrState::EmergencyLanding"),
        }
    }
}

impl FlightMgrState {
    fn flight_state(&self) -> FlightState {
        match self {
            FlightMgrState::Idle(_) => FlightState::Idle,
            FlightMgrState::Takeoff(_) => FlightState::Takeoff,
            FlightMgrState::FollowPath(_) => FlightState::FollowingPath,
            FlightMgrState::Scan(_) => FlightState::Scanning,
            FlightMgrState::EmergencyLanding => FlightState::EmergencyLanding,
        }
    }

    fn step(
        &mut self,
        params: &FlightMgrParams,
        persistant: &mut FlightMgrPersistantData,
        pose: &Pose,
    ) -> StepOutput {
        let out = match self {
            FlightMgrState::Idle(idle) => idle.step(params, persistant, pose),
            FlightMgrState::Takeoff(takeoff) => takeoff.step(params, persistant, pose),
            FlightMgrState::FollowPath(follow) => follow.step(params, persistant, pose),
            FlightMgrState::Scan(scan) => scan.step(params, persistant, pose),
            FlightMgrState::EmergencyLanding => Ok(StepOutput::none()),
        };

        // If a state errors we print it and drop back to Idle, keeping the system working
        match out {
            Ok(o) => o,
            Err(e) => {
                error!("{}", e);
                StepOutput {
                    action: StateAction::Replace(FlightMgrState::Idle(Idle::new())),
                    cmd: None,
                }
            }
        }
    }
}

impl StepOutput {
    pub fn none() -> Self {
        Self {
            action: StateAction::None,
            cmd: None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::{
        explore::{Explorer, ExplorerParams, GoalList, GoalProposal, GoalSelector},
        map::MapParams,
        motion::Setpoint,
        nav::RrtParams,
    };
    use nalgebra::Point2;
    use std::{cell::RefCell, rc::Rc};

    /// Goals handed out in order, keeping a record of which were rejected.
    struct RecordingGoals {
        goals: Vec<Point2<f64>>,
        rejected: Rc<RefCell<Vec<Point2<f64>>>>,
    }

    impl GoalSelector for RecordingGoals {
        fn observe(&mut self, _position_m: &Point2<f64>) {}

        fn next_goal(&mut self, _position_m: &Point2<f64>) -> Option<GoalProposal> {
            if self.goals.is_empty() {
                return None;
            }
            Some(GoalProposal {
                target_m: self.goals.remove(0),
                expected_gain: 0,
            })
        }

        fn reject(&mut self, target_m: &Point2<f64>) {
            self.rejected.borrow_mut().push(*target_m);
        }

        fn visited(&mut self, _target_m: &Point2<f64>) {}
    }

    fn open_map() -> Arc<AirspaceMap> {
        Arc::new(
            AirspaceMap::from_json(
                r#"{"airspace": {"min": [0.0, 0.0, 0.0], "max": [5.0, 5.0, 2.0]}}"#,
                MapParams::default(),
            )
            .unwrap(),
        )
    }

    fn blocked_map() -> Arc<AirspaceMap> {
        Arc::new(
            AirspaceMap::from_json(
                r#"{
                    "airspace": {"min": [0.0, 0.0, 0.0], "max": [5.0, 5.0, 2.0]},
                    "walls": [{"plane": {"start": [2.0, 0.0, 0.0], "stop": [3.0, 5.0, 2.0]}}]
                }"#,
                MapParams::default(),
            )
            .unwrap(),
        )
    }

    fn params() -> FlightMgrParams {
        FlightMgrParams {
            plan_iterations_per_cycle: 1000,
            rrt: RrtParams {
                seed: Some(11),
                max_iterations: 5000,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn mgr(map: Arc<AirspaceMap>, params: FlightMgrParams, goals: Vec<Point2<f64>>) -> FlightMgr {
        FlightMgr::new(params, map, Box::new(GoalList::new(goals))).unwrap()
    }

    /// Move the vehicle straight onto any commanded setpoint.
    fn apply(pose: &mut Pose, cmd: &Option<MotionCmd>) {
        match cmd {
            Some(MotionCmd::Position(s)) => pose.position_m = s.position_m,
            Some(MotionCmd::Yaw(s)) => pose.yaw_rad = s.yaw_rad,
            None => (),
        }
    }

    /// Run the manager with an ideal vehicle, returning every output.
    fn fly(mgr: &mut FlightMgr, pose: &mut Pose, num_cycles: usize) -> Vec<FlightOutput> {
        let mut outputs = Vec::new();

        for _ in 0..num_cycles {
            let out = mgr.step(&FlightCtx {
                pose: Some(*pose),
                must_land: false,
            });
            apply(pose, &out.cmd);
            outputs.push(out);
        }

        outputs
    }

    fn count_entries(outputs: &[FlightOutput], state: FlightState) -> usize {
        let mut count = 0;
        let mut prev = FlightState::Idle;

        for o in outputs {
            if o.state == state && prev != state {
                count += 1;
            }
            prev = o.state;
        }

        count
    }

    #[test]
    fn test_full_flight() {
        let mut mgr = mgr(
            open_map(),
            params(),
            vec![Point2::new(3.0, 1.0), Point2::new(3.0, 3.0)],
        );
        let mut pose = Pose::new(1.0, 1.0, 0.0, 0.0);

        let outputs = fly(&mut mgr, &mut pose, 200);

        // The first command is the hold above the start position
        let first = outputs.iter().find_map(|o| o.cmd).unwrap();
        assert_eq!(first, MotionCmd::Position(Setpoint::new(1.0, 1.0, 0.3, 0.0)));

        // Takeoff only happens once, every path ends with exactly one scan
        assert_eq!(count_entries(&outputs, FlightState::Takeoff), 1);
        assert_eq!(count_entries(&outputs, FlightState::FollowingPath), 2);
        assert_eq!(count_entries(&outputs, FlightState::Scanning), 2);

        let tm = mgr.get_tm();
        assert_eq!(tm.num_plans, 2);
        assert_eq!(tm.num_scans, 2);
        assert_eq!(mgr.state(), FlightState::Idle);

        // Ended up near the last goal at flight altitude, having turned a full circle
        assert!(nalgebra::distance(&pose.position_2d(), &Point2::new(3.0, 3.0)) <= 0.2);
        assert_eq!(pose.position_m.z, 0.3);
        assert!(pose.yaw_rad.abs() < 1e-9 || (pose.yaw_rad - std::f64::consts::TAU).abs() < 1e-9);

        // Nothing left to do, so nothing more is commanded
        assert!(outputs.iter().rev().take(10).all(|o| o.cmd.is_none()));
    }

    #[test]
    fn test_scan_follows_last_waypoint() {
        let mut mgr = mgr(open_map(), params(), vec![Point2::new(4.0, 4.0)]);
        let mut pose = Pose::new(1.0, 1.0, 0.0, 0.0);

        let outputs = fly(&mut mgr, &mut pose, 100);

        let scan_start = outputs
            .iter()
            .position(|o| o.state == FlightState::Scanning)
            .unwrap();

        // The cycle before the scan was following the path, and no position command is given
        // during the scan
        assert_eq!(outputs[scan_start - 1].state, FlightState::FollowingPath);
        let num_yaw_cmds = outputs
            .iter()
            .filter(|o| matches!(o.cmd, Some(MotionCmd::Yaw(_))))
            .count();
        assert_eq!(num_yaw_cmds, 4);
        assert!(outputs[scan_start..]
            .iter()
            .all(|o| !matches!(o.cmd, Some(MotionCmd::Position(_)))));
    }

    #[test]
    fn test_waits_for_waypoint() {
        let mut mgr = mgr(open_map(), params(), vec![Point2::new(3.0, 1.0)]);
        let pose = Pose::new(1.0, 1.0, 0.0, 0.0);
        let ctx = FlightCtx {
            pose: Some(pose),
            must_land: false,
        };

        // Plan then take off
        assert_eq!(mgr.step(&ctx).state, FlightState::Takeoff);
        let hold = mgr.step(&ctx).cmd;
        assert_eq!(mgr.state(), FlightState::FollowingPath);

        // The vehicle never moves, so the hold is repeated
        for _ in 0..10 {
            assert_eq!(mgr.step(&ctx).cmd, hold);
        }
        assert_eq!(mgr.get_tm().waypoint_index, Some(0));
    }

    #[test]
    fn test_emergency_is_terminal() {
        let mut mgr = mgr(open_map(), params(), vec![Point2::new(4.0, 4.0)]);
        let mut pose = Pose::new(1.0, 1.0, 0.0, 0.0);

        // Plan, then command the takeoff hold
        fly(&mut mgr, &mut pose, 2);
        assert_eq!(mgr.state(), FlightState::FollowingPath);

        let out = mgr.step(&FlightCtx {
            pose: Some(pose),
            must_land: true,
        });
        assert_eq!(out.state, FlightState::EmergencyLanding);
        assert_eq!(out.cmd, None);

        // Nothing is ever commanded again, even if the flag drops
        for must_land in [true, false].iter() {
            for _ in 0..10 {
                let out = mgr.step(&FlightCtx {
                    pose: Some(pose),
                    must_land: *must_land,
                });
                assert_eq!(out.cmd, None);
                assert_eq!(out.state, FlightState::EmergencyLanding);
            }
        }
        assert!(mgr.is_terminated());
    }

    #[test]
    fn test_emergency_interrupts_planning() {
        let mut p = params();
        p.plan_iterations_per_cycle = 1;
        p.rrt.max_iterations = 100_000;

        let mut mgr = mgr(blocked_map(), p, vec![Point2::new(4.0, 2.5)]);
        let ctx = FlightCtx {
            pose: Some(Pose::new(1.0, 2.5, 0.0, 0.0)),
            must_land: false,
        };

        // Planning towards an unreachable goal keeps going one iteration per cycle
        for _ in 0..20 {
            assert_eq!(mgr.step(&ctx), FlightOutput { cmd: None, state: FlightState::Idle });
        }

        let out = mgr.step(&FlightCtx {
            must_land: true,
            ..ctx
        });
        assert_eq!(out.state, FlightState::EmergencyLanding);
    }

    #[test]
    fn test_no_pose_holds_state() {
        let mut mgr = mgr(open_map(), params(), vec![Point2::new(4.0, 4.0)]);
        let no_pose = FlightCtx::default();

        // Not localised, nothing happens
        for _ in 0..5 {
            assert_eq!(mgr.step(&no_pose), FlightOutput { cmd: None, state: FlightState::Idle });
        }
        assert_eq!(mgr.get_tm().num_plans, 0);

        let mut pose = Pose::new(1.0, 1.0, 0.0, 0.0);
        fly(&mut mgr, &mut pose, 2);
        assert_eq!(mgr.state(), FlightState::FollowingPath);

        // Losing the pose mid path stops commands without changing state
        for _ in 0..5 {
            let out = mgr.step(&no_pose);
            assert_eq!(out.cmd, None);
            assert_eq!(out.state, FlightState::FollowingPath);
        }

        let out = fly(&mut mgr, &mut pose, 1);
        assert!(matches!(out[0].cmd, Some(MotionCmd::Position(_))));
    }

    #[test]
    fn test_planning_failure_is_recovered() {
        let mut p = params();
        p.rrt.max_iterations = 50;

        let mut mgr = mgr(
            blocked_map(),
            p,
            vec![
                // Behind the wall
                Point2::new(4.0, 2.5),
                // Inside the wall
                Point2::new(2.5, 2.5),
                // Reachable
                Point2::new(1.0, 4.0),
            ],
        );
        let mut pose = Pose::new(1.0, 2.5, 0.0, 0.0);

        let outputs = fly(&mut mgr, &mut pose, 3);
        assert!(outputs[..2].iter().all(|o| o.cmd.is_none() && o.state == FlightState::Idle));
        assert_eq!(outputs[2].state, FlightState::Takeoff);

        let tm = mgr.get_tm();
        assert_eq!(tm.num_plan_failures, 2);
        assert_eq!(tm.num_plans, 1);
    }

    #[test]
    fn test_blocked_start_moves_clear() {
        let rejected = Rc::new(RefCell::new(Vec::new()));
        let goals = RecordingGoals {
            goals: vec![
                // Inside the wall
                Point2::new(2.5, 2.5),
                // Reachable
                Point2::new(1.0, 4.0),
            ],
            rejected: rejected.clone(),
        };
        let mut mgr = FlightMgr::new(params(), blocked_map(), Box::new(goals)).unwrap();

        // Just inside the inflated face of the wall
        let mut pose = Pose::new(1.8, 1.0, 0.0, 0.0);

        // First the vehicle is moved clear, without blaming the goal
        let out = fly(&mut mgr, &mut pose, 1);
        assert_eq!(out[0].state, FlightState::Idle);
        let escape = match out[0].cmd {
            Some(MotionCmd::Position(s)) => s,
            c => panic!("Expected a position command, got {:?}", c),
        };
        assert!(blocked_map().is_passable(&Point2::new(escape.position_m.x, escape.position_m.y)));
        assert!((escape.position_m.y - 1.0).abs() < 1e-9);
        assert_eq!(escape.position_m.z, 0.0);
        assert!(rejected.borrow().is_empty());
        assert_eq!(mgr.get_tm().num_plan_failures, 0);
        assert_eq!(mgr.get_tm().goal, Some(Point2::new(2.5, 2.5)));

        // Then the same goal is tried from the clear position, and only then rejected
        let out = fly(&mut mgr, &mut pose, 1);
        assert_eq!(out[0], FlightOutput { cmd: None, state: FlightState::Idle });
        assert_eq!(*rejected.borrow(), vec![Point2::new(2.5, 2.5)]);
        assert_eq!(mgr.get_tm().num_plan_failures, 1);

        // The next goal is planned normally
        let out = fly(&mut mgr, &mut pose, 1);
        assert_eq!(out[0].state, FlightState::Takeoff);
        assert_eq!(mgr.get_tm().num_plans, 1);
        assert_eq!(rejected.borrow().len(), 1);
    }

    #[test]
    fn test_exploring_with_short_render_distance() {
        let map = open_map();
        let explorer = Explorer::new(
            &map,
            ExplorerParams {
                discretisation_m: 0.05,
                render_distance_m: 0.1,
            },
        )
        .unwrap();
        let mut mgr = FlightMgr::new(params(), map, Box::new(explorer)).unwrap();
        let start = Pose::new(1.0, 1.0, 0.0, 0.0);
        let mut pose = start;

        // Goals closer than the planner's tolerance give empty paths, those must not be proposed
        // forever
        let outputs = fly(&mut mgr, &mut pose, 200);

        assert_eq!(count_entries(&outputs, FlightState::Takeoff), 1);
        assert!(count_entries(&outputs, FlightState::FollowingPath) >= 1);
        assert!(outputs.iter().any(|o| match o.cmd {
            Some(MotionCmd::Position(s)) => {
                nalgebra::distance(
                    &Point2::new(s.position_m.x, s.position_m.y),
                    &start.position_2d(),
                ) > 0.2
            }
            _ => false,
        }));
    }

    #[test]
    fn test_goal_already_reached() {
        let mut mgr = mgr(
            open_map(),
            params(),
            vec![Point2::new(1.05, 1.0), Point2::new(3.0, 1.0), Point2::new(3.0, 1.0)],
        );
        let mut pose = Pose::new(1.0, 1.0, 0.0, 0.0);

        // On the ground a goal at the current position is skipped without taking off
        let out = fly(&mut mgr, &mut pose, 1);
        assert_eq!(out[0], FlightOutput { cmd: None, state: FlightState::Idle });

        // Once airborne it still ends with a scan
        let outputs = fly(&mut mgr, &mut pose, 200);
        assert_eq!(count_entries(&outputs, FlightState::Takeoff), 1);
        assert_eq!(count_entries(&outputs, FlightState::FollowingPath), 1);
        assert_eq!(count_entries(&outputs, FlightState::Scanning), 2);
        assert_eq!(mgr.get_tm().num_scans, 2);
    }

    #[test]
    fn test_invalid_params() {
        let bad: [fn(&mut FlightMgrParams); 9] = [
            |p| p.scan_step_rad = 0.0,
            |p| p.escape_distance_m = -0.1,
            |p| p.rrt.goal_bias = 1.5,
            |p| p.rrt.goal_tolerance_m = -0.2,
            |p| p.rrt.num_collision_steps = 0,
            |p| p.rrt.max_iterations = 0,
            |p| p.rrt.max_planning_time_s = Some(0.0),
            |p| p.rrt.max_planning_time_s = Some(-1.0),
            |p| p.rrt.max_planning_time_s = Some(f64::NAN),
        ];

        for make_bad in bad.iter() {
            let mut p = params();
            make_bad(&mut p);

            assert!(matches!(
                FlightMgr::new(p, open_map(), Box::new(GoalList::default())),
                Err(FlightMgrError::InvalidParams(_))
            ));
        }

        // Zero tolerance and no time limit are fine
        let mut p = params();
        p.rrt.goal_tolerance_m = 0.0;
        p.rrt.max_planning_time_s = None;
        assert!(p.validate().is_ok());
    }
}
