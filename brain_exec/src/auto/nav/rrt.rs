//! # Rapidly-exploring Random Tree planner
//!
//! Plans a path from a start point to a goal point through an [`AirspaceMap`] by growing a tree
//! of random samples rooted at the start.
//!
//! Each iteration:
//!
//! 1. Samples a point, which is the goal itself with probability `goal_bias` and otherwise a
//!    uniformly random point inside the airspace.
//! 2. Finds the tree node nearest to the sample.
//! 3. Checks the whole segment from that node to the sample in `num_collision_steps` sub-steps.
//!    If every sub-step is passable the sample is added to the tree as a child of the node. The
//!    extension is not limited in length.
//! 4. Stops if the most recently added node is within `goal_tolerance_m` of the goal.
//!
//! The path is then read back from the last node to the root. There is no rewiring or shortening
//! of the path.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::{Duration, Instant};

use log::{debug, info, trace};
use nalgebra::Point2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use util::session;

use super::{NavError, RequestPoint, RrtTree};
use crate::auto::{map::AirspaceMap, path::Path};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrtParams {
    /// Probability of sampling the goal instead of a random point.
    pub goal_bias: f64,

    /// Number of sub-steps used when checking a segment for collisions.
    pub num_collision_steps: usize,

    /// Distance from the goal at which a node is considered to have reached it.
    pub goal_tolerance_m: f64,

    /// Maximum number of iterations before the planning request fails.
    pub max_iterations: usize,

    /// Maximum time spent growing the tree before the planning request fails.
    #[serde(default)]
    pub max_planning_time_s: Option<f64>,

    /// Seed for the sampler. If not given the sampler is seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,

    /// If true a report of every completed search is saved into the session.
    #[serde(default)]
    pub save_reports: bool,
}

pub struct RrtPlanner {
    params: RrtParams,

    /// Source of seeds for each search.
    rng: StdRng,
}

/// A single planning request, which can be grown over a number of calls to
/// [`RrtSearch::step`].
#[derive(Debug)]
pub struct RrtSearch {
    params: RrtParams,

    start: Point2<f64>,

    goal: Point2<f64>,

    tree: RrtTree,

    rng: StdRng,

    /// Total number of iterations performed so far.
    iterations: usize,

    /// Time spent inside [`RrtSearch::step`], excluding time between calls.
    planning_time: Duration,
}

/// Diagnostic record of a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrtReport {
    pub start: Point2<f64>,

    pub goal: Point2<f64>,

    pub iterations: usize,

    pub planning_time_s: f64,

    pub tree: RrtTree,

    pub result: Option<Path>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    /// The per-call iteration limit was reached without reaching the goal.
    InProgress,

    /// The goal was reached.
    Complete(Path),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RrtParams {
    fn default() -> Self {
        Self {
            goal_bias: 0.2,
            num_collision_steps: 1000,
            goal_tolerance_m: 0.2,
            max_iterations: 5000,
            max_planning_time_s: None,
            seed: None,
            save_reports: false,
        }
    }
}

impl RrtPlanner {
    pub fn new(params: RrtParams) -> Self {
        let rng = match params.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        Self { params, rng }
    }

    pub fn params(&self) -> &RrtParams {
        &self.params
    }

    /// Begin a new search from `start` to `goal`.
    ///
    /// Fails with [`NavError::UnreachableRequest`] if either point is not passable, since no tree
    /// could ever connect them.
    pub fn start_search(
        &mut self,
        start: Point2<f64>,
        goal: Point2<f64>,
        map: &AirspaceMap,
    ) -> Result<RrtSearch, NavError> {
        if !map.is_passable(&start) {
            return Err(NavError::UnreachableRequest {
                which: RequestPoint::Start,
                point: start,
            });
        }
        if !map.is_passable(&goal) {
            return Err(NavError::UnreachableRequest {
                which: RequestPoint::Goal,
                point: goal,
            });
        }

        debug!("Starting RRT search from {} to {}", start, goal);

        Ok(RrtSearch {
            params: self.params.clone(),
            start,
            goal,
            tree: RrtTree::new(start),
            rng: StdRng::seed_from_u64(self.rng.random()),
            iterations: 0,
            planning_time: Duration::default(),
        })
    }

    /// Plan a path from `start` to `goal`, growing the tree until the goal is reached or the
    /// iteration/time budget is used up.
    pub fn plan(
        &mut self,
        start: Point2<f64>,
        goal: Point2<f64>,
        map: &AirspaceMap,
    ) -> Result<Path, NavError> {
        let mut search = self.start_search(start, goal, map)?;

        let result = loop {
            match search.step(map, usize::MAX) {
                Ok(SearchStatus::Complete(path)) => break Ok(path),
                Ok(SearchStatus::InProgress) => continue,
                Err(e) => break Err(e),
            }
        };

        if self.params.save_reports {
            search.save_report(result.as_ref().ok());
        }

        result
    }
}

impl RrtSearch {
    /// Grow the tree by at most `max_iterations` iterations.
    ///
    /// Returns [`SearchStatus::Complete`] with the path once the goal is reached, or
    /// [`NavError::PlanningFailure`] once the search's budget is used up. Calling `step` again
    /// after completion returns the same result.
    pub fn step(
        &mut self,
        map: &AirspaceMap,
        max_iterations: usize,
    ) -> Result<SearchStatus, NavError> {
        let step_start = Instant::now();
        let result = self.grow(map, max_iterations, &step_start);
        self.planning_time += step_start.elapsed();

        match result {
            Ok(SearchStatus::Complete(ref path)) => info!(
                "RRT reached {} with {} points after {} iterations ({:.3} s, {} nodes)",
                self.goal,
                path.len(),
                self.iterations,
                self.planning_time.as_secs_f64(),
                self.tree.len()
            ),
            Err(ref e) => debug!("RRT search failed: {}", e),
            _ => (),
        }

        result
    }

    pub fn start(&self) -> &Point2<f64> {
        &self.start
    }

    pub fn goal(&self) -> &Point2<f64> {
        &self.goal
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn tree(&self) -> &RrtTree {
        &self.tree
    }

    pub fn report(&self, result: Option<&Path>) -> RrtReport {
        RrtReport {
            start: self.start,
            goal: self.goal,
            iterations: self.iterations,
            planning_time_s: self.planning_time.as_secs_f64(),
            tree: self.tree.clone(),
            result: result.cloned(),
        }
    }

    /// Save the report of this search into the session.
    pub fn save_report(&self, result: Option<&Path>) {
        session::save_with_timestamp("rrt/rrt_report.json", self.report(result));
    }

    fn grow(
        &mut self,
        map: &AirspaceMap,
        max_iterations: usize,
        step_start: &Instant,
    ) -> Result<SearchStatus, NavError> {
        let mut num_iterations = 0;

        loop {
            if nalgebra::distance(&self.tree.last().point_m, &self.goal)
                <= self.params.goal_tolerance_m
            {
                return Ok(SearchStatus::Complete(
                    self.tree.path_to(self.tree.len() - 1),
                ));
            }

            let elapsed = self.planning_time + step_start.elapsed();
            let out_of_time = match self.params.max_planning_time_s {
                Some(t) => elapsed.as_secs_f64() >= t,
                None => false,
            };

            if self.iterations >= self.params.max_iterations || out_of_time {
                return Err(NavError::PlanningFailure {
                    goal: self.goal,
                    iterations: self.iterations,
                    elapsed_s: elapsed.as_secs_f64(),
                });
            }

            if num_iterations >= max_iterations {
                return Ok(SearchStatus::InProgress);
            }

            self.iterate(map);
            num_iterations += 1;
        }
    }

    /// Perform a single sample-nearest-extend iteration.
    fn iterate(&mut self, map: &AirspaceMap) {
        let sample = self.sample(map);
        let nearest = self.tree.nearest(&sample);
        let nearest_point = self.tree.nodes()[nearest].point_m;

        if map.is_segment_passable(&nearest_point, &sample, self.params.num_collision_steps) {
            let index = self.tree.push(sample, nearest);
            trace!("RRT node {} at {} (parent {})", index, sample, nearest);
        }

        self.iterations += 1;
    }

    fn sample(&mut self, map: &AirspaceMap) -> Point2<f64> {
        if self.rng.random::<f64>() < self.params.goal_bias {
            return self.goal;
        }

        let airspace = map.airspace();

        Point2::new(
            self.rng.random_range(airspace.x_min..=airspace.x_max),
            self.rng.random_range(airspace.y_min..=airspace.y_max),
        )
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::map::MapParams;

    fn map(json: &str) -> AirspaceMap {
        AirspaceMap::from_json(json, MapParams::default()).unwrap()
    }

    fn open_map() -> AirspaceMap {
        map(r#"{"airspace": {"min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 1.0]}}"#)
    }

    /// Wall spanning the full height of the airspace.
    fn blocked_map() -> AirspaceMap {
        map(r#"{
            "airspace": {"min": [0.0, 0.0, 0.0], "max": [5.0, 5.0, 2.0]},
            "walls": [{"plane": {"start": [2.0, 0.0, 0.0], "stop": [3.0, 5.0, 2.0]}}]
        }"#)
    }

    /// Wall with a gap above it.
    fn gap_map() -> AirspaceMap {
        map(r#"{
            "airspace": {"min": [0.0, 0.0, 0.0], "max": [5.0, 5.0, 2.0]},
            "walls": [{"plane": {"start": [2.0, 0.0, 0.0], "stop": [3.0, 3.0, 2.0]}}]
        }"#)
    }

    fn params(seed: u64, max_iterations: usize) -> RrtParams {
        RrtParams {
            max_iterations,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_start_at_goal() {
        let map = open_map();
        let mut planner = RrtPlanner::new(params(0, 100));
        let p = Point2::new(0.5, 0.5);

        let mut search = planner.start_search(p, p, &map).unwrap();
        assert_eq!(
            search.step(&map, 10).unwrap(),
            SearchStatus::Complete(Path::default())
        );
        assert_eq!(search.iterations(), 0);

        // Within tolerance also terminates immediately
        let path = planner.plan(p, Point2::new(0.6, 0.5), &map).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_unreachable_request() {
        let map = blocked_map();
        let mut planner = RrtPlanner::new(params(0, 100));

        assert!(matches!(
            planner.plan(Point2::new(2.5, 2.5), Point2::new(4.0, 2.5), &map),
            Err(NavError::UnreachableRequest {
                which: RequestPoint::Start,
                ..
            })
        ));
        assert!(matches!(
            planner.plan(Point2::new(1.0, 2.5), Point2::new(4.95, 2.5), &map),
            Err(NavError::UnreachableRequest {
                which: RequestPoint::Goal,
                ..
            })
        ));

        // Points closer to the airspace edge than the vehicle half width are rejected
        assert!(matches!(
            planner.plan(Point2::new(0.1, 0.1), Point2::new(0.9, 0.9), &open_map()),
            Err(NavError::UnreachableRequest { .. })
        ));
    }

    #[test]
    fn test_open_airspace() {
        let map = open_map();
        let start = Point2::new(0.2, 0.2);
        let goal = Point2::new(0.8, 0.8);

        for seed in 0..20 {
            let mut planner = RrtPlanner::new(params(seed, 5000));
            let mut search = planner.start_search(start, goal, &map).unwrap();

            let path = match search.step(&map, usize::MAX).unwrap() {
                SearchStatus::Complete(p) => p,
                SearchStatus::InProgress => panic!("Search should have completed"),
            };

            assert!(!path.is_empty());
            assert!(nalgebra::distance(path.last().unwrap(), &goal) <= 0.2);
            assert!(search.iterations() < 200, "took {} iterations", search.iterations());
        }
    }

    #[test]
    fn test_blocking_wall_fails() {
        let map = blocked_map();
        let mut planner = RrtPlanner::new(params(3, 300));

        match planner.plan(Point2::new(1.0, 2.5), Point2::new(4.0, 2.5), &map) {
            Err(NavError::PlanningFailure { iterations, .. }) => assert_eq!(iterations, 300),
            r => panic!("Expected a planning failure, got {:?}", r),
        }
    }

    #[test]
    fn test_time_budget() {
        let map = blocked_map();
        let mut planner = RrtPlanner::new(RrtParams {
            max_iterations: usize::MAX,
            max_planning_time_s: Some(0.05),
            seed: Some(1),
            ..Default::default()
        });

        assert!(matches!(
            planner.plan(Point2::new(1.0, 2.5), Point2::new(4.0, 2.5), &map),
            Err(NavError::PlanningFailure { .. })
        ));
    }

    #[test]
    fn test_detour_around_wall() {
        let map = gap_map();
        let start = Point2::new(1.0, 2.5);
        let goal = Point2::new(4.0, 2.5);

        for seed in 0..5 {
            let mut planner = RrtPlanner::new(params(seed, 20000));
            let path = planner.plan(start, goal, &map).unwrap();

            assert!(!path.is_empty());
            assert!(nalgebra::distance(path.last().unwrap(), &goal) <= 0.2);

            // Replaying the path at the planning resolution never collides
            assert!(path.is_passable(&start, &map, 1000));
            assert!(path.iter().all(|p| map.is_passable(p)));

            // The only way past the wall is over its top
            assert!(path.iter().any(|p| p.y > 3.25));
        }
    }

    #[test]
    fn test_incremental_search() {
        let map = blocked_map();
        let mut planner = RrtPlanner::new(params(7, 10));
        let mut search = planner
            .start_search(Point2::new(1.0, 2.5), Point2::new(4.0, 2.5), &map)
            .unwrap();

        for i in 1..10 {
            assert_eq!(search.step(&map, 1).unwrap(), SearchStatus::InProgress);
            assert_eq!(search.iterations(), i);
        }

        // The tenth iteration uses up the budget

        assert!(matches!(
            search.step(&map, 1),
            Err(NavError::PlanningFailure { iterations: 10, .. })
        ));

        let report = search.report(None);
        assert_eq!(report.iterations, 10);
        assert_eq!(report.tree.len(), search.tree().len());
        assert!(report.tree.nodes().iter().all(|n| n.point_m.x < 1.75));
    }

    #[test]
    fn test_seeded_plans_repeat() {
        let map = gap_map();
        let start = Point2::new(1.0, 2.5);
        let goal = Point2::new(4.0, 2.5);

        let a = RrtPlanner::new(params(42, 20000)).plan(start, goal, &map).unwrap();
        let b = RrtPlanner::new(params(42, 20000)).plan(start, goal, &map).unwrap();

        assert_eq!(a, b);
    }
}
