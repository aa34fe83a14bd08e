//! # Navigation
//!
//! This module provides path planning for the vehicle through the [`AirspaceMap`](super::map::AirspaceMap).
//!
//! Planning is performed by a goal biased Rapidly-exploring Random Tree, see [`rrt`]. The tree can
//! either be grown to completion with [`RrtPlanner::plan`], or grown a few iterations at a time
//! with an [`RrtSearch`] so that the control loop keeps running while a plan is computed.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod rrt;
mod tree;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use rrt::{RrtParams, RrtPlanner, RrtReport, RrtSearch, SearchStatus};
pub use tree::{RrtTree, TreeNode};

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use nalgebra::Point2;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("The {which} point {point} of the planning request is not passable")]
    UnreachableRequest {
        which: RequestPoint,
        point: Point2<f64>,
    },

    #[error("No path found to {goal} after {iterations} iterations ({elapsed_s:.3} s)")]
    PlanningFailure {
        goal: Point2<f64>,
        iterations: usize,
        elapsed_s: f64,
    },
}

/// Which point of a planning request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPoint {
    Start,
    Goal,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Display for RequestPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestPoint::Start => write!(f, "start"),
            RequestPoint::Goal => write!(f, "goal"),
        }
    }
}
