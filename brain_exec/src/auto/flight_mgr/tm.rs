//! # Defines Telemetry Pack for the FlightMgr

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::Serialize;

use super::FlightState;
use crate::auto::{loc::Pose, path::Path};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Default)]
pub struct FlightTm {
    pub state: FlightState,
    pub pose: Option<Pose>,
    pub must_land: bool,
    pub goal: Option<Point2<f64>>,
    pub path: Option<Path>,
    pub waypoint_index: Option<usize>,
    pub num_plans: usize,
    pub num_plan_failures: usize,
    pub num_scans: usize,
}
