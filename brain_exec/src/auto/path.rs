//! # Path
//!
//! An ordered list of 2D waypoints produced by the planner and consumed by the flight manager.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use super::map::AirspaceMap;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A planned path. The start point of the planning request is not part of the path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points_m: Vec<Point2<f64>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Path {
    pub fn new(points_m: Vec<Point2<f64>>) -> Self {
        Self { points_m }
    }

    pub fn is_empty(&self) -> bool {
        self.points_m.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points_m.len()
    }

    pub fn last(&self) -> Option<&Point2<f64>> {
        self.points_m.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.points_m.iter()
    }

    /// Total length of the path when flown from `start`.
    pub fn length_m(&self, start: &Point2<f64>) -> f64 {
        let mut prev = start;
        let mut length_m = 0.0;

        for p in self.points_m.iter() {
            length_m += nalgebra::distance(prev, p);
            prev = p;
        }

        length_m
    }

    /// Check every segment of the path, starting at `start`, against the map using the given
    /// number of collision sub-steps per segment.
    pub fn is_passable(&self, start: &Point2<f64>, map: &AirspaceMap, num_steps: usize) -> bool {
        let mut prev = start;

        for p in self.points_m.iter() {
            if !map.is_segment_passable(prev, p, num_steps) {
                return false;
            }
            prev = p;
        }

        true
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::map::MapParams;

    #[test]
    fn test_length_and_passability() {
        let map = AirspaceMap::from_json(
            r#"{
                "airspace": {"min": [0.0, 0.0, 0.0], "max": [5.0, 5.0, 2.0]},
                "walls": [{"plane": {"start": [2.0, 0.0, 0.0], "stop": [3.0, 3.0, 2.0]}}]
            }"#,
            MapParams::default(),
        )
        .unwrap();

        let start = Point2::new(1.0, 1.0);
        let around = Path::new(vec![
            Point2::new(1.0, 4.0),
            Point2::new(4.0, 4.0),
            Point2::new(4.0, 1.0),
        ]);
        let through = Path::new(vec![Point2::new(4.0, 1.0)]);

        assert!((around.length_m(&start) - 9.0).abs() < 1e-9);
        assert!(around.is_passable(&start, &map, 1000));
        assert!(!through.is_passable(&start, &map, 1000));
        assert!(Path::default().is_passable(&start, &map, 1000));
    }
}
