//! # Airspace map
//!
//! Obstacles are stored already inflated by the vehicle half width plus the clearance margin, so
//! the vehicle can be treated as a point when checking them. The airspace boundary is not
//! inflated, instead the half width is applied during [`AirspaceMap::is_passable`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::Path;

use log::{debug, info};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use super::{
    lattice_size, AirspaceDesc, MapError, MapFile, OccupancyGrid, WallDesc, MAX_LATTICE_POINTS,
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Half of the largest side of the vehicle's frame.
pub const VEHICLE_HALF_WIDTH_M: f64 = 0.15;

/// Limit on the number of grid steps searched either side of a point for a passable neighbour.
const MAX_SEARCH_STEPS: f64 = 100.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters used when building an [`AirspaceMap`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MapParams {
    /// Half width of the vehicle, applied to both obstacles and the airspace boundary.
    pub vehicle_half_width_m: f64,

    /// Extra margin added around every obstacle on top of the vehicle half width.
    pub clearance_m: f64,

    /// Spacing of the occupancy grid lattice.
    pub grid_resolution_m: f64,
}

/// Horizontal and vertical extent of the flight volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Airspace {
    pub x_min: f64,
    pub y_min: f64,
    pub z_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_max: f64,
}

/// An inflated, axis aligned obstacle. The z bounds are those of the original wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x_min: f64,
    pub y_min: f64,
    pub z_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_max: f64,
}

/// The airspace, its obstacles, and the occupancy grid derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct AirspaceMap {
    params: MapParams,

    airspace: Airspace,

    obstacles: Vec<Obstacle>,

    occupancy: OccupancyGrid,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MapParams {
    fn default() -> Self {
        Self {
            vehicle_half_width_m: VEHICLE_HALF_WIDTH_M,
            clearance_m: 0.1,
            grid_resolution_m: 0.05,
        }
    }
}

impl Airspace {
    fn from_desc(desc: &AirspaceDesc) -> Result<Self, MapError> {
        let all_finite = desc.min.iter().chain(desc.max.iter()).all(|v| v.is_finite());
        if !all_finite {
            return Err(MapError::MalformedMap(
                "airspace bounds must be finite".into(),
            ));
        }

        let airspace = Self {
            x_min: desc.min[0],
            y_min: desc.min[1],
            z_min: desc.min[2],
            x_max: desc.max[0],
            y_max: desc.max[1],
            z_max: desc.max[2],
        };

        if airspace.x_min > airspace.x_max || airspace.y_min > airspace.y_max {
            return Err(MapError::MalformedMap(format!(
                "airspace min ({}, {}) exceeds max ({}, {})",
                airspace.x_min, airspace.y_min, airspace.x_max, airspace.y_max
            )));
        }

        Ok(airspace)
    }

    /// True if a square of the given half width centred on the point stays inside the airspace.
    pub fn contains(&self, point: &Point2<f64>, half_width_m: f64) -> bool {
        !(point.x + half_width_m > self.x_max
            || point.x - half_width_m < self.x_min
            || point.y + half_width_m > self.y_max
            || point.y - half_width_m < self.y_min)
    }

    pub fn width_m(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height_m(&self) -> f64 {
        self.y_max - self.y_min
    }
}

impl Obstacle {
    /// Build an obstacle from a wall, growing it by `inflation_m` along x and y.
    fn from_wall(wall: &WallDesc, inflation_m: f64) -> Result<Self, MapError> {
        let (start, stop) = (wall.plane.start, wall.plane.stop);

        if !start.iter().chain(stop.iter()).all(|v| v.is_finite()) {
            return Err(MapError::MalformedMap("wall corners must be finite".into()));
        }

        Ok(Self {
            x_min: start[0].min(stop[0]) - inflation_m,
            y_min: start[1].min(stop[1]) - inflation_m,
            z_min: start[2].min(stop[2]),
            x_max: start[0].max(stop[0]) + inflation_m,
            y_max: start[1].max(stop[1]) + inflation_m,
            z_max: start[2].max(stop[2]),
        })
    }

    /// True if the point lies inside the obstacle or on its boundary.
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        point.x >= self.x_min
            && point.x <= self.x_max
            && point.y >= self.y_min
            && point.y <= self.y_max
    }
}

impl AirspaceMap {
    /// Build the map from a parsed world file.
    pub fn build(desc: &MapFile, params: MapParams) -> Result<Self, MapError> {
        if !(params.grid_resolution_m > 0.0) {
            return Err(MapError::MalformedMap(format!(
                "grid resolution must be positive, got {}",
                params.grid_resolution_m
            )));
        }

        let airspace = match desc.airspace {
            Some(ref a) => Airspace::from_desc(a)?,
            None => {
                return Err(MapError::MalformedMap(
                    "the map has no airspace bounds".into(),
                ))
            }
        };

        if lattice_size(airspace.width_m(), airspace.height_m(), params.grid_resolution_m).is_none()
        {
            return Err(MapError::MalformedMap(format!(
                "grid resolution {} gives more than {} occupancy cells",
                params.grid_resolution_m, MAX_LATTICE_POINTS
            )));
        }

        let inflation_m = params.vehicle_half_width_m + params.clearance_m;

        let obstacles = match desc.walls {
            Some(ref walls) => walls
                .iter()
                .map(|w| Obstacle::from_wall(w, inflation_m))
                .collect::<Result<Vec<_>, _>>()?,
            None => {
                info!("No obstacles in the map");
                Vec::new()
            }
        };

        let mut map = Self {
            params,
            airspace,
            obstacles,
            occupancy: OccupancyGrid::default(),
        };

        map.occupancy = OccupancyGrid::compute(&map, params.grid_resolution_m);

        debug!(
            "AirspaceMap built with {} obstacles, occupancy grid {:?} ({:.1} % occupied)",
            map.obstacles.len(),
            map.occupancy.num_cells(),
            map.occupancy.occupied_fraction() * 100.0
        );

        Ok(map)
    }

    /// Load and build the map from a world file on disk.
    pub fn load<P: AsRef<Path>>(path: P, params: MapParams) -> Result<Self, MapError> {
        Self::build(&MapFile::load(path)?, params)
    }

    /// Parse and build the map from a world file JSON string.
    pub fn from_json(json: &str, params: MapParams) -> Result<Self, MapError> {
        Self::build(&MapFile::from_json(json)?, params)
    }

    /// Determine if the vehicle may occupy the given point.
    ///
    /// A point is not passable if the vehicle would cross the airspace boundary, or if the point
    /// lies inside (or on the edge of) any inflated obstacle.
    pub fn is_passable(&self, point: &Point2<f64>) -> bool {
        if !self.airspace.contains(point, self.params.vehicle_half_width_m) {
            return false;
        }

        !self.obstacles.iter().any(|o| o.contains(point))
    }

    /// Determine if every sample along a straight segment is passable.
    ///
    /// The segment is split into `num_steps` equal steps and each step end is tested, which
    /// includes the `to` point but not the `from` point.
    pub fn is_segment_passable(
        &self,
        from: &Point2<f64>,
        to: &Point2<f64>,
        num_steps: usize,
    ) -> bool {
        let delta = (to - from) / (num_steps.max(1) as f64);

        (1..=num_steps.max(1)).all(|i| self.is_passable(&(from + delta * (i as f64))))
    }

    /// Find the passable point closest to `point`, searching a lattice at the grid resolution
    /// centred on `point` out to `max_distance_m`.
    ///
    /// Returns `None` if no lattice point within range is passable.
    pub fn nearest_passable(
        &self,
        point: &Point2<f64>,
        max_distance_m: f64,
    ) -> Option<Point2<f64>> {
        let res = self.params.grid_resolution_m;
        let reach = (max_distance_m / res).floor();
        if !(reach >= 0.0) {
            return None;
        }
        let reach = reach.min(MAX_SEARCH_STEPS) as i64;

        let mut best: Option<(f64, Point2<f64>)> = None;

        for i in -reach..=reach {
            for j in -reach..=reach {
                let candidate = Point2::new(point.x + i as f64 * res, point.y + j as f64 * res);
                let dist = (candidate - point).norm();

                if dist > max_distance_m || !self.is_passable(&candidate) {
                    continue;
                }

                match best {
                    Some((d, _)) if d <= dist => (),
                    _ => best = Some((dist, candidate)),
                }
            }
        }

        best.map(|(_, p)| p)
    }

    pub fn airspace(&self) -> &Airspace {
        &self.airspace
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn params(&self) -> &MapParams {
        &self.params
    }

    /// The diagnostic occupancy grid, computed when the map was built.
    pub fn occupancy_grid(&self) -> &OccupancyGrid {
        &self.occupancy
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
