//! # Airspace map module
//!
//! This module provides the [`AirspaceMap`], the description of the volume the vehicle is allowed
//! to fly in. The map is built once from a world file (see [`MapFile`]) and is read only
//! afterwards, so it can be shared freely between the planner, the explorer and the occupancy
//! publisher.
//!
//! All collision checking is done in continuous space through [`AirspaceMap::is_passable`]. The
//! [`OccupancyGrid`] is only a diagnostic rendering of that test.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod airspace_map;
mod map_file;
mod occupancy;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use airspace_map::{Airspace, AirspaceMap, MapParams, Obstacle, VEHICLE_HALF_WIDTH_M};
pub use map_file::{AirspaceDesc, MapFile, PlaneDesc, WallDesc};
pub use occupancy::{lattice_size, OccupancyGrid, MAX_LATTICE_POINTS};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while building an [`AirspaceMap`].
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Could not read the map file {0:?}: {1}")]
    FileLoad(std::path::PathBuf, std::io::Error),

    #[error("Could not parse the map file: {0}")]
    Parse(serde_json::Error),

    #[error("The map description is malformed: {0}")]
    MalformedMap(String),

    #[error("Could not encode the occupancy grid image: {0}")]
    ImageEncode(image::ImageError),
}
