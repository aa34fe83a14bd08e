//! # Occupancy grid
//!
//! A lattice of passability results over the airspace. The lattice starts at the airspace's
//! minimum corner, with `ceil(extent / resolution) + 1` points along each axis.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use nalgebra::Point2;
use ndarray::Array2;
use serde::Serialize;

use super::{AirspaceMap, MapError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest number of points allowed in a lattice over the airspace.
pub const MAX_LATTICE_POINTS: usize = 4_000_000;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OccupancyGrid {
    /// Position of the lattice point at index `(0, 0)`.
    pub origin_m: Point2<f64>,

    /// Distance between neighbouring lattice points.
    pub resolution_m: f64,

    /// `true` where the lattice point is not passable, indexed `[x, y]`.
    pub occupied: Array2<bool>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self {
            origin_m: Point2::origin(),
            resolution_m: 0.0,
            occupied: Array2::default((0, 0)),
        }
    }
}

impl OccupancyGrid {
    /// Evaluate the map's passability test at every lattice point.
    pub(super) fn compute(map: &AirspaceMap, resolution_m: f64) -> Self {
        let airspace = map.airspace();
        let origin_m = Point2::new(airspace.x_min, airspace.y_min);

        let (num_x, num_y) = lattice_size(airspace.width_m(), airspace.height_m(), resolution_m)
            .unwrap_or((0, 0));

        let occupied = Array2::from_shape_fn((num_x, num_y), |(i, j)| {
            !map.is_passable(&lattice_point(&origin_m, resolution_m, i, j))
        });

        Self {
            origin_m,
            resolution_m,
            occupied,
        }
    }

    /// Number of lattice points along x and y.
    pub fn num_cells(&self) -> (usize, usize) {
        self.occupied.dim()
    }

    /// Position of the lattice point at the given index.
    pub fn point(&self, i: usize, j: usize) -> Point2<f64> {
        lattice_point(&self.origin_m, self.resolution_m, i, j)
    }

    /// Occupancy of the lattice point at the given index, `None` if out of bounds.
    pub fn is_occupied(&self, i: usize, j: usize) -> Option<bool> {
        self.occupied.get((i, j)).copied()
    }

    /// Fraction of lattice points which are occupied.
    pub fn occupied_fraction(&self) -> f64 {
        if self.occupied.is_empty() {
            return 0.0;
        }

        self.occupied.iter().filter(|o| **o).count() as f64 / self.occupied.len() as f64
    }

    /// Render the grid as a PNG, occupied points in black and free points in white, with +y
    /// pointing up the image.
    pub fn to_png(&self) -> Result<Vec<u8>, MapError> {
        let (num_x, num_y) = self.num_cells();

        let img = GrayImage::from_fn(num_x as u32, num_y as u32, |x, y| {
            let j = num_y - 1 - y as usize;
            match self.occupied[(x as usize, j)] {
                true => Luma([0u8]),
                false => Luma([255u8]),
            }
        });

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut bytes, ImageOutputFormat::Png)
            .map_err(MapError::ImageEncode)?;

        Ok(bytes)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Number of lattice points along x and y needed to cover the given extent at the given
/// resolution, or `None` if there would be more than [`MAX_LATTICE_POINTS`].
pub fn lattice_size(width_m: f64, height_m: f64, resolution_m: f64) -> Option<(usize, usize)> {
    let num_x = (width_m / resolution_m).ceil() + 1.0;
    let num_y = (height_m / resolution_m).ceil() + 1.0;

    if !(num_x * num_y <= MAX_LATTICE_POINTS as f64) {
        return None;
    }

    Some((num_x as usize, num_y as usize))
}

fn lattice_point(origin_m: &Point2<f64>, resolution_m: f64, i: usize, j: usize) -> Point2<f64> {
    Point2::new(
        origin_m.x + i as f64 * resolution_m,
        origin_m.y + j as f64 * resolution_m,
    )
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
