//! # Exploration goal selection
//!
//! The flight manager asks a [`GoalSelector`] where to fly next each time it is ready for a new
//! goal. Two selectors are provided:
//!
//! - [`Explorer`] - a next-best-view selector which tracks which parts of the airspace have been
//!   within camera range and picks the lattice point that would reveal the most unseen free space
//!   for the least travel.
//! - [`GoalList`] - a fixed list of goals visited in order.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use log::{debug, info};
use nalgebra::Point2;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::map::{lattice_size, AirspaceMap};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait GoalSelector {
    /// Record that the vehicle is at the given position.
    fn observe(&mut self, position_m: &Point2<f64>);

    /// Propose the next goal, or `None` if there is nowhere left to go.
    fn next_goal(&mut self, position_m: &Point2<f64>) -> Option<GoalProposal>;

    /// Record that the given goal could not be reached, so it is not proposed again.
    fn reject(&mut self, target_m: &Point2<f64>);

    /// Record that a path to the given goal was found, so it is not proposed again even if the
    /// vehicle never gets close enough to see it.
    fn visited(&mut self, target_m: &Point2<f64>);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProposal {
    pub target_m: Point2<f64>,

    /// Number of unseen lattice points expected to come into view at the target.
    pub expected_gain: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExplorerParams {
    /// Spacing of the coverage lattice.
    pub discretisation_m: f64,

    /// Distance within which the camera is considered to have seen a point.
    pub render_distance_m: f64,
}

pub struct Explorer {
    params: ExplorerParams,

    origin_m: Point2<f64>,

    /// Lattice points which the vehicle may occupy.
    passable: Array2<bool>,

    /// Lattice points which have been within render distance of the vehicle.
    seen: Array2<bool>,

    /// Lattice points which have been rejected as goals.
    rejected: Array2<bool>,

    /// Index offsets of the lattice points within render distance of a point.
    render_offsets: Vec<(isize, isize)>,
}

#[derive(Debug, Clone, Default)]
pub struct GoalList {
    goals_m: VecDeque<Point2<f64>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExplorerError {
    #[error("Explorer discretisation must be positive, got {0}")]
    InvalidDiscretisation(f64),

    #[error("Explorer render distance must not be negative, got {0}")]
    InvalidRenderDistance(f64),

    #[error("Explorer discretisation {0} gives too many lattice points")]
    LatticeTooLarge(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Explorer {
    pub fn new(map: &AirspaceMap, params: ExplorerParams) -> Result<Self, ExplorerError> {
        if !(params.discretisation_m > 0.0) {
            return Err(ExplorerError::InvalidDiscretisation(params.discretisation_m));
        }
        if !(params.render_distance_m >= 0.0) {
            return Err(ExplorerError::InvalidRenderDistance(params.render_distance_m));
        }

        let airspace = map.airspace();
        let origin_m = Point2::new(airspace.x_min, airspace.y_min);
        let disc = params.discretisation_m;

        let (num_x, num_y) = lattice_size(airspace.width_m(), airspace.height_m(), disc)
            .ok_or(ExplorerError::LatticeTooLarge(disc))?;

        let passable = Array2::from_shape_fn((num_x, num_y), |(i, j)| {
            map.is_passable(&Point2::new(
                origin_m.x + i as f64 * disc,
                origin_m.y + j as f64 * disc,
            ))
        });

        let r = (params.render_distance_m / disc).floor() as isize;
        let mut render_offsets = Vec::new();
        for di in -r..=r {
            for dj in -r..=r {
                let dist_m = ((di * di + dj * dj) as f64).sqrt() * disc;
                if dist_m <= params.render_distance_m {
                    render_offsets.push((di, dj));
                }
            }
        }

        debug!(
            "Explorer lattice {}x{}, {} points within render distance",
            num_x,
            num_y,
            render_offsets.len()
        );

        Ok(Self {
            params,
            origin_m,
            seen: Array2::default((num_x, num_y)),
            rejected: Array2::default((num_x, num_y)),
            passable,
            render_offsets,
        })
    }

    /// Number of passable lattice points which have not been seen yet.
    pub fn num_unseen(&self) -> usize {
        self.passable
            .iter()
            .zip(self.seen.iter())
            .filter(|(p, s)| **p && !**s)
            .count()
    }

    pub fn params(&self) -> &ExplorerParams {
        &self.params
    }

    /// Index of the lattice point closest to the given position, if inside the lattice.
    fn index(&self, position_m: &Point2<f64>) -> Option<(usize, usize)> {
        let i = ((position_m.x - self.origin_m.x) / self.params.discretisation_m).round();
        let j = ((position_m.y - self.origin_m.y) / self.params.discretisation_m).round();
        let (num_x, num_y) = self.seen.dim();

        if i < 0.0 || j < 0.0 || i as usize >= num_x || j as usize >= num_y {
            return None;
        }

        Some((i as usize, j as usize))
    }

    fn point(&self, i: usize, j: usize) -> Point2<f64> {
        Point2::new(
            self.origin_m.x + i as f64 * self.params.discretisation_m,
            self.origin_m.y + j as f64 * self.params.discretisation_m,
        )
    }

    /// Lattice indices within render distance of the given index.
    fn in_view(&self, i: usize, j: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (num_x, num_y) = self.seen.dim();

        self.render_offsets.iter().filter_map(move |(di, dj)| {
            let vi = i as isize + di;
            let vj = j as isize + dj;
            if vi < 0 || vj < 0 || vi as usize >= num_x || vj as usize >= num_y {
                None
            } else {
                Some((vi as usize, vj as usize))
            }
        })
    }

    /// Number of passable, unseen lattice points which would be seen from the given index.
    fn gain(&self, i: usize, j: usize) -> usize {
        self.in_view(i, j)
            .filter(|idx| self.passable[*idx] && !self.seen[*idx])
            .count()
    }
}

impl GoalSelector for Explorer {
    fn observe(&mut self, position_m: &Point2<f64>) {
        let (i, j) = match self.index(position_m) {
            Some(idx) => idx,
            None => return,
        };

        let in_view: Vec<_> = self.in_view(i, j).collect();
        for idx in in_view {
            self.seen[idx] = true;
        }
    }

    fn next_goal(&mut self, position_m: &Point2<f64>) -> Option<GoalProposal> {
        let mut best: Option<(f64, GoalProposal)> = None;

        for ((i, j), passable) in self.passable.indexed_iter() {
            if !*passable || self.seen[(i, j)] || self.rejected[(i, j)] {
                continue;
            }

            let gain = self.gain(i, j);
            if gain == 0 {
                continue;
            }

            let target_m = self.point(i, j);
            let score = gain as f64 / (1.0 + nalgebra::distance(position_m, &target_m));

            let is_better = match best {
                Some((best_score, _)) => score > best_score,
                None => true,
            };

            if is_better {
                best = Some((
                    score,
                    GoalProposal {
                        target_m,
                        expected_gain: gain,
                    },
                ));
            }
        }

        match best {
            Some((_, proposal)) => {
                debug!(
                    "Next best view at {} reveals {} points",
                    proposal.target_m, proposal.expected_gain
                );
                Some(proposal)
            }
            None => {
                info!("Exploration complete, no unseen space left");
                None
            }
        }
    }

    fn reject(&mut self, target_m: &Point2<f64>) {
        if let Some(idx) = self.index(target_m) {
            self.rejected[idx] = true;
        }
    }

    fn visited(&mut self, target_m: &Point2<f64>) {
        if let Some(idx) = self.index(target_m) {
            self.seen[idx] = true;
        }
    }
}

impl GoalList {
    pub fn new<I: IntoIterator<Item = Point2<f64>>>(goals_m: I) -> Self {
        Self {
            goals_m: goals_m.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.goals_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals_m.is_empty()
    }
}

impl GoalSelector for GoalList {
    fn observe(&mut self, _position_m: &Point2<f64>) {}

    fn next_goal(&mut self, _position_m: &Point2<f64>) -> Option<GoalProposal> {
        self.goals_m.pop_front().map(|target_m| GoalProposal {
            target_m,
            expected_gain: 0,
        })
    }

    fn reject(&mut self, target_m: &Point2<f64>) {
        debug!("Goal {} rejected", target_m);
    }

    fn visited(&mut self, _target_m: &Point2<f64>) {}
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
