//! # RRT node tree
//!
//! Nodes are stored in an arena in insertion order, each holding the index of its parent. Since a
//! parent always exists before its children the tree cannot contain cycles.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::auto::path::Path;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub point_m: Point2<f64>,

    /// Index of the parent node, `None` for the root.
    pub parent: Option<usize>,
}

/// A tree which always contains at least its root node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RrtTree {
    nodes: Vec<TreeNode>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RrtTree {
    pub fn new(root_m: Point2<f64>) -> Self {
        Self {
            nodes: vec![TreeNode {
                point_m: root_m,
                parent: None,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    /// The most recently added node, or the root if nothing has been added.
    pub fn last(&self) -> &TreeNode {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Add a node to the tree, returning its index.
    ///
    /// # Panics
    /// - If `parent` is not a node in the tree.
    pub fn push(&mut self, point_m: Point2<f64>, parent: usize) -> usize {
        assert!(parent < self.nodes.len(), "Parent {} is not in the tree", parent);

        self.nodes.push(TreeNode {
            point_m,
            parent: Some(parent),
        });

        self.nodes.len() - 1
    }

    /// Index of the node closest to the given point. On a tie the earliest inserted node wins.
    pub fn nearest(&self, point_m: &Point2<f64>) -> usize {
        let mut nearest = 0;
        let mut min_dist_sq = f64::INFINITY;

        for (i, node) in self.nodes.iter().enumerate() {
            let dist_sq = (node.point_m - *point_m).norm_squared();
            if dist_sq < min_dist_sq {
                nearest = i;
                min_dist_sq = dist_sq;
            }
        }

        nearest
    }

    /// The path from the root to the given node, excluding the root itself.
    pub fn path_to(&self, index: usize) -> Path {
        let mut points_m = Vec::new();
        let mut current = self.nodes.get(index);

        while let Some(node) = current {
            match node.parent {
                Some(p) => {
                    points_m.push(node.point_m);
                    current = self.nodes.get(p);
                }
                None => break,
            }
        }

        points_m.reverse();

        Path::new(points_m)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
