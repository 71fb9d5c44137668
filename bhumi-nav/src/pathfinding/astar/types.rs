//! A* pathfinding types.

use crate::core::GridCoord;
use crate::error::{NavError, Result};
use serde::Serialize;
use std::cmp::Ordering;

/// Relative slack on the √2 upper bound so `diagonal = √2·straight`
/// computed in floating point is accepted.
const ADMISSIBLE_SLACK: f64 = 1e-12;

/// A node in the A* search
#[derive(Clone, Debug)]
pub(super) struct AStarNode {
    pub coord: GridCoord,
    pub g_cost: f64, // Cost from start
    pub f_cost: f64, // g_cost + heuristic
}

impl Eq for AStarNode {}

impl PartialEq for AStarNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior; on equal f prefer the
        // deeper node (larger g), which reaches the goal with fewer pops.
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| self.g_cost.total_cmp(&other.g_cost))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* pathfinding configuration
#[derive(Clone, Debug, PartialEq)]
pub struct AStarConfig {
    /// Allow diagonal movement (8-connected vs 4-connected)
    pub allow_diagonal: bool,
    /// Cost of a horizontal or vertical step
    pub straight_cost: f64,
    /// Cost of a diagonal step (sqrt(2) ≈ 1.414)
    pub diagonal_cost: f64,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            straight_cost: 1.0,
            diagonal_cost: std::f64::consts::SQRT_2,
        }
    }
}

impl AStarConfig {
    /// 4-connected search with unit steps
    pub fn four_connected() -> Self {
        Self {
            allow_diagonal: false,
            ..Default::default()
        }
    }

    /// Builder-style setter for step costs.
    pub fn with_costs(mut self, straight_cost: f64, diagonal_cost: f64) -> Self {
        self.straight_cost = straight_cost;
        self.diagonal_cost = diagonal_cost;
        self
    }

    /// Builder-style setter for diagonal movement.
    pub fn with_diagonal(mut self, allow: bool) -> Self {
        self.allow_diagonal = allow;
        self
    }

    /// Reject costs that would make the octile heuristic overestimate.
    ///
    /// Requires `straight > 0` and, with diagonals,
    /// `straight ≤ diagonal ≤ √2·straight`.
    pub fn validate(&self) -> Result<()> {
        if !(self.straight_cost.is_finite() && self.straight_cost > 0.0) {
            return Err(NavError::InvalidConfig(format!(
                "straight_cost must be positive and finite, got {}",
                self.straight_cost
            )));
        }
        if self.allow_diagonal {
            let upper = std::f64::consts::SQRT_2 * self.straight_cost * (1.0 + ADMISSIBLE_SLACK);
            if !self.diagonal_cost.is_finite()
                || self.diagonal_cost < self.straight_cost
                || self.diagonal_cost > upper
            {
                return Err(NavError::InvalidConfig(format!(
                    "diagonal_cost {} must lie in [{}, {}] for an admissible heuristic",
                    self.diagonal_cost,
                    self.straight_cost,
                    std::f64::consts::SQRT_2 * self.straight_cost
                )));
            }
        }
        Ok(())
    }

    /// Admissible distance estimate between two cells.
    ///
    /// Octile `straight·(dx+dy) + (diagonal − 2·straight)·min(dx,dy)` with
    /// diagonals, otherwise `straight·(dx+dy)`.
    #[inline]
    pub fn heuristic(&self, from: GridCoord, to: GridCoord) -> f64 {
        let dx = (from.col - to.col).abs() as f64;
        let dy = (from.row - to.row).abs() as f64;
        if self.allow_diagonal {
            self.straight_cost * (dx + dy)
                + (self.diagonal_cost - 2.0 * self.straight_cost) * dx.min(dy)
        } else {
            self.straight_cost * (dx + dy)
        }
    }

    /// Cost of one step between adjacent cells
    #[inline]
    pub fn step_cost(&self, from: GridCoord, to: GridCoord) -> f64 {
        if from.is_diagonal_step(&to) {
            self.diagonal_cost
        } else {
            self.straight_cost
        }
    }
}

/// A path found by the planner
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlannedPath {
    /// Cells from start to goal inclusive
    pub cells: Vec<GridCoord>,
    /// Sum of step costs
    pub cost: f64,
    /// Nodes popped and expanded during search
    pub nodes_expanded: usize,
}

impl PlannedPath {
    /// Path length in cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Never true for a planner result
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell
    pub fn start(&self) -> Option<GridCoord> {
        self.cells.first().copied()
    }

    /// Last cell
    pub fn goal(&self) -> Option<GridCoord> {
        self.cells.last().copied()
    }
}

/// Outcome of a search that ran to completion.
///
/// Not finding a path is a normal result, distinct from the errors raised
/// for bad input.
#[derive(Clone, Debug, PartialEq)]
pub enum PathOutcome {
    /// Goal reached
    Found(PlannedPath),
    /// Open set exhausted before reaching the goal
    NoPath {
        /// Nodes expanded before giving up
        nodes_expanded: usize,
    },
}

impl PathOutcome {
    /// Was a path found?
    pub fn is_found(&self) -> bool {
        matches!(self, PathOutcome::Found(_))
    }

    /// Borrow the path, if any
    pub fn path(&self) -> Option<&PlannedPath> {
        match self {
            PathOutcome::Found(path) => Some(path),
            PathOutcome::NoPath { .. } => None,
        }
    }

    /// Take the path, if any
    pub fn into_path(self) -> Option<PlannedPath> {
        match self {
            PathOutcome::Found(path) => Some(path),
            PathOutcome::NoPath { .. } => None,
        }
    }

    /// Nodes expanded by the search
    pub fn nodes_expanded(&self) -> usize {
        match self {
            PathOutcome::Found(path) => path.nodes_expanded,
            PathOutcome::NoPath { nodes_expanded } => *nodes_expanded,
        }
    }
}
