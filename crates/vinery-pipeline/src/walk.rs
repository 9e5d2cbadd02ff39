//! Random walk over the partition's cell adjacency graph.
//!
//! The walker prefers cells it has not entered yet. When every neighbor
//! has been visited it takes any neighbor and flags the move as a
//! revisit, which later renders as background.

use std::collections::HashSet;

use rand::Rng;

use crate::partition::{Partition, Site};
use crate::types::{PathError, SiteId};

/// One step of the walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    /// Cell the step leaves.
    pub from: Site,
    /// Cell the step enters.
    pub to: Site,
    /// Whether every neighbor of `from` had already been visited.
    pub revisit: bool,
}

/// Mutable walk state: current cell plus the visited set.
#[derive(Debug, Clone)]
pub struct WalkState {
    current: SiteId,
    visited: HashSet<SiteId>,
}

impl WalkState {
    /// Start at the first cell with any area.
    ///
    /// The start cell itself is not marked visited, so the walk may come
    /// back to it without that counting as a revisit.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::NoStartingCell`] if the partition has no
    /// usable cell.
    pub fn start(partition: &Partition) -> Result<Self, PathError> {
        let current = partition
            .first_nonempty()
            .ok_or(PathError::NoStartingCell)?;
        Ok(Self {
            current,
            visited: HashSet::new(),
        })
    }

    /// The cell the walker is in.
    #[must_use]
    pub const fn current(&self) -> SiteId {
        self.current
    }

    /// Cells entered so far.
    #[must_use]
    pub const fn visited(&self) -> &HashSet<SiteId> {
        &self.visited
    }

    /// Take one step to a random neighbor.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::IsolatedCell`] if the current cell has no
    /// interior neighbor.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        partition: &Partition,
        rng: &mut R,
    ) -> Result<Move, PathError> {
        let here = self.current;
        let from = partition
            .site(here)
            .ok_or(PathError::IsolatedCell(here))?;

        let exits = partition.exits(here);
        let fresh: Vec<SiteId> = exits
            .iter()
            .copied()
            .filter(|s| !self.visited.contains(s))
            .collect();
        let revisit = fresh.is_empty();
        let candidates = if revisit { exits } else { fresh };
        if candidates.is_empty() {
            return Err(PathError::IsolatedCell(here));
        }

        let next = candidates[rng.random_range(0..candidates.len())];
        let to = partition.site(next).ok_or(PathError::IsolatedCell(next))?;
        self.visited.insert(next);
        self.current = next;
        Ok(Move { from, to, revisit })
    }
}

/// Walk exactly `steps` moves from the partition's first usable cell.
///
/// # Errors
///
/// Returns [`PathError::NoStartingCell`] or [`PathError::IsolatedCell`].
pub fn walk<R: Rng + ?Sized>(
    partition: &Partition,
    steps: usize,
    rng: &mut R,
) -> Result<Vec<Move>, PathError> {
    let mut state = WalkState::start(partition)?;
    let mut moves = Vec::with_capacity(steps);
    for _ in 0..steps {
        moves.push(state.step(partition, rng)?);
    }
    let revisits = moves.iter().filter(|m| m.revisit).count();
    tracing::debug!(
        moves = moves.len(),
        visited = state.visited().len(),
        revisits,
        "walk complete"
    );
    Ok(moves)
}
