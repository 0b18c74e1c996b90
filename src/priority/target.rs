//! Seed descriptors for priority map propagation
//!
//! A target supplies the initial priority of its origin cell(s) and keeps the
//! partial mapping of every cell it claimed during the last propagation.

use ahash::AHashMap;

use crate::board::{points, Board};
use crate::core::error::{AgentError, Result};
use crate::core::types::{CellIndex, PlayerId, Point, TileProperties};

/// Priority assigned to an origin cell: distance zero, already claimed
pub const SEED_PRIORITY: u32 = 1;

/// Seeds and claimed cells owned by one target
#[derive(Debug, Clone, Default)]
pub struct Contribution {
    seeds: Option<Vec<(CellIndex, u32)>>,
    claimed: AHashMap<CellIndex, u32>,
}

/// Polymorphic seed descriptor
///
/// Implementors provide `initial_seeds`; the seeding protocol (refusing to
/// seed twice, clearing, recording claims) is shared.
pub trait Target {
    /// Human-readable label for logs and overlays
    fn name(&self) -> String;

    /// Seeds this target would contribute on the current board
    fn initial_seeds(&self, board: &dyn Board) -> Vec<(CellIndex, u32)>;

    fn contribution(&self) -> &Contribution;

    fn contribution_mut(&mut self) -> &mut Contribution;

    /// Compute and hold this target's seeds
    ///
    /// Fails with `TargetAlreadySeeded` if the previous contribution was never
    /// cleared; the held seeds are left untouched.
    fn seed(&mut self, board: &dyn Board) -> Result<Vec<(CellIndex, u32)>> {
        if self.is_seeded() {
            return Err(AgentError::TargetAlreadySeeded(self.name()));
        }
        let seeds = self.initial_seeds(board);
        self.contribution_mut().seeds = Some(seeds.clone());
        Ok(seeds)
    }

    /// Seeds of the current contribution (empty when not seeded)
    fn seeds(&self) -> &[(CellIndex, u32)] {
        self.contribution().seeds.as_deref().unwrap_or(&[])
    }

    fn is_seeded(&self) -> bool {
        self.contribution().seeds.is_some()
    }

    /// Discard this target's seeds and claimed cells
    fn clear(&mut self) {
        let contribution = self.contribution_mut();
        contribution.seeds = None;
        contribution.claimed.clear();
    }

    /// Forget claimed cells but keep the seeds
    fn reset_claims(&mut self) {
        self.contribution_mut().claimed.clear();
    }

    fn record(&mut self, cell: CellIndex, priority: u32) {
        let _ = self.contribution_mut().claimed.insert(cell, priority);
    }

    /// Cells attributed to this target by the last propagation
    fn claimed(&self) -> &AHashMap<CellIndex, u32> {
        &self.contribution().claimed
    }
}

fn seeds_for_points(board: &dyn Board, origins: &[Point]) -> Vec<(CellIndex, u32)> {
    let mut seeds = Vec::with_capacity(origins.len());
    for &origin in origins {
        match board.to_index(origin) {
            Some(index) => seeds.push((index, SEED_PRIORITY)),
            None => tracing::warn!("Skipping target origin {} outside the board", origin),
        }
    }
    seeds
}

/// Uniform-cost distance from a single point
#[derive(Debug, Clone)]
pub struct DistanceTarget {
    origin: Point,
    contribution: Contribution,
}

impl DistanceTarget {
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            contribution: Contribution::default(),
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }
}

impl Target for DistanceTarget {
    fn name(&self) -> String {
        format!("distance from {}", self.origin)
    }

    fn initial_seeds(&self, board: &dyn Board) -> Vec<(CellIndex, u32)> {
        seeds_for_points(board, &[self.origin])
    }

    fn contribution(&self) -> &Contribution {
        &self.contribution
    }

    fn contribution_mut(&mut self) -> &mut Contribution {
        &mut self.contribution
    }
}

/// Distance from the nearest of a fixed set of points
#[derive(Debug, Clone)]
pub struct MultiDistanceTarget {
    label: String,
    origins: Vec<Point>,
    contribution: Contribution,
}

impl MultiDistanceTarget {
    /// Duplicate origins are dropped, first occurrence kept
    pub fn new(label: impl Into<String>, origins: impl IntoIterator<Item = Point>) -> Self {
        let mut unique: Vec<Point> = Vec::new();
        for origin in origins {
            if !unique.contains(&origin) {
                unique.push(origin);
            }
        }
        Self {
            label: label.into(),
            origins: unique,
            contribution: Contribution::default(),
        }
    }

    pub fn origins(&self) -> &[Point] {
        &self.origins
    }
}

impl Target for MultiDistanceTarget {
    fn name(&self) -> String {
        self.label.clone()
    }

    fn initial_seeds(&self, board: &dyn Board) -> Vec<(CellIndex, u32)> {
        seeds_for_points(board, &self.origins)
    }

    fn contribution(&self) -> &Contribution {
        &self.contribution
    }

    fn contribution_mut(&mut self) -> &mut Contribution {
        &mut self.contribution
    }
}

/// Predicate selecting seed tiles for a [`TileFilterTarget`]
pub type TileFilter = fn(PlayerId, &TileProperties) -> bool;

/// Distance from every tile matching a predicate at seeding time
///
/// The origin set follows the board: clearing and re-seeding picks up tiles
/// that started or stopped matching.
#[derive(Debug, Clone)]
pub struct TileFilterTarget {
    label: String,
    filter: TileFilter,
    contribution: Contribution,
}

impl TileFilterTarget {
    pub fn new(label: impl Into<String>, filter: TileFilter) -> Self {
        Self {
            label: label.into(),
            filter,
            contribution: Contribution::default(),
        }
    }

    pub fn matches(&self, board: &dyn Board, tile: &TileProperties) -> bool {
        (self.filter)(board.me(), tile)
    }
}

impl Target for TileFilterTarget {
    fn name(&self) -> String {
        self.label.clone()
    }

    fn initial_seeds(&self, board: &dyn Board) -> Vec<(CellIndex, u32)> {
        points(board)
            .filter(|&point| {
                board
                    .tile_properties(point)
                    .is_some_and(|tile| self.matches(board, &tile))
            })
            .filter_map(|point| board.to_index(point))
            .map(|index| (index, SEED_PRIORITY))
            .collect()
    }

    fn contribution(&self) -> &Contribution {
        &self.contribution
    }

    fn contribution_mut(&mut self) -> &mut Contribution {
        &mut self.contribution
    }
}
