//! Core type definitions used throughout the codebase

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Linear index of a cell (`row * width + col`)
pub type CellIndex = usize;

/// Game turn counter
pub type Turn = u32;

/// Identifier of a player seat on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

/// Grid coordinate (row, column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two points
    pub fn manhattan(&self, other: &Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// True when the points share an edge
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self.manhattan(other) == 1
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Relative offset between two adjacent points
///
/// Only used for orientation in overlays, never for pathing cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Direction of travel from `start` to `end`
    ///
    /// Returns `Direction::None` unless the points are 4-adjacent.
    pub fn between(start: Point, end: Point) -> Self {
        if !start.is_adjacent(&end) {
            return Direction::None;
        }
        if end.row < start.row {
            Direction::Up
        } else if end.row > start.row {
            Direction::Down
        } else if end.col < start.col {
            Direction::Left
        } else {
            Direction::Right
        }
    }
}

/// Terrain class of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Empty,
    Mountain,
    /// Not visible, believed passable
    Fog,
    /// Not visible, known to be a city or mountain
    FogObstacle,
}

impl Terrain {
    pub fn is_obstacle(&self) -> bool {
        matches!(self, Terrain::Mountain | Terrain::FogObstacle)
    }
}

/// Per-cell attributes as reported by the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileProperties {
    pub owner: Option<PlayerId>,
    pub army: u32,
    pub is_city: bool,
    pub is_general: bool,
    pub terrain: Terrain,
}

impl TileProperties {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn mountain() -> Self {
        Self {
            terrain: Terrain::Mountain,
            ..Self::default()
        }
    }

    pub fn owned(owner: PlayerId, army: u32) -> Self {
        Self {
            owner: Some(owner),
            army,
            ..Self::default()
        }
    }

    pub fn city(owner: Option<PlayerId>, army: u32) -> Self {
        Self {
            owner,
            army,
            is_city: true,
            ..Self::default()
        }
    }

    pub fn general(owner: PlayerId, army: u32) -> Self {
        Self {
            owner: Some(owner),
            army,
            is_general: true,
            ..Self::default()
        }
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }
}

/// Cells that mutated since the previous turn
///
/// Produced once per turn by the board, read by every knowledge source and
/// task, then dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardChanges {
    pub turn: Turn,
    changed: BTreeSet<CellIndex>,
}

impl BoardChanges {
    pub fn new(turn: Turn, changed: impl IntoIterator<Item = CellIndex>) -> Self {
        Self {
            turn,
            changed: changed.into_iter().collect(),
        }
    }

    /// Changed cell indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.changed.iter().copied()
    }

    pub fn contains(&self, index: CellIndex) -> bool {
        self.changed.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.changed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Endpoints of an issued attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Point,
    pub to: Point,
}

impl Move {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn direction(&self) -> Direction {
        Direction::between(self.from, self.to)
    }
}
