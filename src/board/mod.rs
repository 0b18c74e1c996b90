//! Grid accessor boundary
//!
//! The authoritative board lives outside the decision core. The core only
//! needs indexing, adjacency, read-only tile snapshots, the agent's general
//! and a way to submit an attack. [`GridBoard`] is an in-memory implementation
//! used by tests and the demo binary.

mod grid;

pub use grid::GridBoard;

use crate::core::types::{CellIndex, PlayerId, Point, TileProperties};

/// Read access to the board plus move submission
pub trait Board {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn cell_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Point for a linear index. Only meaningful for `index < cell_count()`.
    fn to_point(&self, index: CellIndex) -> Point {
        let width = self.width().max(1);
        Point::new(index / width, index % width)
    }

    /// Linear index for a point, `None` when off the board
    fn to_index(&self, point: Point) -> Option<CellIndex> {
        if point.row < self.height() && point.col < self.width() {
            Some(point.row * self.width() + point.col)
        } else {
            None
        }
    }

    /// Snapshot of a tile, valid until the next change notification
    fn tile_properties(&self, point: Point) -> Option<TileProperties>;

    /// Seat the agent plays
    fn me(&self) -> PlayerId;

    /// Location of the agent's general, once revealed
    fn my_general_location(&self) -> Option<Point>;

    /// Whether armies can path through the cell
    ///
    /// Mountains (seen or fogged) block. Cities block until we own them.
    fn is_traversable(&self, point: Point) -> bool {
        let Some(tile) = self.tile_properties(point) else {
            return false;
        };
        if tile.terrain.is_obstacle() {
            return false;
        }
        !(tile.is_city && !tile.is_owned_by(self.me()))
    }

    /// Submit an attack from `from` into the adjacent cell `to`
    ///
    /// Returns false when the board refuses the move.
    fn attack(&mut self, from: Point, to: Point) -> bool;
}

/// 4-adjacent neighbors of `point` that lie on the board (up, right, down, left)
pub fn neighbors(board: &dyn Board, point: Point) -> impl Iterator<Item = Point> {
    let width = board.width();
    let height = board.height();
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = point.row.checked_sub(1) {
        candidates[count] = Some(Point::new(row, point.col));
        count += 1;
    }

    if point.col + 1 < width {
        candidates[count] = Some(Point::new(point.row, point.col + 1));
        count += 1;
    }

    if point.row + 1 < height {
        candidates[count] = Some(Point::new(point.row + 1, point.col));
        count += 1;
    }

    if let Some(col) = point.col.checked_sub(1) {
        candidates[count] = Some(Point::new(point.row, col));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

/// Every point of the board in index order
pub fn points(board: &dyn Board) -> impl Iterator<Item = Point> + '_ {
    (0..board.cell_count()).map(move |index| board.to_point(index))
}
