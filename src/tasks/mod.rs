//! Competing behaviors ranked by the scheduler every turn
//!
//! A task reads the board and the knowledge base to report how urgent it is,
//! and acts only when the scheduler picks it.

mod capture_city;
mod defend_general;
mod expand;

pub use capture_city::CaptureCityTask;
pub use defend_general::DefendGeneralTask;
pub use expand::ExpandTask;

use crate::board::{points, Board};
use crate::core::types::{BoardChanges, Move, Point, TileProperties};
use crate::debug::DebugSection;
use crate::knowledge::KnowledgeBase;

/// Unit of behavior
pub trait Task {
    /// Stable label, used for observability only
    fn name(&self) -> &str;

    /// Update task-local state; runs after every knowledge source has updated
    fn on_next_turn(&mut self, _board: &dyn Board, _changes: &BoardChanges) {}

    /// Urgency of this task right now. Must be pure and cheap.
    fn priority(&self, board: &dyn Board, knowledge: &KnowledgeBase) -> f64;

    /// Try to act. `None` means the task declined and the scheduler should
    /// fall through to the next one.
    fn do_move(&mut self, board: &mut dyn Board, knowledge: &KnowledgeBase) -> Option<Move>;

    fn debug_section(&self) -> Option<DebugSection> {
        None
    }
}

/// Tiles we own with at least `min_army` armies, in board order
pub(crate) fn movable_tiles(board: &dyn Board, min_army: u32) -> Vec<(Point, TileProperties)> {
    let me = board.me();
    points(board)
        .filter_map(|point| board.tile_properties(point).map(|tile| (point, tile)))
        .filter(|(_, tile)| tile.is_owned_by(me) && tile.army >= min_army)
        .collect()
}

/// Whether attacking `target` with everything but one army from `source` captures it
pub(crate) fn can_capture(source: &TileProperties, target: &TileProperties) -> bool {
    source.army.saturating_sub(1) > target.army
}
