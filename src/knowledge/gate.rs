//! Decides whether a turn's changes matter to a priority map
//!
//! A snapshot keeps, per cell, whether it is traversable and whether it is a
//! target origin. Only a flip of either bit warrants a recompute; army counts
//! moving around do not.

use crate::board::Board;
use crate::core::types::BoardChanges;
use crate::priority::TileFilter;

const TRAVERSABLE: u8 = 0b01;
const MEMBER: u8 = 0b10;

/// Per-cell traversal and membership snapshot
#[derive(Debug, Clone, Default)]
pub struct TraversalGate {
    snapshot: Vec<u8>,
    member: Option<TileFilter>,
}

impl TraversalGate {
    /// Gate that only watches traversability
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate that also watches which tiles count as target origins
    pub fn with_membership(member: TileFilter) -> Self {
        Self {
            snapshot: Vec::new(),
            member: Some(member),
        }
    }

    /// Take a full snapshot of the board
    pub fn capture(&mut self, board: &dyn Board) {
        self.snapshot = (0..board.cell_count())
            .map(|index| self.signature(board, index))
            .collect();
    }

    /// Update the snapshot for the changed cells and report whether any flipped
    ///
    /// A board whose size no longer matches the snapshot is always relevant.
    pub fn is_relevant(&mut self, board: &dyn Board, changes: &BoardChanges) -> bool {
        if self.snapshot.len() != board.cell_count() {
            self.capture(board);
            return true;
        }

        let mut relevant = false;
        for index in changes.iter() {
            if index >= self.snapshot.len() {
                continue;
            }
            let signature = self.signature(board, index);
            if self.snapshot[index] != signature {
                self.snapshot[index] = signature;
                relevant = true;
            }
        }
        relevant
    }

    fn signature(&self, board: &dyn Board, index: usize) -> u8 {
        let point = board.to_point(index);
        let mut signature = 0;
        if board.is_traversable(point) {
            signature |= TRAVERSABLE;
        }
        if let (Some(member), Some(tile)) = (self.member, board.tile_properties(point)) {
            if member(board.me(), &tile) {
                signature |= MEMBER;
            }
        }
        signature
    }
}
