//! Distance from the agent's own general

use std::any::Any;

use crate::board::{neighbors, Board};
use crate::core::types::{BoardChanges, Point};
use crate::debug::DebugSection;
use crate::knowledge::{priority_or_infinity, KnowledgeSource, TraversalGate};
use crate::priority::{DistanceTarget, PriorityMap};

/// Priority map seeded at our general, discovered lazily
///
/// The general's location is unknown until the board reveals it; until then
/// every query answers "unreachable" and discovery is retried each turn.
#[derive(Debug, Default)]
pub struct GeneralDistance {
    general: Option<Point>,
    map: PriorityMap,
    gate: TraversalGate,
    recomputes: u32,
}

impl GeneralDistance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn general(&self) -> Option<Point> {
        self.general
    }

    /// Raw priority at `point` (general tile = 1), infinity when unreachable
    pub fn general_distance(&self, point: Point) -> f64 {
        priority_or_infinity(self.map.priority_in(point))
    }

    /// Steps from the general to `point`, `None` when unreachable
    pub fn steps_from_general(&self, point: Point) -> Option<u32> {
        self.map.priority_in(point).checked_sub(1)
    }

    /// Neighbor of `from` one step closer to the general, avoiding foreign land
    pub fn step_toward_general(&self, board: &dyn Board, from: Point) -> Option<Point> {
        let current = self.steps_from_general(from)?;
        let me = board.me();
        neighbors(board, from).find(|&next| {
            self.steps_from_general(next).is_some_and(|steps| steps < current)
                && board
                    .tile_properties(next)
                    .is_some_and(|tile| tile.owner.is_none() || tile.is_owned_by(me))
        })
    }

    pub fn map(&self) -> &PriorityMap {
        &self.map
    }

    /// Number of full recomputes so far
    pub fn recompute_count(&self) -> u32 {
        self.recomputes
    }

    fn recompute(&mut self, board: &dyn Board) {
        self.map.clear_targets();
        self.map.compute_map(board);
        self.recomputes += 1;
    }
}

impl KnowledgeSource for GeneralDistance {
    fn name(&self) -> &str {
        "General distance"
    }

    fn on_next_turn(&mut self, board: &dyn Board, changes: &BoardChanges) {
        if self.general.is_none() {
            let Some(location) = board.my_general_location() else {
                tracing::debug!("General not revealed yet (turn {})", changes.turn);
                return;
            };
            tracing::info!("Discovered general at {}", location);
            self.general = Some(location);
            self.map.add_target(DistanceTarget::new(location));
            self.gate.capture(board);
            self.recompute(board);
            return;
        }

        if self.gate.is_relevant(board, changes) {
            tracing::debug!("Terrain changed on turn {}, recomputing general distance", changes.turn);
            self.recompute(board);
        }
    }

    fn debug_section(&self) -> Option<DebugSection> {
        let general = self
            .general
            .map(|point| point.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Some(
            DebugSection::new(self.name())
                .with("general", general)
                .with("recomputes", self.recomputes),
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
