//! Distance to the nearest city we do not own

use std::any::Any;

use crate::board::Board;
use crate::core::types::{BoardChanges, PlayerId, Point, TileProperties};
use crate::debug::DebugSection;
use crate::knowledge::{priority_or_infinity, KnowledgeSource, TraversalGate};
use crate::priority::{PriorityMap, TargetId, TileFilterTarget};

fn is_foreign_city(me: PlayerId, tile: &TileProperties) -> bool {
    tile.is_city && !tile.is_owned_by(me)
}

/// Multi-source map seeded at every visible neutral or enemy city
///
/// Rebuilt when a city appears, changes hands to or from us, or the terrain
/// in between opens or closes.
#[derive(Debug)]
pub struct CityDistance {
    map: PriorityMap,
    target: TargetId,
    gate: TraversalGate,
    recomputes: u32,
}

impl Default for CityDistance {
    fn default() -> Self {
        Self::new()
    }
}

impl CityDistance {
    pub fn new() -> Self {
        let mut map = PriorityMap::new();
        let target = map.add_target(TileFilterTarget::new("foreign cities", is_foreign_city));
        Self {
            map,
            target,
            gate: TraversalGate::with_membership(is_foreign_city),
            recomputes: 0,
        }
    }

    /// Raw priority at `point` (city tile = 1), infinity when no city is reachable
    pub fn city_distance(&self, point: Point) -> f64 {
        priority_or_infinity(self.map.priority_in(point))
    }

    /// Neighbor of `from` one step closer to the nearest foreign city
    pub fn step_toward_city(&self, board: &dyn Board, from: Point) -> Option<Point> {
        self.map.descend(board, from)
    }

    /// Number of foreign cities seeding the map
    pub fn city_count(&self) -> usize {
        self.map
            .target(self.target)
            .map(|target| target.seeds().len())
            .unwrap_or(0)
    }

    pub fn map(&self) -> &PriorityMap {
        &self.map
    }

    pub fn recompute_count(&self) -> u32 {
        self.recomputes
    }

    fn recompute(&mut self, board: &dyn Board) {
        self.map.clear_targets();
        self.map.compute_map(board);
        self.recomputes += 1;
        tracing::debug!("City distance rebuilt from {} cities", self.city_count());
    }
}

impl KnowledgeSource for CityDistance {
    fn name(&self) -> &str {
        "City distance"
    }

    fn on_next_turn(&mut self, board: &dyn Board, changes: &BoardChanges) {
        if !self.map.is_computed() {
            self.gate.capture(board);
            self.recompute(board);
            return;
        }

        if self.gate.is_relevant(board, changes) {
            self.recompute(board);
        }
    }

    fn debug_section(&self) -> Option<DebugSection> {
        Some(
            DebugSection::new(self.name())
                .with("cities", self.city_count())
                .with("recomputes", self.recomputes),
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
