//! Grab neutral land next to our territory

use crate::board::{neighbors, Board};
use crate::core::config::AgentConfig;
use crate::core::types::{BoardChanges, Move, Turn};
use crate::debug::DebugSection;
use crate::knowledge::{GeneralDistance, KnowledgeBase};
use crate::tasks::{can_capture, movable_tiles, Task};

/// Captures the neutral tile whose attacker sits closest to the general
///
/// Staying close to home keeps the territory compact and easy to defend.
#[derive(Debug, Clone)]
pub struct ExpandTask {
    weight: f64,
    min_source_army: u32,
    turn: Turn,
    captures: u32,
}

impl ExpandTask {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            weight: config.weights.expand,
            min_source_army: config.expansion.min_source_army,
            turn: 0,
            captures: 0,
        }
    }

    fn find_capture(&self, board: &dyn Board, knowledge: &KnowledgeBase) -> Option<Move> {
        let general = knowledge.get::<GeneralDistance>();
        let mut best: Option<(f64, u32, Move)> = None;

        for (source, tile) in movable_tiles(board, self.min_source_army) {
            let distance = general.map_or(0.0, |g| g.general_distance(source));

            for neighbor in neighbors(board, source) {
                let Some(target) = board.tile_properties(neighbor) else {
                    continue;
                };
                if target.owner.is_some() || target.is_city || target.terrain.is_obstacle() {
                    continue;
                }
                if !can_capture(&tile, &target) {
                    continue;
                }

                let better = match best {
                    None => true,
                    Some((best_distance, best_army, _)) => {
                        distance < best_distance || (distance == best_distance && tile.army > best_army)
                    }
                };
                if better {
                    best = Some((distance, tile.army, Move::new(source, neighbor)));
                }
            }
        }

        best.map(|(_, _, chosen)| chosen)
    }
}

impl Task for ExpandTask {
    fn name(&self) -> &str {
        "Expand"
    }

    fn on_next_turn(&mut self, _board: &dyn Board, changes: &BoardChanges) {
        self.turn = changes.turn;
    }

    fn priority(&self, board: &dyn Board, knowledge: &KnowledgeBase) -> f64 {
        if self.find_capture(board, knowledge).is_some() {
            self.weight
        } else {
            0.0
        }
    }

    fn do_move(&mut self, board: &mut dyn Board, knowledge: &KnowledgeBase) -> Option<Move> {
        let chosen = self.find_capture(&*board, knowledge)?;
        if !board.attack(chosen.from, chosen.to) {
            return None;
        }
        self.captures += 1;
        Some(chosen)
    }

    fn debug_section(&self) -> Option<DebugSection> {
        Some(
            DebugSection::new(self.name())
                .with("turn", self.turn)
                .with("captures", self.captures),
        )
    }
}
