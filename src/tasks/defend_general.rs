//! Protect the general against foreign armies closing in

use crate::board::{neighbors, points, Board};
use crate::core::config::AgentConfig;
use crate::core::types::{BoardChanges, Move, Point, Turn};
use crate::debug::DebugSection;
use crate::knowledge::{GeneralDistance, KnowledgeBase};
use crate::tasks::{can_capture, movable_tiles, Task};

/// Foreign army close to our general
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threat {
    pub location: Point,
    pub army: u32,
    pub steps: u32,
}

/// Strikes a nearby threat when we can beat it, otherwise pulls armies home
#[derive(Debug, Clone)]
pub struct DefendGeneralTask {
    weight: f64,
    threat_radius: u32,
    min_threat_ratio: f64,
    threatened_turns: u32,
    last_turn: Turn,
}

impl DefendGeneralTask {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            weight: config.weights.defend_general,
            threat_radius: config.defense.threat_radius,
            min_threat_ratio: config.defense.min_threat_ratio,
            threatened_turns: 0,
            last_turn: 0,
        }
    }

    /// Closest foreign army within the threat radius; larger armies break ties
    pub fn find_threat(&self, board: &dyn Board, knowledge: &KnowledgeBase) -> Option<Threat> {
        let distances = knowledge.get::<GeneralDistance>()?;
        let general = distances.general()?;
        let general_army = board.tile_properties(general)?.army;
        let me = board.me();
        let floor = f64::from(general_army) * self.min_threat_ratio;

        let mut best: Option<Threat> = None;
        for point in points(board) {
            let Some(tile) = board.tile_properties(point) else {
                continue;
            };
            if tile.owner.is_none() || tile.is_owned_by(me) || f64::from(tile.army) < floor {
                continue;
            }
            let Some(steps) = threat_steps(board, distances, point) else {
                continue;
            };
            if steps > self.threat_radius {
                continue;
            }

            let closer = match best {
                None => true,
                Some(current) => steps < current.steps || (steps == current.steps && tile.army > current.army),
            };
            if closer {
                best = Some(Threat {
                    location: point,
                    army: tile.army,
                    steps,
                });
            }
        }
        best
    }

    /// Our strongest tile next to the threat that wins the fight outright
    fn strike(&self, board: &dyn Board, threat: &Threat) -> Option<Move> {
        let me = board.me();
        let target = board.tile_properties(threat.location)?;
        neighbors(board, threat.location)
            .filter_map(|point| board.tile_properties(point).map(|tile| (point, tile)))
            .filter(|(_, tile)| tile.is_owned_by(me) && can_capture(tile, &target))
            .max_by_key(|(_, tile)| tile.army)
            .map(|(point, _)| Move::new(point, threat.location))
    }

    /// Largest army away from the general, stepped one cell toward it
    fn reinforce(&self, board: &dyn Board, distances: &GeneralDistance) -> Option<Move> {
        let general = distances.general()?;
        let mut sources = movable_tiles(board, 2);
        sources.retain(|(point, _)| *point != general);
        // Stable sort keeps board order among equal armies
        sources.sort_by(|a, b| b.1.army.cmp(&a.1.army));

        sources.into_iter().find_map(|(point, _)| {
            distances
                .step_toward_general(board, point)
                .map(|next| Move::new(point, next))
        })
    }
}

/// Steps from the general to `point`
///
/// Foreign cities are never entered by the general distance map, so a tile the
/// map did not reach is measured through its closest reached neighbor.
fn threat_steps(board: &dyn Board, distances: &GeneralDistance, point: Point) -> Option<u32> {
    distances.steps_from_general(point).or_else(|| {
        neighbors(board, point)
            .filter(|&neighbor| board.is_traversable(neighbor))
            .filter_map(|neighbor| distances.steps_from_general(neighbor))
            .min()
            .map(|steps| steps + 1)
    })
}

impl Task for DefendGeneralTask {
    fn name(&self) -> &str {
        "Defend general"
    }

    fn on_next_turn(&mut self, _board: &dyn Board, changes: &BoardChanges) {
        self.last_turn = changes.turn;
    }

    fn priority(&self, board: &dyn Board, knowledge: &KnowledgeBase) -> f64 {
        let Some(threat) = self.find_threat(board, knowledge) else {
            return 0.0;
        };
        let closeness = self.threat_radius + 1 - threat.steps.min(self.threat_radius);
        self.weight * f64::from(closeness) / f64::from(self.threat_radius)
    }

    fn do_move(&mut self, board: &mut dyn Board, knowledge: &KnowledgeBase) -> Option<Move> {
        let threat = self.find_threat(&*board, knowledge)?;
        self.threatened_turns += 1;

        let chosen = match self.strike(&*board, &threat) {
            Some(chosen) => chosen,
            None => {
                let distances = knowledge.get::<GeneralDistance>()?;
                self.reinforce(&*board, distances)?
            }
        };

        tracing::debug!(
            "Threat of {} at {} ({} steps), moving {} -> {}",
            threat.army,
            threat.location,
            threat.steps,
            chosen.from,
            chosen.to
        );
        board.attack(chosen.from, chosen.to).then_some(chosen)
    }

    fn debug_section(&self) -> Option<DebugSection> {
        Some(
            DebugSection::new(self.name())
                .with("turn", self.last_turn)
                .with("threatened turns", self.threatened_turns)
                .with("threat radius", self.threat_radius),
        )
    }
}
