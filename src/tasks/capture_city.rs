//! March the biggest army to the nearest foreign city and take it

use crate::board::Board;
use crate::core::config::AgentConfig;
use crate::core::types::{Move, Point, TileProperties};
use crate::debug::DebugSection;
use crate::knowledge::{CityDistance, KnowledgeBase};
use crate::tasks::{can_capture, movable_tiles, Task};

#[derive(Debug, Clone, Copy)]
struct Plan {
    source: Point,
    army: u32,
    next: Point,
    steps: u32,
}

/// Walks our largest army downhill on the city distance map
#[derive(Debug, Clone)]
pub struct CaptureCityTask {
    weight: f64,
    attempts: u32,
    declined: u32,
}

impl CaptureCityTask {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            weight: config.weights.capture_city,
            attempts: 0,
            declined: 0,
        }
    }

    fn plan(&self, board: &dyn Board, cities: &CityDistance) -> Option<Plan> {
        if cities.city_count() == 0 {
            return None;
        }

        let mut best: Option<Plan> = None;
        for (source, tile) in movable_tiles(board, 2) {
            let distance = cities.city_distance(source);
            if !distance.is_finite() {
                continue;
            }
            let Some(next) = cities.step_toward_city(board, source) else {
                continue;
            };
            let Some(next_tile) = board.tile_properties(next) else {
                continue;
            };
            // A city that would hold against this army is not a move
            if is_foreign_city(board, &next_tile) && !can_capture(&tile, &next_tile) {
                continue;
            }
            // Priority is distance + 1; sources are never cities we target
            let steps = (distance as u32).saturating_sub(1).max(1);

            let better = match best {
                None => true,
                Some(current) => tile.army > current.army || (tile.army == current.army && steps < current.steps),
            };
            if better {
                best = Some(Plan {
                    source,
                    army: tile.army,
                    next,
                    steps,
                });
            }
        }
        best
    }
}

fn is_foreign_city(board: &dyn Board, tile: &TileProperties) -> bool {
    tile.is_city && !tile.is_owned_by(board.me())
}

impl Task for CaptureCityTask {
    fn name(&self) -> &str {
        "Capture city"
    }

    fn priority(&self, board: &dyn Board, knowledge: &KnowledgeBase) -> f64 {
        let Some(cities) = knowledge.get::<CityDistance>() else {
            return 0.0;
        };
        match self.plan(board, cities) {
            Some(plan) => self.weight / f64::from(plan.steps),
            None => 0.0,
        }
    }

    fn do_move(&mut self, board: &mut dyn Board, knowledge: &KnowledgeBase) -> Option<Move> {
        let cities = knowledge.get::<CityDistance>()?;
        self.attempts += 1;
        let Some(plan) = self.plan(&*board, cities) else {
            self.declined += 1;
            tracing::debug!("No army can reach or take a city, waiting");
            return None;
        };

        let chosen = Move::new(plan.source, plan.next);
        board.attack(chosen.from, chosen.to).then_some(chosen)
    }

    fn debug_section(&self) -> Option<DebugSection> {
        Some(
            DebugSection::new(self.name())
                .with("attempts", self.attempts)
                .with("declined", self.declined),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GridBoard;
    use crate::core::types::PlayerId;

    const ME: PlayerId = PlayerId(0);

    fn knowledge_for(board: &mut GridBoard) -> KnowledgeBase {
        let mut knowledge = KnowledgeBase::new();
        knowledge.register(CityDistance::new());
        let changes = board.take_changes();
        knowledge.on_next_turn(&*board, &changes);
        knowledge
    }

    #[test]
    fn test_no_cities_no_priority() {
        let mut board = GridBoard::from_ascii("G...", ME).unwrap();
        board.set_army(Point::new(0, 0), 10).unwrap();
        let knowledge = knowledge_for(&mut board);
        let task = CaptureCityTask::new(&AgentConfig::default());

        assert_eq!(task.priority(&board, &knowledge), 0.0);
    }

    #[test]
    fn test_closer_city_raises_priority() {
        let mut board = GridBoard::from_ascii("G...C", ME).unwrap();
        board.set_army(Point::new(0, 0), 10).unwrap();
        let knowledge = knowledge_for(&mut board);
        let task = CaptureCityTask::new(&AgentConfig::default());
        let far = task.priority(&board, &knowledge);

        let mut board = GridBoard::from_ascii("G.C..", ME).unwrap();
        board.set_army(Point::new(0, 0), 10).unwrap();
        let knowledge = knowledge_for(&mut board);
        let near = task.priority(&board, &knowledge);

        assert!(near > far);
        assert_eq!(near, AgentConfig::default().weights.capture_city / 2.0);
    }

    #[test]
    fn test_moves_biggest_army_toward_city() {
        let mut board = GridBoard::from_ascii("A.G..C", ME).unwrap();
        board.set_army(Point::new(0, 0), 3).unwrap();
        board.set_army(Point::new(0, 2), 15).unwrap();
        let knowledge = knowledge_for(&mut board);
        let mut task = CaptureCityTask::new(&AgentConfig::default());

        let chosen = task.do_move(&mut board, &knowledge).unwrap();
        assert_eq!(chosen, Move::new(Point::new(0, 2), Point::new(0, 3)));
    }

    #[test]
    fn test_too_strong_city_has_no_priority() {
        let mut board = GridBoard::from_ascii("GC", ME).unwrap();
        board.set_army(Point::new(0, 0), 8).unwrap();
        let knowledge = knowledge_for(&mut board);
        let mut task = CaptureCityTask::new(&AgentConfig::default());

        assert_eq!(task.priority(&board, &knowledge), 0.0);
        assert_eq!(task.do_move(&mut board, &knowledge), None);
        assert_eq!(board.tile(Point::new(0, 0)).unwrap().army, 8);
        let section = task.debug_section().unwrap();
        assert_eq!(section.parameters.get("declined").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_weaker_army_marches_while_strong_one_waits() {
        let mut board = GridBoard::from_ascii("GC...A", ME).unwrap();
        board.set_army(Point::new(0, 0), 8).unwrap();
        board.set_army(Point::new(0, 5), 5).unwrap();
        let knowledge = knowledge_for(&mut board);
        let mut task = CaptureCityTask::new(&AgentConfig::default());

        // The general's stack cannot take the city, the far army can still close in
        assert!(task.priority(&board, &knowledge) > 0.0);
        let chosen = task.do_move(&mut board, &knowledge).unwrap();
        assert_eq!(chosen, Move::new(Point::new(0, 5), Point::new(0, 4)));
    }

    #[test]
    fn test_captures_adjacent_city_when_strong_enough() {
        let mut board = GridBoard::from_ascii("GC", ME).unwrap();
        board.set_army(Point::new(0, 0), 12).unwrap();
        let knowledge = knowledge_for(&mut board);
        let mut task = CaptureCityTask::new(&AgentConfig::default());

        assert!(task.do_move(&mut board, &knowledge).is_some());
        assert_eq!(board.tile(Point::new(0, 1)).unwrap().owner, Some(ME));
    }
}
