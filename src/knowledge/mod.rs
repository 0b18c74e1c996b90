//! Knowledge sources: per-turn derived state exposed to tasks
//!
//! Each source owns its priority maps outright and answers narrow, named
//! queries. Tasks get a shared [`KnowledgeBase`] reference and can only read.

mod city_distance;
mod gate;
mod general_distance;

pub use city_distance::CityDistance;
pub use gate::TraversalGate;
pub use general_distance::GeneralDistance;

use std::any::Any;

use crate::board::Board;
use crate::core::types::BoardChanges;
use crate::debug::DebugSection;

/// Per-turn updated component wrapping priority maps or other derived state
pub trait KnowledgeSource: Any {
    fn name(&self) -> &str;

    /// Called exactly once per turn, before any task priority is asked for
    fn on_next_turn(&mut self, board: &dyn Board, changes: &BoardChanges);

    fn debug_section(&self) -> Option<DebugSection> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Ordered registry of knowledge sources with typed lookup
#[derive(Default)]
pub struct KnowledgeBase {
    sources: Vec<Box<dyn KnowledgeSource>>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sources are updated in registration order
    pub fn register(&mut self, source: impl KnowledgeSource) {
        self.sources.push(Box::new(source));
    }

    /// First registered source of type `T`
    pub fn get<T: KnowledgeSource>(&self) -> Option<&T> {
        self.sources
            .iter()
            .find_map(|source| source.as_any().downcast_ref::<T>())
    }

    pub fn on_next_turn(&mut self, board: &dyn Board, changes: &BoardChanges) {
        for source in &mut self.sources {
            source.on_next_turn(board, changes);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn KnowledgeSource + 'static)> {
        self.sources.iter().map(|source| source.as_ref())
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Translate a raw priority into a caller-facing value, zero becoming infinity
pub(crate) fn priority_or_infinity(priority: u32) -> f64 {
    if priority == 0 {
        f64::INFINITY
    } else {
        f64::from(priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GridBoard;
    use crate::core::types::PlayerId;

    struct TurnCounter {
        turns: u32,
    }

    impl KnowledgeSource for TurnCounter {
        fn name(&self) -> &str {
            "turn counter"
        }

        fn on_next_turn(&mut self, _board: &dyn Board, _changes: &BoardChanges) {
            self.turns += 1;
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_typed_lookup() {
        let mut knowledge = KnowledgeBase::new();
        knowledge.register(TurnCounter { turns: 0 });
        knowledge.register(GeneralDistance::new());

        assert!(knowledge.get::<TurnCounter>().is_some());
        assert!(knowledge.get::<GeneralDistance>().is_some());
        assert!(knowledge.get::<CityDistance>().is_none());
        assert_eq!(knowledge.len(), 2);
    }

    #[test]
    fn test_every_source_updated_once_per_turn() {
        let board = GridBoard::new(2, 2, PlayerId(0));
        let mut knowledge = KnowledgeBase::new();
        knowledge.register(TurnCounter { turns: 0 });

        knowledge.on_next_turn(&board, &BoardChanges::default());
        knowledge.on_next_turn(&board, &BoardChanges::default());
        assert_eq!(knowledge.get::<TurnCounter>().unwrap().turns, 2);
    }

    #[test]
    fn test_zero_priority_is_infinite() {
        assert_eq!(priority_or_infinity(0), f64::INFINITY);
        assert_eq!(priority_or_infinity(4), 4.0);
    }
}
