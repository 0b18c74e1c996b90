//! Turn loop: observe, rank, act
//!
//! Every turn the scheduler broadcasts the board changes to the knowledge
//! sources and then to the tasks, ranks the tasks by priority and lets the
//! best one act. A task that declines hands the turn to the next in line; if
//! all decline the turn passes without a move.

mod report;

pub use report::{RankedTask, TurnReport, TurnTiming};

use std::cmp::Reverse;
use std::time::Instant;

use ordered_float::OrderedFloat;

use crate::board::Board;
use crate::core::config::AgentConfig;
use crate::core::types::BoardChanges;
use crate::debug::DebugSection;
use crate::knowledge::{CityDistance, GeneralDistance, KnowledgeBase, KnowledgeSource};
use crate::tasks::{CaptureCityTask, DefendGeneralTask, ExpandTask, Task};

/// Where the scheduler is within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Broadcasting changes; also the resting state between turns
    Observe,
    /// Ranking tasks and invoking moves
    Act,
}

/// Owns the knowledge base and the fixed set of tasks
pub struct Scheduler {
    knowledge: KnowledgeBase,
    tasks: Vec<Box<dyn Task>>,
    phase: TurnPhase,
    timing: TurnTiming,
    last_report: Option<TurnReport>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            knowledge: KnowledgeBase::new(),
            tasks: Vec::new(),
            phase: TurnPhase::Observe,
            timing: TurnTiming::default(),
            last_report: None,
        }
    }

    /// Scheduler wired with every built-in knowledge source and task
    ///
    /// Registration order doubles as the tie-break order: defending the
    /// general beats taking a city beats expanding.
    pub fn standard(config: &AgentConfig) -> Self {
        let mut scheduler = Self::new();
        scheduler.add_knowledge(GeneralDistance::new());
        scheduler.add_knowledge(CityDistance::new());
        scheduler.add_task(DefendGeneralTask::new(config));
        scheduler.add_task(CaptureCityTask::new(config));
        scheduler.add_task(ExpandTask::new(config));
        scheduler
    }

    pub fn add_knowledge(&mut self, source: impl KnowledgeSource) {
        self.knowledge.register(source);
    }

    pub fn add_task(&mut self, task: impl Task + 'static) {
        self.tasks.push(Box::new(task));
    }

    /// Run one full Observe + Act cycle
    pub fn run_turn(&mut self, board: &mut dyn Board, changes: &BoardChanges) -> &TurnReport {
        let started = Instant::now();

        self.phase = TurnPhase::Observe;
        self.knowledge.on_next_turn(&*board, changes);
        for task in &mut self.tasks {
            task.on_next_turn(&*board, changes);
        }

        self.phase = TurnPhase::Act;
        let order = self.rank(&*board);

        let mut selected = None;
        let mut declined = Vec::new();
        for &(index, _) in &order {
            let task = &mut self.tasks[index];
            match task.do_move(board, &self.knowledge) {
                Some(chosen) => {
                    selected = Some((task.name().to_string(), chosen));
                    break;
                }
                None => {
                    tracing::debug!("Task '{}' declined on turn {}", task.name(), changes.turn);
                    declined.push(task.name().to_string());
                }
            }
        }
        self.phase = TurnPhase::Observe;

        let elapsed = started.elapsed();
        let smoothed_ms = self.timing.record(elapsed);

        match &selected {
            Some((name, chosen)) => tracing::info!(
                "Turn {}: '{}' moved {} -> {}",
                changes.turn,
                name,
                chosen.from,
                chosen.to
            ),
            None => tracing::info!("Turn {}: no task acted", changes.turn),
        }

        let ranking = order
            .iter()
            .map(|&(index, priority)| RankedTask {
                name: self.tasks[index].name().to_string(),
                priority,
            })
            .collect();
        let (selected_task, chosen_move) = match selected {
            Some((name, chosen)) => (Some(name), Some(chosen)),
            None => (None, None),
        };

        self.last_report.insert(TurnReport {
            turn: changes.turn,
            selected_task,
            chosen_move,
            ranking,
            declined,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            smoothed_ms,
        })
    }

    /// Task indices with their priorities, highest first, registration order on ties
    fn rank(&self, board: &dyn Board) -> Vec<(usize, f64)> {
        let mut order: Vec<(usize, f64)> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                let priority = task.priority(board, &self.knowledge);
                let priority = if priority.is_nan() { f64::NEG_INFINITY } else { priority };
                (index, priority)
            })
            .collect();
        order.sort_by_key(|&(_, priority)| Reverse(OrderedFloat(priority)));
        order
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn last_report(&self) -> Option<&TurnReport> {
        self.last_report.as_ref()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|task| task.name()).collect()
    }

    /// Debug sections of every knowledge source, then every task
    pub fn debug_sections(&self) -> Vec<DebugSection> {
        self.knowledge
            .iter()
            .filter_map(|source| source.debug_section())
            .chain(self.tasks.iter().filter_map(|task| task.debug_section()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::board::GridBoard;
    use crate::core::types::{Move, PlayerId, Point};

    struct Fixed {
        name: &'static str,
        priority: f64,
    }

    impl Task for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self, _board: &dyn Board, _knowledge: &KnowledgeBase) -> f64 {
            self.priority
        }

        fn do_move(&mut self, _board: &mut dyn Board, _knowledge: &KnowledgeBase) -> Option<Move> {
            Some(Move::new(Point::new(0, 0), Point::new(0, 1)))
        }
    }

    struct Counting {
        name: &'static str,
        priority: f64,
        accepts: bool,
        calls: Rc<Cell<u32>>,
    }

    impl Task for Counting {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self, _board: &dyn Board, _knowledge: &KnowledgeBase) -> f64 {
            self.priority
        }

        fn do_move(&mut self, _board: &mut dyn Board, _knowledge: &KnowledgeBase) -> Option<Move> {
            self.calls.set(self.calls.get() + 1);
            self.accepts
                .then(|| Move::new(Point::new(0, 0), Point::new(0, 1)))
        }
    }

    #[test]
    fn test_declined_task_falls_through() {
        let mut board = GridBoard::new(2, 1, PlayerId(0));
        let calls: Vec<Rc<Cell<u32>>> = (0..3).map(|_| Rc::new(Cell::new(0))).collect();
        let mut scheduler = Scheduler::new();
        // Registered out of priority order on purpose
        scheduler.add_task(Counting { name: "low", priority: 1.0, accepts: true, calls: calls[2].clone() });
        scheduler.add_task(Counting { name: "high", priority: 10.0, accepts: false, calls: calls[0].clone() });
        scheduler.add_task(Counting { name: "mid", priority: 5.0, accepts: true, calls: calls[1].clone() });

        let changes = board.take_changes();
        let report = scheduler.run_turn(&mut board, &changes);

        assert_eq!(report.selected_task.as_deref(), Some("mid"));
        assert_eq!(report.declined, vec!["high".to_string()]);
        assert_eq!(calls[0].get(), 1);
        assert_eq!(calls[1].get(), 1);
        assert_eq!(calls[2].get(), 0);
    }

    #[test]
    fn test_all_declined_passes_turn() {
        let mut board = GridBoard::new(2, 1, PlayerId(0));
        let calls = Rc::new(Cell::new(0));
        let mut scheduler = Scheduler::new();
        for name in ["a", "b"] {
            scheduler.add_task(Counting { name, priority: 3.0, accepts: false, calls: calls.clone() });
        }

        let changes = board.take_changes();
        let report = scheduler.run_turn(&mut board, &changes);
        assert!(!report.acted());
        assert_eq!(report.selected_task, None);
        assert_eq!(calls.get(), 2);
        assert!(scheduler.last_report().is_some());
    }

    #[test]
    fn test_ties_follow_registration_order() {
        let mut board = GridBoard::new(2, 1, PlayerId(0));
        let mut scheduler = Scheduler::new();
        scheduler.add_task(Fixed { name: "first", priority: 5.0 });
        scheduler.add_task(Fixed { name: "second", priority: 5.0 });
        scheduler.add_task(Fixed { name: "low", priority: 1.0 });

        let changes = board.take_changes();
        let report = scheduler.run_turn(&mut board, &changes);
        assert_eq!(report.selected_task.as_deref(), Some("first"));
        let names: Vec<&str> = report.ranking.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "low"]);
    }

    #[test]
    fn test_nan_priority_ranks_last() {
        let mut board = GridBoard::new(2, 1, PlayerId(0));
        let mut scheduler = Scheduler::new();
        scheduler.add_task(Fixed { name: "broken", priority: f64::NAN });
        scheduler.add_task(Fixed { name: "idle", priority: 0.0 });

        let changes = board.take_changes();
        let report = scheduler.run_turn(&mut board, &changes);
        assert_eq!(report.selected_task.as_deref(), Some("idle"));
    }

    #[test]
    fn test_empty_scheduler_ends_turn_without_action() {
        let mut board = GridBoard::new(2, 2, PlayerId(0));
        let mut scheduler = Scheduler::new();
        let changes = board.take_changes();

        let report = scheduler.run_turn(&mut board, &changes);
        assert!(!report.acted());
        assert!(report.ranking.is_empty());
        assert_eq!(scheduler.phase(), TurnPhase::Observe);
    }

    #[test]
    fn test_standard_wiring() {
        let scheduler = Scheduler::standard(&AgentConfig::default());
        assert_eq!(
            scheduler.task_names(),
            vec!["Defend general", "Capture city", "Expand"]
        );
        assert!(scheduler.knowledge().get::<GeneralDistance>().is_some());
        assert!(scheduler.knowledge().get::<CityDistance>().is_some());
        assert_eq!(scheduler.debug_sections().len(), 5);
    }
}
