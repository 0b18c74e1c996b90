//! Per-turn observability record

use std::time::Duration;

use serde::Serialize;

use crate::core::types::{Move, Turn};

/// A task and the priority it reported this turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTask {
    pub name: String,
    pub priority: f64,
}

/// What the scheduler saw and did in one turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReport {
    pub turn: Turn,
    /// Task that acted, if any
    pub selected_task: Option<String>,
    pub chosen_move: Option<Move>,
    /// Every task, highest priority first
    pub ranking: Vec<RankedTask>,
    /// Tasks that were asked to act and declined, in the order they were asked
    pub declined: Vec<String>,
    pub elapsed_ms: f64,
    pub smoothed_ms: f64,
}

impl TurnReport {
    pub fn acted(&self) -> bool {
        self.chosen_move.is_some()
    }
}

/// Exponentially smoothed thinking time
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnTiming {
    smoothed_ms: f64,
}

impl TurnTiming {
    /// Fold a new sample in with weight 1/10
    pub fn record(&mut self, elapsed: Duration) -> f64 {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.smoothed_ms = (self.smoothed_ms * 9.0 + ms) / 10.0;
        self.smoothed_ms
    }

    pub fn smoothed_ms(&self) -> f64 {
        self.smoothed_ms
    }
}
