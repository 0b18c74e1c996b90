//! Generals Agent - decision core for a turn-based grid-territory game
//!
//! Each turn the [`scheduler::Scheduler`] feeds board changes to shared
//! knowledge (distance fields built on [`priority::PriorityMap`]), ranks the
//! competing [`tasks`] and lets the most urgent one move.

pub mod board;
pub mod core;
pub mod debug;
pub mod knowledge;
pub mod priority;
pub mod scheduler;
pub mod tasks;

pub use crate::board::{Board, GridBoard};
pub use crate::core::{AgentConfig, AgentError, BoardChanges, Move, PlayerId, Point, Result};
pub use crate::scheduler::{Scheduler, TurnReport};
