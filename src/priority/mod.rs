//! Priority-map engine
//!
//! Targets seed a scalar field, the map spreads it breadth-first over every
//! traversable cell.

pub mod map;
pub mod target;

pub use map::{MapDiagnostic, PriorityMap, TargetId};
pub use target::{
    Contribution, DistanceTarget, MultiDistanceTarget, Target, TileFilter, TileFilterTarget, SEED_PRIORITY,
};
