pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, AgentConfig};
pub use error::{AgentError, Result};
pub use types::{BoardChanges, CellIndex, Direction, Move, PlayerId, Point, TileProperties, Terrain, Turn};
