use thiserror::Error;

use crate::core::types::Point;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Target already seeded: {0}")]
    TargetAlreadySeeded(String),

    #[error("Point out of bounds: {0}")]
    OutOfBounds(Point),

    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
