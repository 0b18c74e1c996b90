//! Agent configuration loaded from TOML
//!
//! Task weights set the base urgency of each behavior. The scheduler only
//! compares priorities, so what matters is the ratio between weights, not
//! their absolute size.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{AgentError, Result};

/// Base priority of each task when its precondition holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskWeights {
    /// Capturing neutral land next to our territory
    pub expand: f64,
    /// Protecting the general against a nearby foreign army
    pub defend_general: f64,
    /// Walking toward and capturing cities
    pub capture_city: f64,
}

impl Default for TaskWeights {
    fn default() -> Self {
        Self {
            expand: 10.0,
            defend_general: 100.0,
            capture_city: 25.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefenseConfig {
    /// Foreign armies within this many steps of the general count as threats
    pub threat_radius: u32,
    /// Threats weaker than `general army * min_threat_ratio` are ignored
    pub min_threat_ratio: f64,
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self {
            threat_radius: 6,
            min_threat_ratio: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Smallest army an owned tile must hold before it is used to expand
    pub min_source_army: u32,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self { min_source_army: 2 }
    }
}

/// Complete agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub weights: TaskWeights,
    #[serde(default)]
    pub defense: DefenseConfig,
    #[serde(default)]
    pub expansion: ExpansionConfig,
}

impl AgentConfig {
    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AgentConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("expand", self.weights.expand),
            ("defend_general", self.weights.defend_general),
            ("capture_city", self.weights.capture_city),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AgentError::InvalidConfig(format!(
                    "weight {} must be finite and non-negative (got {})",
                    name, weight
                )));
            }
        }

        if self.defense.threat_radius == 0 {
            return Err(AgentError::InvalidConfig(
                "defense.threat_radius must be at least 1".into(),
            ));
        }

        if !(0.0..=10.0).contains(&self.defense.min_threat_ratio) {
            return Err(AgentError::InvalidConfig(format!(
                "defense.min_threat_ratio ({}) should be within 0..=10",
                self.defense.min_threat_ratio
            )));
        }

        if self.expansion.min_source_army < 2 {
            return Err(AgentError::InvalidConfig(
                "expansion.min_source_army must leave one army behind (>= 2)".into(),
            ));
        }

        Ok(())
    }
}

/// Load and validate a config file
pub fn load_config(path: impl AsRef<Path>) -> Result<AgentConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    AgentConfig::from_toml_str(&contents)
}
