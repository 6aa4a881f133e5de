//! Run configuration.
//!
//! Every field has a default, so a JSON file only needs the keys it wants
//! to change:
//!
//! ```
//! use cartpole_dqn::config::Config;
//! use cartpole_dqn::policy::EpsilonDecay;
//!
//! let config = Config::from_json_str(r#"{
//!     "agent": { "epsilon_decay": { "kind": "geometric", "factor": 0.995, "floor": 0.01 } },
//!     "training": { "episodes": 50 }
//! }"#).unwrap();
//! assert_eq!(config.training.episodes, 50);
//! assert_eq!(config.agent.batch_size, 50);
//! assert_eq!(config.agent.epsilon_decay, EpsilonDecay::Geometric { factor: 0.995, floor: 0.01 });
//! ```

use serde::{Serialize, Deserialize};
use std::fs;
use std::path::Path;

use crate::error::{DqnError, Result};
use crate::optimizer::OptimizerKind;
use crate::policy::EpsilonDecay;

/// Environment variable the driver reads a config file path from.
pub const CONFIG_ENV_VAR: &str = "CARTPOLE_DQN_CONFIG";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub training: TrainingConfig,
}

/// Hyperparameters of the agent and its Q-network.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub hidden_units: usize,
    pub learning_rate: f32,
    /// Discount factor.
    pub gamma: f32,
    pub replay_capacity: usize,
    pub batch_size: usize,
    pub initial_epsilon: f32,
    pub epsilon_decay: EpsilonDecay,
    pub optimizer: OptimizerKind,
    /// Seed for weight init, sampling and exploration. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            hidden_units: 100,
            learning_rate: 0.001,
            gamma: 0.99,
            replay_capacity: 10_000,
            batch_size: 50,
            initial_epsilon: 1.0,
            epsilon_decay: EpsilonDecay::Clamped,
            optimizer: OptimizerKind::Adam,
            seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: usize,
    /// Call `Environment::render` after every step.
    pub render: bool,
    pub env_seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            episodes: 500,
            render: false,
            env_seed: None,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load from the file named by [`CONFIG_ENV_VAR`], or fall back to defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(path),
            None => Ok(Config::default()),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.agent.validate()
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_units == 0 {
            return Err(DqnError::invalid_parameter("hidden_units", "must be greater than 0"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(DqnError::invalid_parameter(
                "learning_rate".to_string(),
                format!("must be positive and finite, got {}", self.learning_rate),
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(DqnError::invalid_parameter(
                "gamma".to_string(),
                format!("must be in [0, 1], got {}", self.gamma),
            ));
        }
        if self.replay_capacity == 0 {
            return Err(DqnError::invalid_parameter("replay_capacity", "must be greater than 0"));
        }
        if self.batch_size == 0 {
            return Err(DqnError::invalid_parameter("batch_size", "must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.initial_epsilon) {
            return Err(DqnError::invalid_parameter(
                "initial_epsilon".to_string(),
                format!("must be in [0, 1], got {}", self.initial_epsilon),
            ));
        }
        self.epsilon_decay.validate()
    }
}
