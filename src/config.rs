//! Engine configuration.
//!
//! Tuning knobs for candidate enumeration, the participant cost model and
//! the repair pass. Configuration can be built in code or parsed from JSON;
//! missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Minutes;

/// Scheduling engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Granularity of candidate start times inside a court window (minutes).
    pub slot_step: Minutes,
    /// Upper bound on slot scans during the repair pass. `0` disables it.
    pub max_repair_attempts: u32,
    /// Cost per minute of idle gap between a participant's sessions.
    pub idle_weight: u32,
    /// Cost per session a participant already holds.
    pub balance_weight: u32,
    /// Extra cost when a session starts right as another ends (or vice versa).
    pub back_to_back_penalty: u32,
    /// Maximum requests processed before the call is aborted.
    pub max_steps: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slot_step: 5,
            max_repair_attempts: 64,
            idle_weight: 1,
            balance_weight: 60,
            back_to_back_penalty: 30,
            max_steps: None,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the candidate start granularity.
    pub fn with_slot_step(mut self, minutes: Minutes) -> Self {
        self.slot_step = minutes;
        self
    }

    /// Sets the repair attempt budget (0 disables repair).
    pub fn with_max_repair_attempts(mut self, attempts: u32) -> Self {
        self.max_repair_attempts = attempts;
        self
    }

    /// Sets the participant cost weights.
    pub fn with_weights(mut self, idle: u32, balance: u32, back_to_back: u32) -> Self {
        self.idle_weight = idle;
        self.balance_weight = balance;
        self.back_to_back_penalty = back_to_back;
        self
    }

    /// Sets the request step budget.
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_step == 0 {
            return Err(ConfigError::Invalid {
                field: "slot_step",
                message: "must be greater than 0".into(),
            });
        }
        if self.max_steps == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_steps",
                message: "must be greater than 0 when set".into(),
            });
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig =
            serde_json::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
