//! Offline solver configuration.
//!
//! ```
//! use varpage::config::{Reduction, SolverConfig};
//!
//! let config: SolverConfig = serde_json::from_str(r#"{ "reduction": "interval" }"#).unwrap();
//! assert_eq!(config.reduction, Reduction::Interval);
//! assert_eq!(config.min_reward, 1_000_000.0);
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default floor for the reward constant that forces mandatory edges.
pub const DEFAULT_MIN_REWARD: f64 = 1_000_000.0;

/// Which flow reduction the offline solver builds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// One layer of page nodes per request. Models every schedule.
    #[default]
    Layered,
    /// Retention intervals over a step backbone. Models lazy schedules.
    Interval,
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Layered => f.write_str("layered"),
            Reduction::Interval => f.write_str("interval"),
        }
    }
}

impl FromStr for Reduction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "layered" => Ok(Reduction::Layered),
            "interval" => Ok(Reduction::Interval),
            other => Err(ConfigError::new(format!(
                "unknown reduction {other:?}, expected \"layered\" or \"interval\""
            ))),
        }
    }
}

/// Parameters of [`OfflineSolver`](crate::offline::OfflineSolver).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub reduction: Reduction,
    /// Lower bound for the `-LARGE` reward on mandatory edges. Raised
    /// automatically when an instance's real cost could exceed it.
    pub min_reward: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            reduction: Reduction::default(),
            min_reward: DEFAULT_MIN_REWARD,
        }
    }
}

impl SolverConfig {
    pub fn with_reduction(mut self, reduction: Reduction) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn with_min_reward(mut self, min_reward: f64) -> Self {
        self.min_reward = min_reward;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_reward.is_finite() || self.min_reward <= 0.0 {
            return Err(ConfigError::new(format!(
                "min_reward must be positive and finite, got {}",
                self.min_reward
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_layered() {
        let config = SolverConfig::default();
        assert_eq!(config.reduction, Reduction::Layered);
        assert_eq!(config.min_reward, DEFAULT_MIN_REWARD);
    }

    #[test]
    fn empty_json_uses_defaults() {
        let config: SolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SolverConfig::default());
    }

    #[test]
    fn serializes_reduction_in_snake_case() {
        let config = SolverConfig::default().with_reduction(Reduction::Interval);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"interval\""));
    }

    #[test]
    fn rejects_bad_min_reward() {
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = SolverConfig::default().with_min_reward(bad).validate().unwrap_err();
            assert!(err.message().contains("min_reward"));
        }
    }

    #[test]
    fn parses_reduction_names() {
        assert_eq!("layered".parse::<Reduction>().unwrap(), Reduction::Layered);
        assert_eq!("interval".parse::<Reduction>().unwrap(), Reduction::Interval);
        assert!("bottleneck".parse::<Reduction>().is_err());
        assert_eq!(Reduction::Interval.to_string(), "interval");
    }
}
