use std::fs;
use std::path::Path;

use serde::{ Serialize, Deserialize };

use crate::error::{ Error, Result };


/// Hyperparameters of a training run.
///
/// Missing fields fall back to their defaults when deserializing, so
/// `{}` is a valid configuration.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainConfig {
  pub learning_rate: f64,
  pub num_epochs: usize,
  /// Epochs that are a multiple of this get their summary logged at info level.
  pub log_epochs: usize,
  /// Seed for the weight initialization.
  pub seed: u64,
}

impl Default for TrainConfig {
  fn default() -> Self {
    Self {
      learning_rate: 0.001,
      num_epochs: 2,
      log_epochs: 10,
      seed: 1,
    }
  }
}

impl TrainConfig {
  pub fn from_json(json: &str) -> Result<Self> {
    let config: Self = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    Self::from_json(&fs::read_to_string(path)?)
  }

  pub fn validate(&self) -> Result<()> {
    if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
      return Err(Error::Config(format!("learning_rate must be positive, got {}", self.learning_rate)))
    }
    if self.log_epochs == 0 {
      return Err(Error::Config("log_epochs must be at least 1".into()))
    }
    Ok(())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let config = TrainConfig::from_json("{}").unwrap();
    assert_eq!(config, TrainConfig::default());
    assert_eq!(config.learning_rate, 0.001);
    assert_eq!(config.num_epochs, 2);
    assert_eq!(config.log_epochs, 10);
  }

  #[test]
  fn partial_override() {
    let config = TrainConfig::from_json(r#"{ "num_epochs": 0, "seed": 42 }"#).unwrap();
    assert_eq!(config.num_epochs, 0);
    assert_eq!(config.seed, 42);
    assert_eq!(config.learning_rate, 0.001);
  }

  #[test]
  fn rejects_bad_values() {
    assert!(matches!(TrainConfig::from_json(r#"{ "learning_rate": -1.0 }"#), Err(Error::Config(_))));
    assert!(matches!(TrainConfig::from_json(r#"{ "log_epochs": 0 }"#), Err(Error::Config(_))));
    assert!(matches!(TrainConfig::from_json(r#"{ "epochs": 3 }"#), Err(Error::Json(_))));
  }

  #[test]
  fn missing_file() {
    assert!(matches!(TrainConfig::from_file("/nonexistent/train.json"), Err(Error::Io(_))));
  }
}
