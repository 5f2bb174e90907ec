//! Error types for microgd

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
  ShapeMismatch {
    expected: Vec<usize>,
    got: Vec<usize>,
  },

  #[error("Batch contains no samples")]
  EmptyBatch,

  #[error("Cannot compute gradients for a value that depends on no trainable parameter")]
  ConstantBackward,

  #[error("Parameter has no gradient: {0}")]
  MissingGradient(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] postcard::Error),

  #[error("Invalid JSON: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
