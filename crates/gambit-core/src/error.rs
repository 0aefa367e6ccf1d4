//! Error types for `gambit-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("timestamp out of range: {0} ms")]
  TimestampOutOfRange(i64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
