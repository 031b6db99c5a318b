//! Error types for `rota-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Tabular input could not be normalized into records at all, e.g. the
  /// identity columns are missing. Unparseable date headers are *not* an
  /// error; they are skipped and counted.
  #[error("parse error: {0}")]
  Parse(String),

  /// A required input value is missing or malformed (empty agent name,
  /// record with no email).
  #[error("validation error: {0}")]
  Validation(String),

  /// A referenced table or resource does not exist.
  #[error("not found: {0}")]
  NotFound(String),

  /// The underlying storage operation failed. Never caught by the engine;
  /// the caller rolls back the whole pass.
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
