//! Error type for `rota-sheet`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("cannot read workbook: {0}")]
  Workbook(String),

  #[error("workbook has no sheets")]
  NoSheets,

  #[error("sheet is empty")]
  EmptySheet,

  /// The sheet cannot be normalized at all, e.g. identity columns are
  /// missing. Non-date extra columns are never an error.
  #[error("missing identity columns: {0}")]
  MissingIdentityColumns(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
