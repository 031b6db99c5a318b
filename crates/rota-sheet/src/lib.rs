//! Spreadsheet handling for Rota.
//!
//! Two stages, both side-effect free:
//!
//!   xlsx bytes
//!     └─ [`decode::decode_xlsx`]      → [`SheetTable`] (headers + cell strings)
//!          └─ [`normalize::normalize`] → [`NormalizedSheet`] (flat `ShiftRecord`s)
//!
//! The decoder is the only place calamine appears; everything downstream
//! works on plain strings so the normalizer can be tested without workbook
//! fixtures.

pub mod decode;
pub mod error;
pub mod normalize;

pub use decode::decode_xlsx;
pub use error::{Error, Result};
pub use normalize::{NormalizedSheet, normalize};

/// A decoded worksheet: one header row and the data rows beneath it.
/// A `None` cell was blank in the source.
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
  pub columns: Vec<String>,
  pub rows:    Vec<Vec<Option<String>>>,
}
