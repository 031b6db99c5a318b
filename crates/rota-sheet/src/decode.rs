//! xlsx → [`SheetTable`] decoding via calamine.
//!
//! The first row of the first worksheet is taken as the header row. Cells are
//! coerced to strings up front; the normalizer never sees calamine types.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::{
  SheetTable,
  error::{Error, Result},
};

/// Decode an xlsx workbook (as uploaded bytes) into a [`SheetTable`].
pub fn decode_xlsx(bytes: &[u8]) -> Result<SheetTable> {
  let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
    .map_err(|e| Error::Workbook(e.to_string()))?;

  let sheet_name = workbook
    .sheet_names()
    .first()
    .ok_or(Error::NoSheets)?
    .clone();

  let range = workbook
    .worksheet_range(&sheet_name)
    .map_err(|e| Error::Workbook(e.to_string()))?;

  let mut rows_iter = range.rows();
  let header_row = rows_iter.next().ok_or(Error::EmptySheet)?;

  let columns: Vec<String> = header_row
    .iter()
    .map(|c| cell_to_string(c).unwrap_or_default())
    .collect();

  let rows: Vec<Vec<Option<String>>> = rows_iter
    .map(|row| {
      // Pad short rows so every record row lines up with the header.
      (0..columns.len())
        .map(|i| row.get(i).and_then(cell_to_string))
        .collect()
    })
    .collect();

  Ok(SheetTable { columns, rows })
}

/// Coerce a cell to its textual value; blank cells become `None`.
fn cell_to_string(cell: &Data) -> Option<String> {
  match cell {
    Data::Empty => None,
    Data::String(s) => {
      let s = s.trim();
      if s.is_empty() { None } else { Some(s.to_owned()) }
    }
    Data::Int(i) => Some(i.to_string()),
    Data::Float(f) => {
      // Excel stores integers as floats; keep "3" rather than "3.0".
      if f.fract() == 0.0 {
        Some((*f as i64).to_string())
      } else {
        Some(f.to_string())
      }
    }
    Data::Bool(b) => Some(b.to_string()),
    Data::DateTime(dt) => dt.as_datetime().map(|ndt| {
      if ndt.time() == chrono::NaiveTime::MIN {
        ndt.date().format("%Y-%m-%d").to_string()
      } else {
        ndt.format("%Y-%m-%d %H:%M:%S").to_string()
      }
    }),
    Data::DateTimeIso(s) => Some(s.clone()),
    Data::DurationIso(s) => Some(s.clone()),
    Data::Error(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use rust_xlsxwriter::Workbook;

  use super::*;

  fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
      for (c, value) in row.iter().enumerate() {
        if !value.is_empty() {
          worksheet
            .write_string(r as u32, c as u16, *value)
            .unwrap();
        }
      }
    }
    workbook.save_to_buffer().unwrap()
  }

  #[test]
  fn decodes_headers_and_rows() {
    let bytes = workbook_bytes(&[
      &["Code", "Email", "2024-01-01"],
      &["A1", "a@x.com", "AM"],
      &["A2", "b@x.com", ""],
    ]);

    let table = decode_xlsx(&bytes).unwrap();
    assert_eq!(table.columns, vec!["Code", "Email", "2024-01-01"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][1].as_deref(), Some("a@x.com"));
    // Blank cell decodes to None, not an empty string.
    assert_eq!(table.rows[1][2], None);
  }

  #[test]
  fn rejects_garbage_bytes() {
    let err = decode_xlsx(b"not an xlsx file").unwrap_err();
    assert!(matches!(err, Error::Workbook(_)));
  }
}
