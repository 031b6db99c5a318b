//! The spreadsheet normalizer.
//!
//! Converts a wide [`SheetTable`] (one row per agent, one column per calendar
//! date) into a flat sequence of per-agent-per-day [`ShiftRecord`]s. Columns
//! whose headers do not parse as dates are assumed to be metadata and skipped
//! for all rows; they are counted, not errored.

use chrono::{NaiveDate, NaiveDateTime};
use rota_core::record::ShiftRecord;

use crate::{
  SheetTable,
  error::{Error, Result},
};

/// The fixed identity columns; everything else is a candidate date column.
pub const IDENTITY_COLUMNS: [&str; 8] = [
  "Code",
  "Agent Name",
  "Email",
  "Gender",
  "Batch",
  "Skill",
  "Seniority",
  "Team Leader",
];

/// Normalizer output: the flat records plus the headers that were neither
/// identity columns nor parseable dates.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSheet {
  pub records:         Vec<ShiftRecord>,
  pub skipped_columns: Vec<String>,
}

/// Positions of the identity columns within a header row.
struct IdentityIndex {
  code:        usize,
  agent_name:  usize,
  email:       usize,
  gender:      usize,
  batch:       usize,
  skill:       usize,
  seniority:   usize,
  team_leader: usize,
}

impl IdentityIndex {
  fn locate(columns: &[String]) -> Result<Self> {
    let find = |name: &str| columns.iter().position(|c| c == name);

    let missing: Vec<&str> = IDENTITY_COLUMNS
      .iter()
      .filter(|name| find(name).is_none())
      .copied()
      .collect();
    if !missing.is_empty() {
      return Err(Error::MissingIdentityColumns(missing.join(", ")));
    }

    // All present after the check above.
    let must = |name: &str| {
      find(name).ok_or_else(|| Error::MissingIdentityColumns(name.to_owned()))
    };
    Ok(Self {
      code:        must("Code")?,
      agent_name:  must("Agent Name")?,
      email:       must("Email")?,
      gender:      must("Gender")?,
      batch:       must("Batch")?,
      skill:       must("Skill")?,
      seniority:   must("Seniority")?,
      team_leader: must("Team Leader")?,
    })
  }
}

/// Emit one [`ShiftRecord`] per data row × parseable date column, in row
/// order then column order. Blank shift cells become `None`. Missing identity
/// values pass through as `None` (empty string for email); identity is only
/// enforced at the write path.
pub fn normalize(table: &SheetTable) -> Result<NormalizedSheet> {
  let identity = IdentityIndex::locate(&table.columns)?;

  let mut date_columns: Vec<(usize, NaiveDate)> = Vec::new();
  let mut skipped_columns: Vec<String> = Vec::new();
  for (i, header) in table.columns.iter().enumerate() {
    if IDENTITY_COLUMNS.contains(&header.as_str()) {
      continue;
    }
    match parse_header_date(header) {
      Some(date) => date_columns.push((i, date)),
      None => skipped_columns.push(header.clone()),
    }
  }

  let cell = |row: &[Option<String>], i: usize| row.get(i).cloned().flatten();

  let mut records = Vec::with_capacity(table.rows.len() * date_columns.len());
  for row in &table.rows {
    for &(col, date) in &date_columns {
      records.push(ShiftRecord {
        code:        cell(row, identity.code),
        agent_name:  cell(row, identity.agent_name),
        email:       cell(row, identity.email).unwrap_or_default(),
        gender:      cell(row, identity.gender),
        batch:       cell(row, identity.batch),
        skill:       cell(row, identity.skill),
        seniority:   cell(row, identity.seniority),
        team_leader: cell(row, identity.team_leader),
        date,
        shift:       cell(row, col),
      });
    }
  }

  Ok(NormalizedSheet { records, skipped_columns })
}

/// Parse a column header as a calendar date, accepting the textual forms that
/// show up in real exports (ISO, slashed, and datetime-rendered headers).
pub fn parse_header_date(header: &str) -> Option<NaiveDate> {
  const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y"];

  let header = header.trim();
  for format in DATE_FORMATS {
    if let Ok(date) = NaiveDate::parse_from_str(header, format) {
      return Some(date);
    }
  }
  // Date cells rendered with a midnight time component.
  NaiveDateTime::parse_from_str(header, "%Y-%m-%d %H:%M:%S")
    .ok()
    .map(|dt| dt.date())
}
