//! Encoding helpers between domain types and the plain-text values stored in
//! SQLite columns. Dates are stored as `%Y-%m-%d` strings, UUIDs as
//! hyphenated lowercase strings.

use chrono::NaiveDate;
use rota_core::record::ScheduleEntry;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_date(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a schedule-table row, canonical or mirror.
pub struct RawEntry {
  pub id:          String,
  pub code:        Option<String>,
  pub agent_name:  Option<String>,
  pub email:       String,
  pub gender:      Option<String>,
  pub batch:       Option<String>,
  pub skill:       Option<String>,
  pub seniority:   Option<String>,
  pub team_leader: Option<String>,
  pub date:        String,
  pub shift:       Option<String>,
}

impl RawEntry {
  /// Read from a row selected with [`SELECT_COLUMNS`](crate::schema::SELECT_COLUMNS).
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      code:        row.get(1)?,
      agent_name:  row.get(2)?,
      email:       row.get(3)?,
      gender:      row.get(4)?,
      batch:       row.get(5)?,
      skill:       row.get(6)?,
      seniority:   row.get(7)?,
      team_leader: row.get(8)?,
      date:        row.get(9)?,
      shift:       row.get(10)?,
    })
  }

  pub fn into_entry(self) -> Result<ScheduleEntry> {
    Ok(ScheduleEntry {
      id:          decode_uuid(&self.id)?,
      code:        self.code,
      agent_name:  self.agent_name,
      email:       self.email,
      gender:      self.gender,
      batch:       self.batch,
      skill:       self.skill,
      seniority:   self.seniority,
      team_leader: self.team_leader,
      date:        decode_date(&self.date)?,
      shift:       self.shift,
    })
  }
}
