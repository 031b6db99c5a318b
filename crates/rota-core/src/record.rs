//! Schedule records — the transient normalizer output and the persisted row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// The (email, date) pair used to match incoming records against stored rows.
/// Never the surrogate id.
pub type ScheduleKey = (String, NaiveDate);

/// One agent-day cell of the source spreadsheet, as produced by the
/// normalizer. Identity-column values null-propagate; nothing is validated
/// until the record reaches the write path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
  pub code:        Option<String>,
  pub agent_name:  Option<String>,
  /// May be empty if the spreadsheet cell was blank. Enforced non-empty by
  /// [`ScheduleEntry::from_record`] before any write.
  pub email:       String,
  pub gender:      Option<String>,
  pub batch:       Option<String>,
  pub skill:       Option<String>,
  pub seniority:   Option<String>,
  pub team_leader: Option<String>,
  pub date:        NaiveDate,
  /// `None` means no shift that day (blank cell), distinct from an empty
  /// string.
  pub shift:       Option<String>,
}

impl ShiftRecord {
  /// The identity key of this record.
  pub fn key(&self) -> ScheduleKey {
    (self.email.clone(), self.date)
  }
}

/// A persisted schedule row. Both the canonical `schedules` table and the
/// mirror `schedules_update` table share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
  pub id:          Uuid,
  pub code:        Option<String>,
  pub agent_name:  Option<String>,
  pub email:       String,
  pub gender:      Option<String>,
  pub batch:       Option<String>,
  pub skill:       Option<String>,
  pub seniority:   Option<String>,
  pub team_leader: Option<String>,
  pub date:        NaiveDate,
  pub shift:       Option<String>,
}

impl ScheduleEntry {
  /// Build a new entry (fresh surrogate id) from a normalized record,
  /// validating that the identity key is usable.
  pub fn from_record(record: &ShiftRecord) -> Result<Self> {
    if record.email.trim().is_empty() {
      return Err(Error::Validation(format!(
        "record for {} has no email; cannot form an identity key",
        record.date
      )));
    }
    Ok(Self {
      id:          Uuid::new_v4(),
      code:        record.code.clone(),
      agent_name:  record.agent_name.clone(),
      email:       record.email.clone(),
      gender:      record.gender.clone(),
      batch:       record.batch.clone(),
      skill:       record.skill.clone(),
      seniority:   record.seniority.clone(),
      team_leader: record.team_leader.clone(),
      date:        record.date,
      shift:       record.shift.clone(),
    })
  }

  /// Replace every data field with the incoming record's values, keeping the
  /// surrogate id. Full-row overwrite, not a merge.
  pub fn overwrite_with(&mut self, record: &ShiftRecord) {
    self.code = record.code.clone();
    self.agent_name = record.agent_name.clone();
    self.email = record.email.clone();
    self.gender = record.gender.clone();
    self.batch = record.batch.clone();
    self.skill = record.skill.clone();
    self.seniority = record.seniority.clone();
    self.team_leader = record.team_leader.clone();
    self.date = record.date;
    self.shift = record.shift.clone();
  }
}
