//! Advisory duplicate detection against a prefetched key set.
//!
//! Answers "what would happen" for a candidate upload without touching
//! storage. The key set is fetched once, non-transactionally; it may be stale
//! by the time an actual ingestion runs, and that is accepted.

use std::collections::HashSet;

use serde::Serialize;

use crate::record::{ScheduleKey, ShiftRecord};

/// The result of a duplicate check, field names matching the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateReport {
  pub total_records:   usize,
  pub duplicates:      usize,
  pub new_records:     usize,
  /// The literal (email, date) pairs already present, for display.
  pub duplicate_pairs: Vec<ScheduleKey>,
}

/// Classify each record as new or duplicate. A record is a duplicate iff its
/// (email, date) pair is already in `existing_keys`.
pub fn detect_duplicates(
  records: &[ShiftRecord],
  existing_keys: &HashSet<ScheduleKey>,
) -> DuplicateReport {
  let duplicate_pairs: Vec<ScheduleKey> = records
    .iter()
    .map(ShiftRecord::key)
    .filter(|key| existing_keys.contains(key))
    .collect();

  DuplicateReport {
    total_records: records.len(),
    duplicates:    duplicate_pairs.len(),
    new_records:   records.len() - duplicate_pairs.len(),
    duplicate_pairs,
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn record(email: &str, day: u32) -> ShiftRecord {
    ShiftRecord {
      code:        None,
      agent_name:  None,
      email:       email.into(),
      gender:      None,
      batch:       None,
      skill:       None,
      seniority:   None,
      team_leader: None,
      date:        NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
      shift:       Some("AM".into()),
    }
  }

  #[test]
  fn classifies_against_existing_keys() {
    let records = vec![record("a@x.com", 1), record("a@x.com", 2), record("b@x.com", 1)];
    let existing: HashSet<ScheduleKey> =
      [record("a@x.com", 1).key(), record("c@x.com", 9).key()].into();

    let report = detect_duplicates(&records, &existing);

    assert_eq!(report.total_records, 3);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.new_records, 2);
    assert_eq!(report.duplicate_pairs, vec![record("a@x.com", 1).key()]);
  }

  #[test]
  fn empty_store_means_everything_is_new() {
    let records = vec![record("a@x.com", 1), record("b@x.com", 1)];
    let report = detect_duplicates(&records, &HashSet::new());

    assert_eq!(report.duplicates, 0);
    assert_eq!(report.new_records, 2);
    assert!(report.duplicate_pairs.is_empty());
  }

  #[test]
  fn duplicate_pairs_preserve_input_order() {
    let records = vec![record("b@x.com", 2), record("a@x.com", 1)];
    let existing: HashSet<ScheduleKey> =
      records.iter().map(ShiftRecord::key).collect();

    let report = detect_duplicates(&records, &existing);
    assert_eq!(
      report.duplicate_pairs,
      vec![record("b@x.com", 2).key(), record("a@x.com", 1).key()]
    );
  }
}
