//! The reconciliation engine and team-leader propagator.
//!
//! Both operate through [`ScheduleTables`], a synchronous key-value-style view
//! of the two persisted tables. The storage backend provides an implementation
//! scoped to a single transaction, so one ingestion pass (reconcile followed
//! by propagate) is all-or-nothing: any error here aborts the pass and the
//! caller rolls back every write.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::Result,
  record::{ScheduleEntry, ShiftRecord},
};

// ─── Table abstraction ───────────────────────────────────────────────────────

/// Logical operations against the canonical `schedules` table and the mirror
/// `schedules_update` table. No SQL dialect or wire format leaks through this
/// trait.
///
/// Implementations map storage failures to
/// [`Error::Persistence`](crate::Error::Persistence) and never swallow them.
pub trait ScheduleTables {
  // ── Canonical table ───────────────────────────────────────────────────

  fn canonical_get(
    &mut self,
    email: &str,
    date: NaiveDate,
  ) -> Result<Option<ScheduleEntry>>;

  fn canonical_insert(&mut self, entry: &ScheduleEntry) -> Result<()>;

  /// Full-row overwrite of the row with surrogate id `id`.
  fn canonical_update(&mut self, id: Uuid, record: &ShiftRecord) -> Result<()>;

  // ── Mirror table ──────────────────────────────────────────────────────

  /// Create the mirror table from the canonical schema descriptor if it does
  /// not exist yet. Idempotent; called before any row operation.
  fn ensure_mirror(&mut self) -> Result<()>;

  /// `true` if the mirror table exists. Used by the propagator, which must
  /// no-op rather than create the table.
  fn mirror_exists(&mut self) -> Result<bool>;

  fn mirror_get(
    &mut self,
    email: &str,
    date: NaiveDate,
  ) -> Result<Option<ScheduleEntry>>;

  fn mirror_insert(&mut self, entry: &ScheduleEntry) -> Result<()>;

  fn mirror_update(&mut self, id: Uuid, record: &ShiftRecord) -> Result<()>;

  /// Rewrite `team_leader` on every mirror row with this email, across all
  /// historical dates. Returns the number of rows touched.
  fn mirror_set_team_leader(
    &mut self,
    email: &str,
    team_leader: &str,
  ) -> Result<usize>;
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Per-pass operation counts for the canonical table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertStats {
  pub added:   u64,
  pub updated: u64,
  pub skipped: u64,
}

/// Per-pass operation counts for the mirror table. No skipped bucket — the
/// mirror always overwrites on match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorStats {
  pub added:   u64,
  pub updated: u64,
}

/// Combined stats for one ingestion pass. Field names match the table names
/// on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStats {
  pub schedules:        UpsertStats,
  pub schedules_update: MirrorStats,
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// Apply `records` to both tables.
///
/// Canonical table: insert when the (email, date) key is new; on match,
/// overwrite every field when `overwrite` is set, otherwise leave the row
/// untouched and count it as skipped. Rows are never deleted here.
///
/// Mirror table: last write wins unconditionally, regardless of `overwrite`.
/// The table itself is created on first use from the static schema
/// descriptor.
pub fn reconcile<T: ScheduleTables>(
  tables: &mut T,
  records: &[ShiftRecord],
  overwrite: bool,
) -> Result<UploadStats> {
  tables.ensure_mirror()?;

  let mut stats = UploadStats::default();

  for record in records {
    // Validates the identity key; an unusable record aborts the whole pass.
    let entry = ScheduleEntry::from_record(record)?;

    match tables.canonical_get(&record.email, record.date)? {
      Some(existing) => {
        if overwrite {
          tables.canonical_update(existing.id, record)?;
          stats.schedules.updated += 1;
        } else {
          stats.schedules.skipped += 1;
        }
      }
      None => {
        tables.canonical_insert(&entry)?;
        stats.schedules.added += 1;
      }
    }

    match tables.mirror_get(&record.email, record.date)? {
      Some(existing) => {
        tables.mirror_update(existing.id, record)?;
        stats.schedules_update.updated += 1;
      }
      None => {
        // Fresh surrogate id for the mirror row; the canonical id is not
        // shared across tables.
        let mirror_entry = ScheduleEntry::from_record(record)?;
        tables.mirror_insert(&mirror_entry)?;
        stats.schedules_update.added += 1;
      }
    }
  }

  Ok(stats)
}

// ─── Team-leader propagation ─────────────────────────────────────────────────

/// Re-apply the most recent team leader per email across *all* mirror rows,
/// not just the ones ingested in this pass.
///
/// Only records with a non-empty email and a non-empty team leader
/// participate; when a batch carries several leaders for one email, the later
/// record in input order wins. No-op if the mirror table does not exist.
pub fn propagate_team_leader<T: ScheduleTables>(
  tables: &mut T,
  records: &[ShiftRecord],
) -> Result<()> {
  if !tables.mirror_exists()? {
    return Ok(());
  }

  let mut email_to_leader: HashMap<String, String> = HashMap::new();
  for record in records {
    if record.email.trim().is_empty() {
      continue;
    }
    if let Some(leader) = record
      .team_leader
      .as_deref()
      .filter(|l| !l.trim().is_empty())
    {
      email_to_leader.insert(record.email.clone(), leader.to_owned());
    }
  }

  for (email, leader) in &email_to_leader {
    tables.mirror_set_team_leader(email, leader)?;
  }

  Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
