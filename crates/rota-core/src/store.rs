//! The `ScheduleStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `rota-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::{collections::HashSet, future::Future};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  detect::DuplicateReport,
  engine::UploadStats,
  error::Result,
  record::{ScheduleEntry, ScheduleKey, ShiftRecord},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Sort order for [`ScheduleStore::query`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
  /// Agent name, then date.
  #[default]
  Agent,
  /// Shift, then agent name.
  Shift,
}

/// Equality and month filters over the canonical table. All fields optional;
/// an empty filter returns everything.
#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
  pub agent:       Option<String>,
  pub date:        Option<NaiveDate>,
  pub team_leader: Option<String>,
  pub skill:       Option<String>,
  /// Calendar month 1–12, matched against the date column.
  pub month:       Option<u32>,
  pub sort:        SortKey,
}

/// A month that occurs in a filtered row set, with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOption {
  pub value: u32,
  pub name:  String,
}

/// Distinct values available for each filter, derived from a filtered row
/// set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterOptions {
  pub agents:       Vec<String>,
  pub dates:        Vec<NaiveDate>,
  pub team_leaders: Vec<String>,
  pub skills:       Vec<String>,
  pub months:       Vec<MonthOption>,
}

/// The mirror-table view: rows (optionally filtered by agent) plus the
/// distinct agent list for the filter dropdown. Both empty if the mirror
/// table has not been created yet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LatestView {
  pub rows:   Vec<ScheduleEntry>,
  pub agents: Vec<String>,
}

/// Headline counts over the canonical table.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StoreStats {
  pub agent_count: u64,
  pub shift_count: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Rota schedule store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (tokio with axum). Every backend speaks
/// [`crate::Error`], so the API layer can map error kinds to HTTP statuses
/// without knowing the backend.
pub trait ScheduleStore: Send + Sync {
  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Run one reconciliation pass: canonical/mirror upsert followed by
  /// team-leader propagation, atomically. On any error nothing is applied.
  fn ingest(
    &self,
    records: Vec<ShiftRecord>,
    overwrite: bool,
  ) -> impl Future<Output = Result<UploadStats>> + Send + '_;

  /// Advisory duplicate check. Performs no writes.
  fn check_duplicates(
    &self,
    records: Vec<ShiftRecord>,
  ) -> impl Future<Output = Result<DuplicateReport>> + Send + '_;

  /// The full set of (email, date) keys currently in the canonical table.
  /// Non-transactional snapshot; may be stale against concurrent writers.
  fn existing_keys(
    &self,
  ) -> impl Future<Output = Result<HashSet<ScheduleKey>>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Filtered, sorted canonical rows.
  fn query(
    &self,
    filter: ScheduleFilter,
  ) -> impl Future<Output = Result<Vec<ScheduleEntry>>> + Send + '_;

  /// Distinct filter options for the rows matching `filter`.
  fn filter_options(
    &self,
    filter: ScheduleFilter,
  ) -> impl Future<Output = Result<FilterOptions>> + Send + '_;

  /// Mirror-table view, optionally restricted to one agent.
  fn latest(
    &self,
    agent: Option<String>,
  ) -> impl Future<Output = Result<LatestView>> + Send + '_;

  /// Headline counts for the dashboard.
  fn stats(&self) -> impl Future<Output = Result<StoreStats>> + Send + '_;

  // ── Administrative ────────────────────────────────────────────────────

  /// Delete all mirror rows for `agent`, returning the number removed.
  /// Fails with [`Error::Validation`](crate::Error::Validation) on an empty
  /// name and [`Error::NotFound`](crate::Error::NotFound) if the mirror
  /// table does not exist.
  fn delete_latest_by_agent(
    &self,
    agent: String,
  ) -> impl Future<Output = Result<u64>> + Send + '_;
}
