//! [`SqliteStore`] — the SQLite implementation of [`ScheduleStore`].

use std::{collections::HashSet, path::Path};

use chrono::{Datelike, NaiveDate};
use rota_core::{
  detect::{DuplicateReport, detect_duplicates},
  engine::{self, ScheduleTables, UploadStats},
  record::{ScheduleEntry, ScheduleKey, ShiftRecord},
  store::{
    FilterOptions, LatestView, MonthOption, ScheduleFilter, ScheduleStore,
    SortKey, StoreStats,
  },
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{RawEntry, decode_date, encode_date, encode_uuid},
  schema::{
    CANONICAL_TABLE, MIRROR_TABLE, SELECT_COLUMNS, ensure_mirror_sql, init_sql,
  },
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rota schedule store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Ingestion is
/// transactional per pass: either every canonical/mirror write and the
/// team-leader propagation land, or none do.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> crate::Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> crate::Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(&init_sql())?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Wrap an async-layer database failure in the core error model.
fn db_err(e: tokio_rusqlite::Error) -> rota_core::Error {
  rota_core::Error::Persistence(Box::new(e))
}

/// Wrap a synchronous sqlite failure in the core error model.
fn sql_err(e: rusqlite::Error) -> rota_core::Error {
  rota_core::Error::Persistence(Box::new(e))
}

// ─── Transaction-scoped table adapter ────────────────────────────────────────

/// [`ScheduleTables`] over one open transaction. All engine writes for a pass
/// go through here, so commit/rollback covers the entire pass.
struct TxTables<'a> {
  tx: &'a rusqlite::Transaction<'a>,
}

impl TxTables<'_> {
  fn entry_by_key(
    &self,
    table: &str,
    email: &str,
    date: NaiveDate,
  ) -> rota_core::Result<Option<ScheduleEntry>> {
    let raw: Option<RawEntry> = self
      .tx
      .query_row(
        &format!(
          "SELECT {SELECT_COLUMNS} FROM {table} WHERE email = ?1 AND date = ?2"
        ),
        rusqlite::params![email, encode_date(date)],
        RawEntry::from_row,
      )
      .optional()
      .map_err(sql_err)?;

    raw.map(RawEntry::into_entry).transpose().map_err(Into::into)
  }

  fn insert_entry(&self, table: &str, entry: &ScheduleEntry) -> rota_core::Result<()> {
    self
      .tx
      .execute(
        &format!(
          "INSERT INTO {table} ({SELECT_COLUMNS})
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        rusqlite::params![
          encode_uuid(entry.id),
          entry.code,
          entry.agent_name,
          entry.email,
          entry.gender,
          entry.batch,
          entry.skill,
          entry.seniority,
          entry.team_leader,
          encode_date(entry.date),
          entry.shift,
        ],
      )
      .map_err(sql_err)?;
    Ok(())
  }

  /// Full-row overwrite of all data columns, keeping the surrogate id.
  fn overwrite_row(
    &self,
    table: &str,
    id: Uuid,
    record: &ShiftRecord,
  ) -> rota_core::Result<()> {
    self
      .tx
      .execute(
        &format!(
          "UPDATE {table}
           SET code = ?1, agent_name = ?2, email = ?3, gender = ?4,
               batch = ?5, skill = ?6, seniority = ?7, team_leader = ?8,
               date = ?9, shift = ?10
           WHERE id = ?11"
        ),
        rusqlite::params![
          record.code,
          record.agent_name,
          record.email,
          record.gender,
          record.batch,
          record.skill,
          record.seniority,
          record.team_leader,
          encode_date(record.date),
          record.shift,
          encode_uuid(id),
        ],
      )
      .map_err(sql_err)?;
    Ok(())
  }
}

impl ScheduleTables for TxTables<'_> {
  fn canonical_get(
    &mut self,
    email: &str,
    date: NaiveDate,
  ) -> rota_core::Result<Option<ScheduleEntry>> {
    self.entry_by_key(CANONICAL_TABLE, email, date)
  }

  fn canonical_insert(&mut self, entry: &ScheduleEntry) -> rota_core::Result<()> {
    self.insert_entry(CANONICAL_TABLE, entry)
  }

  fn canonical_update(
    &mut self,
    id: Uuid,
    record: &ShiftRecord,
  ) -> rota_core::Result<()> {
    self.overwrite_row(CANONICAL_TABLE, id, record)
  }

  fn ensure_mirror(&mut self) -> rota_core::Result<()> {
    self.tx.execute_batch(&ensure_mirror_sql()).map_err(sql_err)
  }

  fn mirror_exists(&mut self) -> rota_core::Result<bool> {
    table_exists(self.tx, MIRROR_TABLE).map_err(sql_err)
  }

  fn mirror_get(
    &mut self,
    email: &str,
    date: NaiveDate,
  ) -> rota_core::Result<Option<ScheduleEntry>> {
    self.entry_by_key(MIRROR_TABLE, email, date)
  }

  fn mirror_insert(&mut self, entry: &ScheduleEntry) -> rota_core::Result<()> {
    self.insert_entry(MIRROR_TABLE, entry)
  }

  fn mirror_update(&mut self, id: Uuid, record: &ShiftRecord) -> rota_core::Result<()> {
    self.overwrite_row(MIRROR_TABLE, id, record)
  }

  fn mirror_set_team_leader(
    &mut self,
    email: &str,
    team_leader: &str,
  ) -> rota_core::Result<usize> {
    self
      .tx
      .execute(
        &format!("UPDATE {MIRROR_TABLE} SET team_leader = ?1 WHERE email = ?2"),
        rusqlite::params![team_leader, email],
      )
      .map_err(sql_err)
  }
}

// ─── Connection-level helpers ────────────────────────────────────────────────

fn table_exists(conn: &rusqlite::Connection, table: &str) -> rusqlite::Result<bool> {
  let found: Option<String> = conn
    .query_row(
      "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
      rusqlite::params![table],
      |row| row.get(0),
    )
    .optional()?;
  Ok(found.is_some())
}

/// Run reconcile + propagate over one transaction.
fn run_pass(
  tx: &rusqlite::Transaction<'_>,
  records: &[ShiftRecord],
  overwrite: bool,
) -> rota_core::Result<UploadStats> {
  let mut tables = TxTables { tx };
  let stats = engine::reconcile(&mut tables, records, overwrite)?;
  engine::propagate_team_leader(&mut tables, records)?;
  Ok(stats)
}

/// Filtered, sorted canonical rows. WHERE clause assembled from the filter,
/// parameters in push order.
fn fetch_filtered(
  conn: &rusqlite::Connection,
  filter: &ScheduleFilter,
) -> rusqlite::Result<Vec<RawEntry>> {
  let mut conds: Vec<&'static str> = Vec::new();
  let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

  if let Some(agent) = &filter.agent {
    conds.push("agent_name = ?");
    params.push(Box::new(agent.clone()));
  }
  if let Some(date) = filter.date {
    conds.push("date = ?");
    params.push(Box::new(encode_date(date)));
  }
  if let Some(lead) = &filter.team_leader {
    conds.push("team_leader = ?");
    params.push(Box::new(lead.clone()));
  }
  if let Some(skill) = &filter.skill {
    conds.push("skill = ?");
    params.push(Box::new(skill.clone()));
  }
  if let Some(month) = filter.month {
    conds.push("CAST(strftime('%m', date) AS INTEGER) = ?");
    params.push(Box::new(i64::from(month)));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  let order_clause = match filter.sort {
    SortKey::Shift => "ORDER BY shift, agent_name",
    SortKey::Agent => "ORDER BY agent_name, date",
  };

  let sql = format!(
    "SELECT {SELECT_COLUMNS} FROM {CANONICAL_TABLE} {where_clause} {order_clause}"
  );

  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(rusqlite::params_from_iter(params), RawEntry::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn decode_entries(raws: Vec<RawEntry>) -> rota_core::Result<Vec<ScheduleEntry>> {
  raws
    .into_iter()
    .map(|raw| raw.into_entry().map_err(Into::into))
    .collect()
}

fn sorted_unique(mut values: Vec<String>) -> Vec<String> {
  values.sort();
  values.dedup();
  values
}

fn month_name(month: u32) -> String {
  u8::try_from(month)
    .ok()
    .and_then(|m| chrono::Month::try_from(m).ok())
    .map(|m| m.name().to_owned())
    .unwrap_or_default()
}

// ─── ScheduleStore impl ──────────────────────────────────────────────────────

impl ScheduleStore for SqliteStore {
  // ── Ingestion ─────────────────────────────────────────────────────────────

  async fn ingest(
    &self,
    records: Vec<ShiftRecord>,
    overwrite: bool,
  ) -> rota_core::Result<UploadStats> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Domain errors travel in the inner Result so the rollback is
        // explicit and the error kind survives the async boundary.
        match run_pass(&tx, &records, overwrite) {
          Ok(stats) => {
            tx.commit()?;
            Ok(Ok(stats))
          }
          Err(e) => {
            tx.rollback()?;
            Ok(Err(e))
          }
        }
      })
      .await
      .map_err(db_err)?
  }

  async fn check_duplicates(
    &self,
    records: Vec<ShiftRecord>,
  ) -> rota_core::Result<DuplicateReport> {
    let existing = self.existing_keys().await?;
    Ok(detect_duplicates(&records, &existing))
  }

  async fn existing_keys(&self) -> rota_core::Result<HashSet<ScheduleKey>> {
    let raw: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT email, date FROM {CANONICAL_TABLE}"))?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
      .map_err(db_err)?;

    raw
      .into_iter()
      .map(|(email, date)| Ok((email, decode_date(&date)?)))
      .collect()
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn query(
    &self,
    filter: ScheduleFilter,
  ) -> rota_core::Result<Vec<ScheduleEntry>> {
    let raws = self
      .conn
      .call(move |conn| Ok(fetch_filtered(conn, &filter)?))
      .await
      .map_err(db_err)?;
    decode_entries(raws)
  }

  async fn filter_options(
    &self,
    filter: ScheduleFilter,
  ) -> rota_core::Result<FilterOptions> {
    let entries = self.query(filter).await?;

    let mut dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
    dates.sort();
    dates.dedup();

    let mut month_values: Vec<u32> = dates.iter().map(Datelike::month).collect();
    month_values.sort_unstable();
    month_values.dedup();

    Ok(FilterOptions {
      agents:       sorted_unique(
        entries.iter().filter_map(|e| e.agent_name.clone()).collect(),
      ),
      team_leaders: sorted_unique(
        entries.iter().filter_map(|e| e.team_leader.clone()).collect(),
      ),
      skills:       sorted_unique(
        entries.iter().filter_map(|e| e.skill.clone()).collect(),
      ),
      months:       month_values
        .into_iter()
        .map(|value| MonthOption { value, name: month_name(value) })
        .collect(),
      dates,
    })
  }

  async fn latest(&self, agent: Option<String>) -> rota_core::Result<LatestView> {
    let raw: Option<(Vec<RawEntry>, Vec<String>)> = self
      .conn
      .call(move |conn| {
        if !table_exists(conn, MIRROR_TABLE)? {
          return Ok(None);
        }

        let rows = if let Some(agent) = &agent {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM {MIRROR_TABLE}
             WHERE agent_name = ?1 ORDER BY date"
          ))?;
          stmt
            .query_map(rusqlite::params![agent], RawEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM {MIRROR_TABLE} ORDER BY date"
          ))?;
          stmt
            .query_map([], RawEntry::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut stmt = conn.prepare(&format!(
          "SELECT DISTINCT agent_name FROM {MIRROR_TABLE}
           WHERE agent_name IS NOT NULL ORDER BY agent_name"
        ))?;
        let agents = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;

        Ok(Some((rows, agents)))
      })
      .await
      .map_err(db_err)?;

    match raw {
      Some((rows, agents)) => Ok(LatestView { rows: decode_entries(rows)?, agents }),
      // Mirror never created — an empty view, not an error.
      None => Ok(LatestView::default()),
    }
  }

  async fn stats(&self) -> rota_core::Result<StoreStats> {
    let (agent_count, shift_count): (i64, i64) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          &format!(
            "SELECT COUNT(DISTINCT agent_name), COUNT(id) FROM {CANONICAL_TABLE}"
          ),
          [],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await
      .map_err(db_err)?;

    Ok(StoreStats {
      agent_count: agent_count.max(0) as u64,
      shift_count: shift_count.max(0) as u64,
    })
  }

  // ── Administrative ────────────────────────────────────────────────────────

  async fn delete_latest_by_agent(&self, agent: String) -> rota_core::Result<u64> {
    if agent.trim().is_empty() {
      return Err(rota_core::Error::Validation(
        "agent name is required for deletion".to_owned(),
      ));
    }

    self
      .conn
      .call(move |conn| {
        if !table_exists(conn, MIRROR_TABLE)? {
          return Ok(Err(rota_core::Error::NotFound(format!(
            "table {MIRROR_TABLE} does not exist"
          ))));
        }
        let deleted = conn.execute(
          &format!("DELETE FROM {MIRROR_TABLE} WHERE agent_name = ?1"),
          rusqlite::params![agent],
        )?;
        Ok(Ok(deleted as u64))
      })
      .await
      .map_err(db_err)?
  }
}
