//! Static schema descriptor for both schedule tables.
//!
//! The canonical `schedules` table and the mirror `schedules_update` table
//! share one build-time column list, so mirror creation never reflects on the
//! live database. Drift can only come from out-of-band DDL and is not
//! handled.

pub const CANONICAL_TABLE: &str = "schedules";
pub const MIRROR_TABLE: &str = "schedules_update";

/// Ordered (name, type) column descriptor shared by both tables.
pub const SCHEDULE_COLUMNS: &[(&str, &str)] = &[
  ("id", "TEXT PRIMARY KEY"),
  ("code", "TEXT"),
  ("agent_name", "TEXT"),
  ("email", "TEXT NOT NULL"),
  ("gender", "TEXT"),
  ("batch", "TEXT"),
  ("skill", "TEXT"),
  ("seniority", "TEXT"),
  ("team_leader", "TEXT"),
  ("date", "TEXT NOT NULL"), // "%Y-%m-%d"
  ("shift", "TEXT"),
];

/// Comma-separated column names for SELECT/INSERT statements, in descriptor
/// order.
pub const SELECT_COLUMNS: &str =
  "id, code, agent_name, email, gender, batch, skill, seniority, team_leader, \
   date, shift";

/// `CREATE TABLE IF NOT EXISTS` DDL for `table` from the descriptor.
/// Idempotent; used for the canonical table at startup and lazily for the
/// mirror on first ingest.
pub fn create_table_sql(table: &str) -> String {
  let columns = SCHEDULE_COLUMNS
    .iter()
    .map(|(name, ty)| format!("    {name} {ty}"))
    .collect::<Vec<_>>()
    .join(",\n");
  format!("CREATE TABLE IF NOT EXISTS {table} (\n{columns}\n);")
}

/// Startup DDL: pragmas, the canonical table, and its lookup indexes.
pub fn init_sql() -> String {
  format!(
    "PRAGMA journal_mode = WAL;\n\
     PRAGMA foreign_keys = ON;\n\
     {}\n\
     CREATE INDEX IF NOT EXISTS schedules_agent_idx ON {t}(agent_name);\n\
     CREATE INDEX IF NOT EXISTS schedules_key_idx   ON {t}(email, date);\n",
    create_table_sql(CANONICAL_TABLE),
    t = CANONICAL_TABLE,
  )
}

/// DDL run by `ensure_mirror`: the mirror table plus its identity-key index.
pub fn ensure_mirror_sql() -> String {
  format!(
    "{}\n\
     CREATE INDEX IF NOT EXISTS schedules_update_key_idx ON {t}(email, date);\n",
    create_table_sql(MIRROR_TABLE),
    t = MIRROR_TABLE,
  )
}
