//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use rota_core::{
  engine::{MirrorStats, UpsertStats},
  record::ShiftRecord,
  store::{ScheduleFilter, ScheduleStore, SortKey},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn day(d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn record(
  agent: &str,
  email: &str,
  d: u32,
  shift: Option<&str>,
  leader: Option<&str>,
) -> ShiftRecord {
  ShiftRecord {
    code:        Some("C1".into()),
    agent_name:  Some(agent.into()),
    email:       email.into(),
    gender:      None,
    batch:       Some("B7".into()),
    skill:       Some("Voice".into()),
    seniority:   None,
    team_leader: leader.map(Into::into),
    date:        day(d),
    shift:       shift.map(Into::into),
  }
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_upload_adds_everywhere() {
  let s = store().await;
  let records = vec![
    record("Alice", "a@x.com", 1, Some("AM"), Some("Carol")),
    record("Alice", "a@x.com", 2, Some("PM"), Some("Carol")),
    record("Bob", "b@x.com", 1, Some("AM"), None),
  ];

  let stats = s.ingest(records, false).await.unwrap();

  assert_eq!(stats.schedules, UpsertStats { added: 3, updated: 0, skipped: 0 });
  assert_eq!(stats.schedules_update, MirrorStats { added: 3, updated: 0 });
}

#[tokio::test]
async fn reupload_without_overwrite_is_idempotent_on_canonical() {
  let s = store().await;
  let records = vec![
    record("Alice", "a@x.com", 1, Some("AM"), None),
    record("Bob", "b@x.com", 1, Some("PM"), None),
  ];

  s.ingest(records.clone(), false).await.unwrap();
  let stats = s.ingest(records, false).await.unwrap();

  assert_eq!(stats.schedules, UpsertStats { added: 0, updated: 0, skipped: 2 });
  // The mirror still takes every record, both times.
  assert_eq!(stats.schedules_update, MirrorStats { added: 0, updated: 2 });

  let rows = s.query(ScheduleFilter::default()).await.unwrap();
  assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn overwrite_replaces_the_single_canonical_row() {
  let s = store().await;
  s.ingest(vec![record("Alice", "a@x.com", 1, Some("AM"), None)], false)
    .await
    .unwrap();

  let stats = s
    .ingest(vec![record("Alice", "a@x.com", 1, Some("PM"), None)], true)
    .await
    .unwrap();
  assert_eq!(stats.schedules, UpsertStats { added: 0, updated: 1, skipped: 0 });

  let rows = s.query(ScheduleFilter::default()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].email, "a@x.com");
  assert_eq!(rows[0].shift.as_deref(), Some("PM"));
}

#[tokio::test]
async fn skip_policy_preserves_canonical_while_mirror_tracks_latest() {
  let s = store().await;
  s.ingest(vec![record("Alice", "a@x.com", 1, Some("AM"), None)], false)
    .await
    .unwrap();
  s.ingest(vec![record("Alice", "a@x.com", 1, Some("PM"), None)], false)
    .await
    .unwrap();

  let canonical = s.query(ScheduleFilter::default()).await.unwrap();
  assert_eq!(canonical[0].shift.as_deref(), Some("AM"));

  let latest = s.latest(None).await.unwrap();
  assert_eq!(latest.rows.len(), 1);
  assert_eq!(latest.rows[0].shift.as_deref(), Some("PM"));
}

#[tokio::test]
async fn record_without_email_rolls_back_the_whole_pass() {
  let s = store().await;
  let records = vec![
    record("Alice", "a@x.com", 1, Some("AM"), None),
    record("Ghost", "", 2, Some("PM"), None),
  ];

  let err = s.ingest(records, false).await.unwrap_err();
  assert!(matches!(err, rota_core::Error::Validation(_)));

  // Nothing landed in either table — whole-batch atomicity.
  assert!(s.query(ScheduleFilter::default()).await.unwrap().is_empty());
  assert!(s.latest(None).await.unwrap().rows.is_empty());
}

#[tokio::test]
async fn blank_shift_survives_as_null() {
  let s = store().await;
  s.ingest(vec![record("Alice", "a@x.com", 1, None, None)], false)
    .await
    .unwrap();

  let rows = s.query(ScheduleFilter::default()).await.unwrap();
  assert_eq!(rows[0].shift, None);
}

// ─── Team-leader propagation ─────────────────────────────────────────────────

#[tokio::test]
async fn new_leader_rewrites_all_historical_mirror_rows() {
  let s = store().await;
  let history = vec![
    record("Alice", "agent@x.com", 1, Some("AM"), Some("Alice")),
    record("Alice", "agent@x.com", 2, Some("AM"), Some("Alice")),
    record("Alice", "agent@x.com", 3, Some("AM"), Some("Alice")),
  ];
  s.ingest(history, false).await.unwrap();

  s.ingest(
    vec![record("Alice", "agent@x.com", 4, Some("PM"), Some("Bob"))],
    false,
  )
  .await
  .unwrap();

  let latest = s.latest(None).await.unwrap();
  assert_eq!(latest.rows.len(), 4);
  assert!(
    latest
      .rows
      .iter()
      .all(|r| r.team_leader.as_deref() == Some("Bob"))
  );
}

#[tokio::test]
async fn propagation_only_touches_matching_email() {
  let s = store().await;
  s.ingest(
    vec![
      record("Alice", "a@x.com", 1, Some("AM"), Some("Alice")),
      record("Bob", "b@x.com", 1, Some("AM"), Some("Alice")),
    ],
    false,
  )
  .await
  .unwrap();

  s.ingest(
    vec![record("Alice", "a@x.com", 2, Some("AM"), Some("Bob"))],
    false,
  )
  .await
  .unwrap();

  let latest = s.latest(None).await.unwrap();
  let leader_of = |email: &str| {
    latest
      .rows
      .iter()
      .find(|r| r.email == email)
      .and_then(|r| r.team_leader.clone())
  };
  assert_eq!(leader_of("a@x.com").as_deref(), Some("Bob"));
  assert_eq!(leader_of("b@x.com").as_deref(), Some("Alice"));
}

// ─── Duplicate check ─────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_check_classifies_against_canonical_keys() {
  let s = store().await;
  s.ingest(vec![record("Alice", "a@x.com", 1, Some("AM"), None)], false)
    .await
    .unwrap();

  let report = s
    .check_duplicates(vec![
      record("Alice", "a@x.com", 1, Some("PM"), None),
      record("Alice", "a@x.com", 2, Some("PM"), None),
    ])
    .await
    .unwrap();

  assert_eq!(report.total_records, 2);
  assert_eq!(report.duplicates, 1);
  assert_eq!(report.new_records, 1);
  assert_eq!(report.duplicate_pairs, vec![("a@x.com".to_owned(), day(1))]);
}

#[tokio::test]
async fn duplicate_check_never_writes() {
  let s = store().await;
  s.ingest(vec![record("Alice", "a@x.com", 1, Some("AM"), None)], false)
    .await
    .unwrap();

  let canonical_before = s.query(ScheduleFilter::default()).await.unwrap();
  let latest_before = s.latest(None).await.unwrap();

  s.check_duplicates(vec![
    record("Alice", "a@x.com", 1, Some("XX"), Some("Nobody")),
    record("New", "new@x.com", 9, Some("AM"), None),
  ])
  .await
  .unwrap();

  // Snapshot equality on both tables.
  assert_eq!(s.query(ScheduleFilter::default()).await.unwrap(), canonical_before);
  assert_eq!(s.latest(None).await.unwrap().rows, latest_before.rows);
}

// ─── Query side ──────────────────────────────────────────────────────────────

async fn seed_query_fixture(s: &SqliteStore) {
  s.ingest(
    vec![
      record("Alice", "a@x.com", 1, Some("AM"), Some("Carol")),
      record("Alice", "a@x.com", 15, Some("PM"), Some("Carol")),
      record("Bob", "b@x.com", 1, Some("PM"), Some("Dave")),
      ShiftRecord {
        date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        ..record("Bob", "b@x.com", 1, Some("AM"), Some("Dave"))
      },
    ],
    false,
  )
  .await
  .unwrap();
}

#[tokio::test]
async fn query_filters_by_agent_and_date() {
  let s = store().await;
  seed_query_fixture(&s).await;

  let by_agent = s
    .query(ScheduleFilter { agent: Some("Alice".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_agent.len(), 2);
  assert!(by_agent.iter().all(|r| r.agent_name.as_deref() == Some("Alice")));

  let by_date = s
    .query(ScheduleFilter { date: Some(day(1)), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_date.len(), 2);
}

#[tokio::test]
async fn query_filters_by_month() {
  let s = store().await;
  seed_query_fixture(&s).await;

  let feb = s
    .query(ScheduleFilter { month: Some(2), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(feb.len(), 1);
  assert_eq!(feb[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
}

#[tokio::test]
async fn query_sort_by_shift_orders_shift_first() {
  let s = store().await;
  seed_query_fixture(&s).await;

  let rows = s
    .query(ScheduleFilter {
      date: Some(day(1)),
      sort: SortKey::Shift,
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].shift.as_deref(), Some("AM"));
  assert_eq!(rows[1].shift.as_deref(), Some("PM"));
}

#[tokio::test]
async fn filter_options_cover_the_filtered_rows() {
  let s = store().await;
  seed_query_fixture(&s).await;

  let options = s.filter_options(ScheduleFilter::default()).await.unwrap();
  assert_eq!(options.agents, vec!["Alice".to_owned(), "Bob".to_owned()]);
  assert_eq!(options.team_leaders, vec!["Carol".to_owned(), "Dave".to_owned()]);
  assert_eq!(options.skills, vec!["Voice".to_owned()]);
  assert_eq!(options.dates.len(), 3);

  let months: Vec<(u32, &str)> = options
    .months
    .iter()
    .map(|m| (m.value, m.name.as_str()))
    .collect();
  assert_eq!(months, vec![(1, "January"), (2, "February")]);
}

#[tokio::test]
async fn stats_count_distinct_agents_and_rows() {
  let s = store().await;
  seed_query_fixture(&s).await;

  let stats = s.stats().await.unwrap();
  assert_eq!(stats.agent_count, 2);
  assert_eq!(stats.shift_count, 4);
}

// ─── Latest view and administrative delete ───────────────────────────────────

#[tokio::test]
async fn latest_view_is_empty_before_any_ingest() {
  let s = store().await;
  let view = s.latest(None).await.unwrap();
  assert!(view.rows.is_empty());
  assert!(view.agents.is_empty());
}

#[tokio::test]
async fn latest_view_filters_by_agent_but_lists_all_agents() {
  let s = store().await;
  seed_query_fixture(&s).await;

  let view = s.latest(Some("Bob".into())).await.unwrap();
  assert_eq!(view.rows.len(), 2);
  assert!(view.rows.iter().all(|r| r.agent_name.as_deref() == Some("Bob")));
  assert_eq!(view.agents, vec!["Alice".to_owned(), "Bob".to_owned()]);
}

#[tokio::test]
async fn delete_latest_by_agent_removes_only_that_agent() {
  let s = store().await;
  seed_query_fixture(&s).await;

  let deleted = s.delete_latest_by_agent("Alice".into()).await.unwrap();
  assert_eq!(deleted, 2);

  let view = s.latest(None).await.unwrap();
  assert_eq!(view.rows.len(), 2);
  assert!(view.rows.iter().all(|r| r.agent_name.as_deref() == Some("Bob")));
  // Canonical table untouched by the mirror delete.
  assert_eq!(s.query(ScheduleFilter::default()).await.unwrap().len(), 4);
}

#[tokio::test]
async fn delete_with_empty_agent_is_a_validation_error() {
  let s = store().await;
  seed_query_fixture(&s).await;

  let err = s.delete_latest_by_agent("  ".into()).await.unwrap_err();
  assert!(matches!(err, rota_core::Error::Validation(_)));
}

#[tokio::test]
async fn delete_without_mirror_table_is_not_found() {
  let s = store().await;
  let err = s.delete_latest_by_agent("Alice".into()).await.unwrap_err();
  assert!(matches!(err, rota_core::Error::NotFound(_)));
}
