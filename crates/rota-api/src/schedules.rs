//! Handlers for the canonical-table read endpoints.
//!
//! Query params map directly to [`ScheduleFilter`] fields; all are optional.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use rota_core::{
  record::ScheduleEntry,
  store::{FilterOptions, ScheduleFilter, ScheduleStore, SortKey, StoreStats},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleParams {
  pub agent:       Option<String>,
  pub date:        Option<NaiveDate>,
  pub team_leader: Option<String>,
  pub skill:       Option<String>,
  /// Calendar month 1–12.
  pub month:       Option<u32>,
  #[serde(default)]
  pub sort:        SortKey,
}

impl From<ScheduleParams> for ScheduleFilter {
  fn from(p: ScheduleParams) -> Self {
    ScheduleFilter {
      agent:       p.agent,
      date:        p.date,
      team_leader: p.team_leader,
      skill:       p.skill,
      month:       p.month,
      sort:        p.sort,
    }
  }
}

/// `GET /schedules[?agent=...][&date=...][&team_leader=...][&skill=...][&month=...][&sort=agent|shift]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ScheduleParams>,
) -> Result<Json<Vec<ScheduleEntry>>, ApiError>
where
  S: ScheduleStore,
{
  let rows = store.query(params.into()).await?;
  Ok(Json(rows))
}

/// `GET /schedules/options` — distinct filter values for the matching rows.
pub async fn options<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ScheduleParams>,
) -> Result<Json<FilterOptions>, ApiError>
where
  S: ScheduleStore,
{
  let options = store.filter_options(params.into()).await?;
  Ok(Json(options))
}

/// `GET /stats` — headline agent/shift counts.
pub async fn stats<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<StoreStats>, ApiError>
where
  S: ScheduleStore,
{
  Ok(Json(store.stats().await?))
}
