//! Handlers for the mirror-table ("latest upload") endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use rota_core::store::{LatestView, ScheduleStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct LatestParams {
  pub agent: Option<String>,
}

/// `GET /latest[?agent=...]` — rows from the always-freshest mirror table
/// plus the distinct agent list. Empty view if no upload has happened yet.
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<LatestParams>,
) -> Result<Json<LatestView>, ApiError>
where
  S: ScheduleStore,
{
  let view = store.latest(params.agent).await?;
  Ok(Json(view))
}

#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
  pub message: String,
  pub deleted: u64,
}

/// `DELETE /latest?agent=NAME` — administrative bulk delete of mirror rows
/// by agent name. 400 on a missing/empty name, 404 if the mirror table does
/// not exist yet.
pub async fn delete_by_agent<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<LatestParams>,
) -> Result<Json<DeleteOutcome>, ApiError>
where
  S: ScheduleStore,
{
  // Empty-name validation happens in the store so every backend enforces it.
  let agent = params.agent.unwrap_or_default();
  let deleted = store.delete_latest_by_agent(agent.clone()).await?;

  Ok(Json(DeleteOutcome {
    message: format!("Deleted {deleted} records for agent '{agent}'"),
    deleted,
  }))
}
