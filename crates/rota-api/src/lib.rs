//! JSON REST API for Rota.
//!
//! Exposes an axum [`Router`] backed by any [`rota_core::store::ScheduleStore`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", rota_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod ingest;
pub mod latest;
pub mod schedules;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use rota_core::store::ScheduleStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ScheduleStore + 'static,
{
  Router::new()
    // Ingestion
    .route("/upload", post(ingest::upload::<S>))
    .route("/check-duplicates", post(ingest::check_duplicates::<S>))
    // Canonical reads
    .route("/schedules", get(schedules::list::<S>))
    .route("/schedules/options", get(schedules::options::<S>))
    .route("/stats", get(schedules::stats::<S>))
    // Mirror ("latest upload") view and administration
    .route(
      "/latest",
      get(latest::list::<S>).delete(latest::delete_by_agent::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────
