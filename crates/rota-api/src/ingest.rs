//! Handlers for the upload and duplicate-check endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/upload?force=true\|false` | multipart `file` field; runs one reconciliation pass |
//! | `POST` | `/check-duplicates` | multipart `file` field; advisory, never writes |

use std::{path::Path, sync::Arc};

use axum::{
  Json,
  extract::{Multipart, Query, State},
};
use rota_core::{
  detect::DuplicateReport, engine::UploadStats, store::ScheduleStore,
};
use rota_sheet::NormalizedSheet;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Multipart plumbing ──────────────────────────────────────────────────────

fn is_xlsx(filename: &str) -> bool {
  Path::new(filename)
    .extension()
    .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"))
}

/// Pull the `file` field out of a multipart body and validate the file type.
async fn read_spreadsheet(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
  {
    if field.name() != Some("file") {
      continue;
    }

    let filename = field.file_name().unwrap_or_default().to_owned();
    if filename.is_empty() {
      return Err(ApiError::BadRequest("no file selected".to_owned()));
    }
    if !is_xlsx(&filename) {
      return Err(ApiError::BadRequest(
        "invalid file type; only .xlsx uploads are accepted".to_owned(),
      ));
    }

    let bytes = field
      .bytes()
      .await
      .map_err(|e| ApiError::BadRequest(format!("cannot read upload: {e}")))?;
    return Ok(bytes.to_vec());
  }

  Err(ApiError::BadRequest("no file uploaded".to_owned()))
}

/// Decode and normalize an uploaded workbook, logging any skipped columns.
fn normalize_upload(bytes: &[u8]) -> Result<NormalizedSheet, ApiError> {
  let table = rota_sheet::decode_xlsx(bytes)?;
  let sheet = rota_sheet::normalize(&table)?;
  if !sheet.skipped_columns.is_empty() {
    tracing::warn!(
      columns = ?sheet.skipped_columns,
      "ignoring spreadsheet columns with non-date headers"
    );
  }
  Ok(sheet)
}

// ─── Upload ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
  /// Overwrite existing canonical rows on key match. The mirror table is
  /// always overwritten regardless.
  #[serde(default)]
  pub force: bool,
}

/// Response body for `POST /upload`.
#[derive(Debug, Serialize)]
pub struct UploadOutcome {
  pub message:         String,
  pub stats:           UploadStats,
  /// Number of non-identity columns whose headers did not parse as dates.
  pub skipped_columns: usize,
}

/// `POST /upload?force=true|false` — one full reconciliation pass.
pub async fn upload<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<UploadParams>,
  mut multipart: Multipart,
) -> Result<Json<UploadOutcome>, ApiError>
where
  S: ScheduleStore,
{
  let bytes = read_spreadsheet(&mut multipart).await?;
  let sheet = normalize_upload(&bytes)?;

  let total = sheet.records.len();
  let stats = store.ingest(sheet.records, params.force).await?;

  Ok(Json(UploadOutcome {
    message: format!("Processed {total} records"),
    stats,
    skipped_columns: sheet.skipped_columns.len(),
  }))
}

// ─── Duplicate check ─────────────────────────────────────────────────────────

/// `POST /check-duplicates` — classify an upload against existing canonical
/// keys without touching either table.
pub async fn check_duplicates<S>(
  State(store): State<Arc<S>>,
  mut multipart: Multipart,
) -> Result<Json<DuplicateReport>, ApiError>
where
  S: ScheduleStore,
{
  let bytes = read_spreadsheet(&mut multipart).await?;
  let sheet = normalize_upload(&bytes)?;

  let report = store.check_duplicates(sheet.records).await?;
  Ok(Json(report))
}
