//! Batch upload handler
//!
//! Accepts a multipart upload of one or more files and runs the whole
//! pipeline over them. Every part with a filename counts as one batch
//! file, in upload order; the response is the assembled batch report.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};

use dossier_core::BatchFile;

use crate::error::AppError;
use crate::state::AppState;

/// Upload and analyze a batch of documents
pub async fn analyze_batch(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    state.increment_requests();

    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(|s| s.to_string()) else {
            // Non-file fields carry no document
            continue;
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("could not read upload {filename}: {e}")))?;

        files.push(BatchFile::new(filename, bytes.to_vec()));
    }

    tracing::info!(files = files.len(), "batch upload received");

    let report = state.processor.process(files).await?;

    Ok(Json(report))
}
