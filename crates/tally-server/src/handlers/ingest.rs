//! Statement ingestion handler

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, AuthUser};
use tally_core::store::insert_records;
use tally_core::{pipeline, rows, Error};

/// Request body for a statement upload
#[derive(Debug, Deserialize)]
pub struct ProcessCsvRequest {
    /// Raw statement text, header row included
    pub csv: String,
}

/// Aggregate counts reported back to the uploader
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCsvResponse {
    pub transactions_count: usize,
    pub subscriptions_count: usize,
}

/// POST /api/process-csv - Ingest one uploaded statement
///
/// Runs the full pipeline for the authenticated user, persists both record
/// collections, and reports counts. An upload that yields no usable rows is
/// a 400; individual bad rows are skipped silently. Transactions are
/// inserted before subscriptions; a storage failure anywhere reports the
/// whole upload as failed (there is no partial-success path).
pub async fn process_csv(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ProcessCsvRequest>,
) -> Result<Json<ProcessCsvResponse>, AppError> {
    let parsed = rows::read_rows(&payload.csv);

    let outcome = pipeline::process_rows(&parsed, &user.id).map_err(|e| match e {
        Error::NoTransactions => AppError::bad_request("No valid transactions found"),
        other => AppError::from(other),
    })?;

    insert_records(state.store.as_ref(), "transactions", &outcome.transactions).await?;
    insert_records(
        state.store.as_ref(),
        "detected_subscriptions",
        &outcome.subscriptions,
    )
    .await?;

    info!(
        user = %user.id,
        transactions = outcome.transactions.len(),
        subscriptions = outcome.subscriptions.len(),
        "processed statement upload"
    );

    Ok(Json(ProcessCsvResponse {
        transactions_count: outcome.transactions.len(),
        subscriptions_count: outcome.subscriptions.len(),
    }))
}
