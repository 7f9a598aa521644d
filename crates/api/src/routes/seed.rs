//! Demo data endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use store::Store;

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct SeedResponse {
    pub ok: bool,
    pub msg: String,
}

/// POST /api/seed (also GET): load the demo catalog and random orders.
#[tracing::instrument(skip(state))]
pub async fn run<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<SeedResponse>, ApiError> {
    let report = state.seeder.seed().await?;
    Ok(Json(SeedResponse {
        ok: true,
        msg: format!(
            "seeded {} products and {} orders ({} lines)",
            report.products_created, report.orders_created, report.lines_created
        ),
    }))
}
