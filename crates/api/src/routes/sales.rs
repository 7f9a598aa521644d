//! Sales analytics endpoints.
//!
//! Query parameters are read leniently: a missing or unparseable value
//! falls back to its default, and an unknown metric means quantity.

use std::collections::HashMap;
use std::sync::Arc;

use analytics::{DEFAULT_SERIES_TOP, DEFAULT_TOP_LIMIT, SalesSeries, Window};
use axum::Json;
use axum::extract::{Query, State};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use store::{Metric, ProductSales, SalesSummary, Store};

use super::decimals_as_numbers;
use crate::AppState;
use crate::error::ApiError;

type Params = HashMap<String, String>;

fn int_param(params: &Params, key: &str) -> Option<i64> {
    let raw = params.get(key)?.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
}

fn window_param(params: &Params) -> Window {
    Window::from(int_param(params, "days"))
}

fn metric_param(params: &Params) -> Metric {
    params
        .get("metric")
        .and_then(|m| Metric::parse(m))
        .unwrap_or_default()
}

fn count_param(params: &Params, key: &str, default: usize) -> usize {
    int_param(params, key)
        .map(|n| n.clamp(0, i64::from(u32::MAX)) as usize)
        .unwrap_or(default)
}

// -- Response types --

#[derive(Serialize)]
pub struct TopProductResponse {
    pub titulo: String,
    pub cantidad: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub ingreso: Decimal,
}

impl From<ProductSales> for TopProductResponse {
    fn from(sales: ProductSales) -> Self {
        Self {
            titulo: sales.title,
            cantidad: sales.quantity,
            ingreso: sales.revenue,
        }
    }
}

#[derive(Serialize)]
pub struct SeriesEntry {
    pub titulo: String,
    #[serde(serialize_with = "decimals_as_numbers")]
    pub data: Vec<Decimal>,
}

#[derive(Serialize)]
pub struct SeriesResponse {
    /// `YYYY-MM-DD`, ascending.
    pub labels: Vec<NaiveDate>,
    pub series: Vec<SeriesEntry>,
}

impl From<SalesSeries> for SeriesResponse {
    fn from(series: SalesSeries) -> Self {
        Self {
            labels: series.labels,
            series: series
                .series
                .into_iter()
                .map(|s| SeriesEntry {
                    titulo: s.title,
                    data: s.data,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub pedidos: i64,
    pub items: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub ingreso: Decimal,
}

impl From<SalesSummary> for SummaryResponse {
    fn from(summary: SalesSummary) -> Self {
        Self {
            pedidos: summary.orders,
            items: summary.items,
            ingreso: summary.revenue,
        }
    }
}

// -- Handlers --

/// GET /api/ventas-top?days=&metric=&limit=: best sellers in the window.
#[tracing::instrument(skip(state))]
pub async fn top<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<Params>,
) -> Result<Json<Vec<TopProductResponse>>, ApiError> {
    let top = state
        .analytics
        .top_products(
            window_param(&params),
            metric_param(&params),
            count_param(&params, "limit", DEFAULT_TOP_LIMIT),
        )
        .await?;
    Ok(Json(top.into_iter().map(Into::into).collect()))
}

/// GET /api/ventas-serie?days=&metric=&top=: daily values of the leaders.
#[tracing::instrument(skip(state))]
pub async fn series<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<Params>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let series = state
        .analytics
        .daily_series(
            window_param(&params),
            metric_param(&params),
            count_param(&params, "top", DEFAULT_SERIES_TOP),
        )
        .await?;
    Ok(Json(series.into()))
}

/// GET /api/ventas-resumen?days=: order, unit and revenue totals.
#[tracing::instrument(skip(state))]
pub async fn summary<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<Params>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = state.analytics.summary(window_param(&params)).await?;
    Ok(Json(summary.into()))
}
