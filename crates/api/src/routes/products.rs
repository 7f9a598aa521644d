//! Catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use domain::CreateProduct;
use domain::order::{decimal_from_json, text_from_json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::{Product, Store};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

/// Fields are read leniently: `precio` may be a number or a numeric string.
#[derive(Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub titulo: Value,
    #[serde(default)]
    pub precio: Value,
}

// -- Response types --

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub titulo: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub precio: Decimal,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i64(),
            titulo: product.title,
            precio: product.unit_price,
        }
    }
}

// -- Handlers --

/// GET /api/productos: every product, ordered by id.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// POST /api/productos: add a product to the catalog.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let cmd = CreateProduct {
        title: text_from_json(&req.titulo),
        price: decimal_from_json(&req.precio),
    };
    let product = state.catalog.create_product(cmd).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}
