//! Order ingestion endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domain::CreateOrder;
use domain::LineItemInput;
use domain::order::text_from_json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::Store;

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

/// Order payload. Items are `{id?, titulo?, qty?, precio?}` objects whose
/// fields may be numbers or numeric strings.
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub nombre: Value,
    #[serde(default)]
    pub correo: Value,
    #[serde(default)]
    pub items: Value,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderCreatedResponse {
    pub ok: bool,
    pub pedido_id: i64,
}

// -- Handlers --

/// POST /api/pedidos: place an order, creating unknown products on the fly.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<OrderCreatedResponse>, ApiError> {
    let items = LineItemInput::list_from_json(&req.items)?;
    let cmd = CreateOrder::new(
        text_from_json(&req.nombre),
        text_from_json(&req.correo),
        items,
    );

    let order_id = state.orders.create_order(cmd).await?;

    Ok(Json(OrderCreatedResponse {
        ok: true,
        pedido_id: order_id.as_i64(),
    }))
}
