use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::replenishment_order::ReplenishmentStatus,
    errors::ServiceError,
    handlers::AppState,
    services::replenishment::{ItemQuantity, NewOrderItem},
    ApiResponse,
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct OrderItemRequest {
    pub part_id: Uuid,
    pub quantity_requested: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReplenishmentOrderRequest {
    pub customer_id: Uuid,
    pub supplier_id: Uuid,
    #[validate(length(min = 1))]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateReplenishmentRequest {
    pub customer_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ItemQuantityRequest {
    pub item_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmOrderRequest {
    #[serde(default)]
    pub items: Vec<ItemQuantityRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ShipOrderRequest {
    pub tracking_code: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemQuantityRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReceiveOrderRequest {
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub actor: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct OrderFilters {
    pub customer_id: Uuid,
    /// Wire status name: pendente, confirmado, enviado, recebido, cancelado
    pub status: Option<String>,
}

fn item_quantities(items: Vec<ItemQuantityRequest>) -> Vec<ItemQuantity> {
    items
        .into_iter()
        .map(|i| ItemQuantity {
            item_id: i.item_id,
            quantity: i.quantity,
        })
        .collect()
}

pub fn replenishment_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/generate", post(generate_orders))
        .route("/:id", get(get_order))
        .route("/:id/confirm", post(confirm_order))
        .route("/:id/ship", post(ship_order))
        .route("/:id/cancel", post(cancel_order))
        .route("/:id/receive", post(receive_order))
}

/// List a customer's replenishment orders with nested items
#[utoipa::path(
    get,
    path = "/api/v1/replenishment-orders",
    params(OrderFilters),
    responses(
        (status = 200, description = "Orders returned"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "replenishment"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filters): Query<OrderFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let status = filters
        .status
        .map(|s| {
            ReplenishmentStatus::from_str(&s).ok_or_else(|| {
                ServiceError::ValidationError(format!("unknown order status '{}'", s))
            })
        })
        .transpose()?;

    let orders = state
        .replenishment
        .list_orders(filters.customer_id, status)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(orders))))
}

/// Create a manual replenishment order
#[utoipa::path(
    post,
    path = "/api/v1/replenishment-orders",
    request_body = CreateReplenishmentOrderRequest,
    responses(
        (status = 201, description = "Order created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier or part not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Part inactive", body = crate::errors::ErrorResponse)
    ),
    tag = "replenishment"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateReplenishmentOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let items = payload
        .items
        .into_iter()
        .map(|i| NewOrderItem {
            part_id: i.part_id,
            quantity_requested: i.quantity_requested,
        })
        .collect();

    let order = state
        .replenishment
        .create_manual_order(payload.customer_id, payload.supplier_id, items)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(order))))
}

/// Run the planner: scan for low stock and create one order per supplier
#[utoipa::path(
    post,
    path = "/api/v1/replenishment-orders/generate",
    request_body = GenerateReplenishmentRequest,
    responses(
        (status = 200, description = "Planner summary with orders created, total value and skipped parts"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "replenishment"
)]
pub async fn generate_orders(
    State(state): State<AppState>,
    Json(payload): Json<GenerateReplenishmentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state
        .replenishment
        .generate_replenishment_orders(payload.customer_id)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(summary))))
}

/// Fetch one order with items
#[utoipa::path(
    get,
    path = "/api/v1/replenishment-orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "replenishment"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.replenishment.get_order(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(order))))
}

/// Supplier confirmation: pendente -> confirmado
#[utoipa::path(
    post,
    path = "/api/v1/replenishment-orders/{id}/confirm",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ConfirmOrderRequest,
    responses(
        (status = 200, description = "Order confirmed"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invalid transition or concurrent modification", body = crate::errors::ErrorResponse)
    ),
    tag = "replenishment"
)]
pub async fn confirm_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .replenishment
        .confirm_order(id, item_quantities(payload.items))
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(order))))
}

/// Supplier dispatch: confirmado -> enviado
#[utoipa::path(
    post,
    path = "/api/v1/replenishment-orders/{id}/ship",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ShipOrderRequest,
    responses(
        (status = 200, description = "Order shipped"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invalid transition or concurrent modification", body = crate::errors::ErrorResponse)
    ),
    tag = "replenishment"
)]
pub async fn ship_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShipOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .replenishment
        .ship_order(id, payload.tracking_code, item_quantities(payload.items))
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(order))))
}

/// Cancel a not-yet-received order (no stock effect)
#[utoipa::path(
    post,
    path = "/api/v1/replenishment-orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order cancelled"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invalid transition", body = crate::errors::ErrorResponse)
    ),
    tag = "replenishment"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.replenishment.cancel_order(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(order))))
}

/// Warehouse receipt: enviado -> recebido, posting inbound movements
#[utoipa::path(
    post,
    path = "/api/v1/replenishment-orders/{id}/receive",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ReceiveOrderRequest,
    responses(
        (status = 200, description = "Order received; inbound movements posted"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Invalid transition (already received, not yet shipped) or concurrent modification", body = crate::errors::ErrorResponse),
        (status = 422, description = "A target part is inactive; nothing was posted", body = crate::errors::ErrorResponse)
    ),
    tag = "replenishment"
)]
pub async fn receive_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceiveOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let receipt = state
        .replenishment
        .confirm_receipt(id, payload.notes, &payload.actor)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(receipt))))
}
