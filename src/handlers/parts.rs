use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::stock_movement::MovementType,
    errors::ServiceError,
    handlers::AppState,
    services::catalog::{NewPart, PartUpdate},
    services::stock_ledger::RecordMovement,
    ApiResponse,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePartRequest {
    pub customer_id: Uuid,
    pub company_id: Uuid,
    #[validate(length(min = 1))]
    pub module: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub part_number: Option<String>,
    #[validate(length(min = 1))]
    pub unit: String,
    pub minimum_quantity: Decimal,
    pub maximum_quantity: Option<Decimal>,
    pub cost_price: Decimal,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePartRequest {
    pub module: Option<String>,
    pub name: Option<String>,
    pub part_number: Option<String>,
    pub unit: Option<String>,
    pub minimum_quantity: Option<Decimal>,
    pub maximum_quantity: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub supplier_id: Option<Uuid>,
}

/// `movement_type` uses the wire names: `entrada`, `saida`, `ajuste`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdjustStockRequest {
    #[validate(length(min = 1))]
    pub movement_type: String,
    pub quantity: Decimal,
    pub reason: Option<String>,
    #[validate(length(min = 1))]
    pub actor: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PartFilters {
    pub customer_id: Uuid,
    pub module: Option<String>,
    pub low_stock: Option<bool>,
}

pub fn parts_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_parts).post(create_part))
        .route(
            "/:id",
            get(get_part).put(update_part).delete(deactivate_part),
        )
        .route("/:id/movements", get(movement_history))
        .route("/:id/adjust", post(adjust_stock))
}

/// List a customer's parts annotated with availability figures
#[utoipa::path(
    get,
    path = "/api/v1/parts",
    params(PartFilters),
    responses(
        (status = 200, description = "Parts with reserved, projected and low-stock annotations"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn list_parts(
    State(state): State<AppState>,
    Query(filters): Query<PartFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let parts = state
        .availability
        .list_parts(
            filters.customer_id,
            filters.module,
            filters.low_stock.unwrap_or(false),
        )
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(parts))))
}

/// Create a catalog part (stock starts at zero)
#[utoipa::path(
    post,
    path = "/api/v1/parts",
    request_body = CreatePartRequest,
    responses(
        (status = 201, description = "Part created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn create_part(
    State(state): State<AppState>,
    Json(payload): Json<CreatePartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let part = state
        .catalog
        .create_part(NewPart {
            customer_id: payload.customer_id,
            company_id: payload.company_id,
            module: payload.module,
            name: payload.name,
            part_number: payload.part_number,
            unit: payload.unit,
            minimum_quantity: payload.minimum_quantity,
            maximum_quantity: payload.maximum_quantity,
            cost_price: payload.cost_price,
            supplier_id: payload.supplier_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(part))))
}

/// Fetch one part with availability annotations
#[utoipa::path(
    get,
    path = "/api/v1/parts/{id}",
    params(("id" = Uuid, Path, description = "Part ID")),
    responses(
        (status = 200, description = "Part returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn get_part(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let part = state.stock_ledger.get_part(id).await?;
    let annotated = state.availability.annotate(part).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(annotated))))
}

/// Update catalog attributes of a part
#[utoipa::path(
    put,
    path = "/api/v1/parts/{id}",
    params(("id" = Uuid, Path, description = "Part ID")),
    request_body = UpdatePartRequest,
    responses(
        (status = 200, description = "Part updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn update_part(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let part = state
        .catalog
        .update_part(
            id,
            PartUpdate {
                module: payload.module,
                name: payload.name,
                part_number: payload.part_number,
                unit: payload.unit,
                minimum_quantity: payload.minimum_quantity,
                maximum_quantity: payload.maximum_quantity,
                cost_price: payload.cost_price,
                supplier_id: payload.supplier_id,
            },
        )
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(part))))
}

/// Soft-deactivate a part; movement history stays intact
#[utoipa::path(
    delete,
    path = "/api/v1/parts/{id}",
    params(("id" = Uuid, Path, description = "Part ID")),
    responses(
        (status = 200, description = "Part deactivated"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn deactivate_part(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let part = state.catalog.deactivate_part(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(part))))
}

/// A part's movement audit trail, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/parts/{id}/movements",
    params(("id" = Uuid, Path, description = "Part ID")),
    responses(
        (status = 200, description = "Movements returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn movement_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let movements = state.stock_ledger.movement_history(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(movements))))
}

/// Record a stock movement against a part
#[utoipa::path(
    post,
    path = "/api/v1/parts/{id}/adjust",
    params(("id" = Uuid, Path, description = "Part ID")),
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Movement recorded; returns the movement and the updated part"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Concurrent modification; retry with fresh reads", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock or inactive part", body = crate::errors::ErrorResponse)
    ),
    tag = "parts"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let movement_type = MovementType::from_str(&payload.movement_type).ok_or_else(|| {
        ServiceError::ValidationError(format!(
            "unknown movement type '{}' (expected entrada, saida or ajuste)",
            payload.movement_type
        ))
    })?;

    let movement = state
        .stock_ledger
        .record_movement(RecordMovement {
            part_id: id,
            movement_type,
            magnitude: payload.quantity,
            reason: payload.reason,
            actor: payload.actor,
        })
        .await?;
    let part = state.stock_ledger.get_part(id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(json!({
            "movement": movement,
            "part": part,
        }))),
    ))
}
