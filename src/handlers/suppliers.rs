use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ServiceError, handlers::AppState, services::catalog::NewSupplier, ApiResponse,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1))]
    pub name: String,
    pub contact_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SupplierFilters {
    pub customer_id: Uuid,
}

pub fn suppliers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route("/:id", get(get_supplier))
}

/// List a customer's suppliers
#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    params(SupplierFilters),
    responses(
        (status = 200, description = "Suppliers returned"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(filters): Query<SupplierFilters>,
) -> Result<impl IntoResponse, ServiceError> {
    let suppliers = state.catalog.list_suppliers(filters.customer_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(suppliers))))
}

/// Create a supplier
#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let supplier = state
        .catalog
        .create_supplier(NewSupplier {
            customer_id: payload.customer_id,
            name: payload.name,
            contact_name: payload.contact_name,
            email: payload.email,
            phone: payload.phone,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(supplier))))
}

/// Fetch one supplier
#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier returned"),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    tag = "suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplier = state.catalog.get_supplier(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(supplier))))
}
