//! Facility operations API
//!
//! This crate provides the parts stock ledger, availability projection, and
//! supplier replenishment backend of the facility operations product.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod openapi;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use services::availability::{AvailabilityService, DemandFeed};
use services::catalog::CatalogService;
use services::replenishment::ReplenishmentService;
use services::stock_ledger::StockLedgerService;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub stock_ledger: StockLedgerService,
    pub availability: AvailabilityService,
    pub catalog: CatalogService,
    pub replenishment: ReplenishmentService,
}

impl AppState {
    /// Wires the service layer over one connection pool. The demand feed is
    /// pluggable; deployments without the planning component pass
    /// `NullDemandFeed`.
    pub fn build(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
        demand_feed: Arc<dyn DemandFeed>,
    ) -> Self {
        let stock_ledger = StockLedgerService::new(db.clone(), Some(event_sender.clone()));
        let availability = AvailabilityService::new(db.clone(), demand_feed);
        let catalog = CatalogService::new(db.clone());
        let replenishment = ReplenishmentService::new(db.clone(), Some(event_sender.clone()));

        Self {
            db,
            config,
            event_sender,
            stock_ledger,
            availability,
            catalog,
            replenishment,
        }
    }
}

// Common response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Builds the full application router with middleware layers applied.
pub fn app_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/parts", handlers::parts::parts_router())
        .nest("/suppliers", handlers::suppliers::suppliers_router())
        .nest(
            "/replenishment-orders",
            handlers::replenishment::replenishment_router(),
        );

    let cors = if state.config.cors_allow_any_origin {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .merge(health::health_router())
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .with_state(state)
}
