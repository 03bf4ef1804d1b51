pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod stock_health;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::alerts::AlertService;
use crate::services::hub_economics::HubPolicy;
use crate::services::ledger::StockLedgerService;

/// Shared application state behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub event_sender: EventSender,
    pub ledger_service: StockLedgerService,
    pub alert_service: Arc<AlertService>,
}

impl handlers::inventory::InventoryHandlerState for AppState {
    fn ledger_service(&self) -> &StockLedgerService {
        &self.ledger_service
    }
}

impl handlers::alerts::AlertHandlerState for AppState {
    fn alert_service(&self) -> &AlertService {
        &self.alert_service
    }
}

impl handlers::hub::HubHandlerState for AppState {
    fn ledger_service(&self) -> &StockLedgerService {
        &self.ledger_service
    }

    fn hub_policy(&self) -> &HubPolicy {
        &self.config.hub_policy
    }
}

impl handlers::health::HealthHandlerState for AppState {
    fn db_pool(&self) -> &Arc<DbPool> {
        &self.db_pool
    }
}

/// Builds the full application router with middleware attached.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/inventory", handlers::inventory::inventory_router())
        .nest("/locations", handlers::inventory::location_router())
        .nest("/alerts", handlers::alerts::alert_router())
        .nest("/hub", handlers::hub::hub_router());

    Router::new()
        .merge(handlers::health::health_router())
        .nest("/api/v1", api)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
