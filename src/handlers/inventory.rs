use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::stock_movement::MovementType;
use crate::errors::ServiceError;
use crate::services::ledger::{ApplyMovementCommand, ProvisionRecordCommand, StockLedgerService};

/// State the inventory handlers need access to.
pub trait InventoryHandlerState: Clone + Send + Sync + 'static {
    fn ledger_service(&self) -> &StockLedgerService;
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInventoryRecordRequest {
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub current_stock: i32,
    pub minimum_stock: i32,
    pub maximum_stock: i32,
    pub ideal_stock_percentage: i32,
    pub restock_cycle_days: i32,
    pub average_daily_sales: Decimal,
    pub unit_cost: Decimal,
    pub retail_price: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyMovementRequest {
    pub product_id: Uuid,
    pub from_location_id: Option<Uuid>,
    pub to_location_id: Option<Uuid>,
    pub quantity: i32,
    #[schema(value_type = String, example = "transfer")]
    pub movement_type: MovementType,
    pub movement_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLocationRequest {
    pub name: String,
    pub contact_name: Option<String>,
    pub contact_phone: String,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct MovementHistoryQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub fn inventory_router<S>() -> Router<S>
where
    S: InventoryHandlerState,
{
    Router::new()
        .route("/", post(create_record::<S>))
        .route("/attention", get(list_attention::<S>))
        .route("/movements", post(apply_movement::<S>))
        .route(
            "/:product_id/:location_id",
            get(get_status::<S>).delete(deactivate_record::<S>),
        )
        .route(
            "/:product_id/:location_id/movements",
            get(movement_history::<S>),
        )
}

pub fn location_router<S>() -> Router<S>
where
    S: InventoryHandlerState,
{
    Router::new().route("/", get(list_locations::<S>).post(create_location::<S>))
}

/// Provision stock tracking for a (product, location) pair
#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = CreateInventoryRecordRequest,
    responses(
        (status = 201, description = "Inventory record created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Record already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_record<S>(
    State(state): State<S>,
    Json(payload): Json<CreateInventoryRecordRequest>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let record = state
        .ledger_service()
        .provision_record(ProvisionRecordCommand {
            product_id: payload.product_id,
            location_id: payload.location_id,
            current_stock: payload.current_stock,
            minimum_stock: payload.minimum_stock,
            maximum_stock: payload.maximum_stock,
            ideal_stock_percentage: payload.ideal_stock_percentage,
            restock_cycle_days: payload.restock_cycle_days,
            average_daily_sales: payload.average_daily_sales,
            unit_cost: payload.unit_cost,
            retail_price: payload.retail_price,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": record })),
    ))
}

/// Apply a stock movement
#[utoipa::path(
    post,
    path = "/api/v1/inventory/movements",
    request_body = ApplyMovementRequest,
    responses(
        (status = 200, description = "Movement applied"),
        (status = 400, description = "Invalid movement", body = crate::errors::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn apply_movement<S>(
    State(state): State<S>,
    Json(payload): Json<ApplyMovementRequest>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let outcome = state
        .ledger_service()
        .apply_movement(ApplyMovementCommand {
            product_id: payload.product_id,
            from_location_id: payload.from_location_id,
            to_location_id: payload.to_location_id,
            quantity: payload.quantity,
            movement_type: payload.movement_type,
            movement_date: payload.movement_date,
            reason: payload.reason,
            created_by: payload.created_by,
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "movement": outcome.movement,
                "source": outcome.source,
                "destination": outcome.destination,
            }
        })),
    ))
}

/// Current stock status for one (product, location) pair
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{product_id}/{location_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product id"),
        ("location_id" = Uuid, Path, description = "Store location id")
    ),
    responses(
        (status = 200, description = "Status returned"),
        (status = 404, description = "Record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_status<S>(
    State(state): State<S>,
    Path((product_id, location_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let status = state
        .ledger_service()
        .get_inventory_status(product_id, location_id)
        .await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": status })),
    ))
}

/// Deactivate a record; its movement history stays queryable
#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{product_id}/{location_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product id"),
        ("location_id" = Uuid, Path, description = "Store location id")
    ),
    responses(
        (status = 200, description = "Record deactivated"),
        (status = 404, description = "Record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn deactivate_record<S>(
    State(state): State<S>,
    Path((product_id, location_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let record = state
        .ledger_service()
        .deactivate_record(product_id, location_id)
        .await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": record })),
    ))
}

/// Records that are low, critical, or flagged for restock
#[utoipa::path(
    get,
    path = "/api/v1/inventory/attention",
    responses(
        (status = 200, description = "Attention list returned")
    ),
    tag = "inventory"
)]
pub async fn list_attention<S>(State(state): State<S>) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let records = state.ledger_service().list_attention_records().await?;
    let total = records.len();
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "records": records, "total": total }
        })),
    ))
}

/// Paginated movement history for one (product, location) pair
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{product_id}/{location_id}/movements",
    params(
        ("product_id" = Uuid, Path, description = "Product id"),
        ("location_id" = Uuid, Path, description = "Store location id"),
        MovementHistoryQuery
    ),
    responses(
        (status = 200, description = "Movement history returned")
    ),
    tag = "inventory"
)]
pub async fn movement_history<S>(
    State(state): State<S>,
    Path((product_id, location_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<MovementHistoryQuery>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let (movements, total) = state
        .ledger_service()
        .list_movements(product_id, location_id, page, limit)
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "movements": movements,
                "total": total,
                "page": page,
                "per_page": limit,
            }
        })),
    ))
}

/// Register a store location
#[utoipa::path(
    post,
    path = "/api/v1/locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "locations"
)]
pub async fn create_location<S>(
    State(state): State<S>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let location = state
        .ledger_service()
        .create_location(
            payload.name,
            payload.contact_name,
            payload.contact_phone,
            payload.address,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": location })),
    ))
}

/// List store locations
#[utoipa::path(
    get,
    path = "/api/v1/locations",
    responses(
        (status = 200, description = "Locations returned")
    ),
    tag = "locations"
)]
pub async fn list_locations<S>(State(state): State<S>) -> Result<impl IntoResponse, ServiceError>
where
    S: InventoryHandlerState,
{
    let locations = state.ledger_service().list_locations().await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": { "locations": locations } })),
    ))
}
