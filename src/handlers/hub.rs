use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::services::hub_economics::{evaluate, HubPolicy, HubScenario};
use crate::services::ledger::StockLedgerService;

/// State the hub handlers need access to.
pub trait HubHandlerState: Clone + Send + Sync + 'static {
    fn ledger_service(&self) -> &StockLedgerService;
    fn hub_policy(&self) -> &HubPolicy;
}

/// Scenario inputs; store_count falls back to the active location roster.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EvaluateHubRequest {
    pub store_count: Option<u32>,
    pub commission_rate_percent: Decimal,
    pub monthly_storage_fee: Decimal,
    pub setup_cost: Decimal,
    pub direct_shipment_cost: Decimal,
    pub bulk_discount_percent: Decimal,
    pub local_delivery_cost: Decimal,
    pub average_order_value: Decimal,
    pub shipments_per_store_per_month: u32,
    pub bulk_shipments_per_month: Option<u32>,
}

pub fn hub_router<S>() -> Router<S>
where
    S: HubHandlerState,
{
    Router::new().route("/evaluate", post(evaluate_hub::<S>))
}

/// What-if evaluation of routing deliveries through a regional hub
#[utoipa::path(
    post,
    path = "/api/v1/hub/evaluate",
    request_body = EvaluateHubRequest,
    responses(
        (status = 200, description = "Evaluation returned", body = crate::services::hub_economics::HubEvaluation),
        (status = 400, description = "Invalid scenario", body = crate::errors::ErrorResponse)
    ),
    tag = "hub"
)]
pub async fn evaluate_hub<S>(
    State(state): State<S>,
    Json(payload): Json<EvaluateHubRequest>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: HubHandlerState,
{
    let store_count = match payload.store_count {
        Some(count) => count,
        None => state.ledger_service().count_active_locations().await? as u32,
    };

    let scenario = HubScenario {
        store_count,
        commission_rate_percent: payload.commission_rate_percent,
        monthly_storage_fee: payload.monthly_storage_fee,
        setup_cost: payload.setup_cost,
        direct_shipment_cost: payload.direct_shipment_cost,
        bulk_discount_percent: payload.bulk_discount_percent,
        local_delivery_cost: payload.local_delivery_cost,
        average_order_value: payload.average_order_value,
        shipments_per_store_per_month: payload.shipments_per_store_per_month,
        bulk_shipments_per_month: payload.bulk_shipments_per_month,
    };
    let evaluation = evaluate(&scenario, state.hub_policy());

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "scenario": scenario, "evaluation": evaluation }
        })),
    ))
}
