use utoipa::OpenApi;

use crate::handlers;

/// Aggregated OpenAPI document, served at /api-docs/openapi.json.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Restock API",
        version = "0.2.1",
        description = "Retail distribution inventory tracking: stock classification, \
restock scheduling, an auditable stock ledger, an alert approval queue, and \
hub economics evaluation."
    ),
    tags(
        (name = "inventory", description = "Inventory records and stock movements"),
        (name = "locations", description = "Store location roster"),
        (name = "alerts", description = "Alert approval queue"),
        (name = "hub", description = "Hub economics what-if evaluation"),
        (name = "health", description = "Health probes")
    ),
    paths(
        handlers::inventory::create_record,
        handlers::inventory::apply_movement,
        handlers::inventory::get_status,
        handlers::inventory::deactivate_record,
        handlers::inventory::list_attention,
        handlers::inventory::movement_history,
        handlers::inventory::create_location,
        handlers::inventory::list_locations,
        handlers::alerts::list_open_alerts,
        handlers::alerts::get_alert,
        handlers::alerts::approve_alert,
        handlers::alerts::reject_alert,
        handlers::alerts::schedule_alert,
        handlers::alerts::cancel_alert,
        handlers::alerts::retry_alert,
        handlers::alerts::bulk_approve,
        handlers::alerts::release_due,
        handlers::hub::evaluate_hub,
        handlers::health::health,
        handlers::health::readiness,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        handlers::inventory::CreateInventoryRecordRequest,
        handlers::inventory::ApplyMovementRequest,
        handlers::inventory::CreateLocationRequest,
        handlers::alerts::RejectAlertRequest,
        handlers::alerts::ScheduleAlertRequest,
        handlers::alerts::CancelAlertRequest,
        handlers::alerts::BulkApproveRequest,
        handlers::hub::EvaluateHubRequest,
        crate::services::hub_economics::HubScenario,
        crate::services::hub_economics::HubEvaluation,
        crate::services::hub_economics::ViabilityRating,
    ))
)]
pub struct ApiDoc;
