use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::alert_record::AlertType;
use crate::errors::ServiceError;
use crate::services::alerts::{AlertFilters, AlertService};

/// State the alert handlers need access to.
pub trait AlertHandlerState: Clone + Send + Sync + 'static {
    fn alert_service(&self) -> &AlertService;
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectAlertRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleAlertRequest {
    pub send_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelAlertRequest {
    pub cancelled_by: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkApproveRequest {
    pub alert_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct OpenAlertQuery {
    pub location_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    #[param(value_type = Option<String>, example = "low_stock")]
    pub alert_type: Option<AlertType>,
}

pub fn alert_router<S>() -> Router<S>
where
    S: AlertHandlerState,
{
    Router::new()
        .route("/", get(list_open_alerts::<S>))
        .route("/bulk-approve", post(bulk_approve::<S>))
        .route("/release-due", post(release_due::<S>))
        .route("/:id", get(get_alert::<S>))
        .route("/:id/approve", post(approve_alert::<S>))
        .route("/:id/reject", post(reject_alert::<S>))
        .route("/:id/schedule", post(schedule_alert::<S>))
        .route("/:id/cancel", post(cancel_alert::<S>))
        .route("/:id/retry", post(retry_alert::<S>))
}

/// Open (pending or scheduled) alerts, newest first
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    params(OpenAlertQuery),
    responses(
        (status = 200, description = "Open alerts returned")
    ),
    tag = "alerts"
)]
pub async fn list_open_alerts<S>(
    State(state): State<S>,
    Query(query): Query<OpenAlertQuery>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: AlertHandlerState,
{
    let alerts = state
        .alert_service()
        .list_open_alerts(AlertFilters {
            location_id: query.location_id,
            product_id: query.product_id,
            alert_type: query.alert_type,
        })
        .await?;
    let total = alerts.len();
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "alerts": alerts, "total": total }
        })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/alerts/{id}",
    params(("id" = Uuid, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert returned"),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn get_alert<S>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: AlertHandlerState,
{
    let alert = state.alert_service().get_alert(id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": alert })),
    ))
}

/// Approve an alert and dispatch it to the store contact
#[utoipa::path(
    post,
    path = "/api/v1/alerts/{id}/approve",
    params(("id" = Uuid, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Alert approved; final status reflects delivery"),
        (status = 400, description = "Illegal transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn approve_alert<S>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: AlertHandlerState,
{
    let alert = state.alert_service().approve_alert(id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": alert })),
    ))
}

/// Reject an alert with a required reason
#[utoipa::path(
    post,
    path = "/api/v1/alerts/{id}/reject",
    params(("id" = Uuid, Path, description = "Alert id")),
    request_body = RejectAlertRequest,
    responses(
        (status = 200, description = "Alert rejected"),
        (status = 400, description = "Illegal transition or missing reason", body = crate::errors::ErrorResponse),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn reject_alert<S>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectAlertRequest>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: AlertHandlerState,
{
    let alert = state.alert_service().reject_alert(id, payload.reason).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": alert })),
    ))
}

/// Defer a pending alert until send_at
#[utoipa::path(
    post,
    path = "/api/v1/alerts/{id}/schedule",
    params(("id" = Uuid, Path, description = "Alert id")),
    request_body = ScheduleAlertRequest,
    responses(
        (status = 200, description = "Alert scheduled"),
        (status = 400, description = "Illegal transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn schedule_alert<S>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ScheduleAlertRequest>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: AlertHandlerState,
{
    let alert = state
        .alert_service()
        .schedule_alert(id, payload.send_at)
        .await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": alert })),
    ))
}

/// Cancel a pending or scheduled alert
#[utoipa::path(
    post,
    path = "/api/v1/alerts/{id}/cancel",
    params(("id" = Uuid, Path, description = "Alert id")),
    request_body = CancelAlertRequest,
    responses(
        (status = 200, description = "Alert cancelled"),
        (status = 400, description = "Illegal transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn cancel_alert<S>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
    payload: Option<Json<CancelAlertRequest>>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: AlertHandlerState,
{
    let cancelled_by = payload.and_then(|Json(p)| p.cancelled_by);
    let alert = state.alert_service().cancel_alert(id, cancelled_by).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": alert })),
    ))
}

/// Retry delivery of a failed alert
#[utoipa::path(
    post,
    path = "/api/v1/alerts/{id}/retry",
    params(("id" = Uuid, Path, description = "Alert id")),
    responses(
        (status = 200, description = "Retry attempted; final status reflects delivery"),
        (status = 400, description = "Alert is not in the failed state", body = crate::errors::ErrorResponse),
        (status = 404, description = "Alert not found", body = crate::errors::ErrorResponse)
    ),
    tag = "alerts"
)]
pub async fn retry_alert<S>(
    State(state): State<S>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: AlertHandlerState,
{
    let alert = state.alert_service().retry_alert(id).await?;
    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "data": alert })),
    ))
}

/// Approve a batch of alerts; one failure never aborts the rest
#[utoipa::path(
    post,
    path = "/api/v1/alerts/bulk-approve",
    request_body = BulkApproveRequest,
    responses(
        (status = 200, description = "Per-alert outcomes returned")
    ),
    tag = "alerts"
)]
pub async fn bulk_approve<S>(
    State(state): State<S>,
    Json(payload): Json<BulkApproveRequest>,
) -> Result<impl IntoResponse, ServiceError>
where
    S: AlertHandlerState,
{
    let outcomes = state.alert_service().bulk_approve(payload.alert_ids).await;
    let approved = outcomes.iter().filter(|o| o.success).count();
    let failed = outcomes.len() - approved;
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "outcomes": outcomes, "approved": approved, "failed": failed }
        })),
    ))
}

/// Move scheduled alerts whose send_at has passed back into the queue
#[utoipa::path(
    post,
    path = "/api/v1/alerts/release-due",
    responses(
        (status = 200, description = "Released alerts returned")
    ),
    tag = "alerts"
)]
pub async fn release_due<S>(State(state): State<S>) -> Result<impl IntoResponse, ServiceError>
where
    S: AlertHandlerState,
{
    let released = state.alert_service().release_due_alerts(Utc::now()).await?;
    let total = released.len();
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "released": released, "total": total }
        })),
    ))
}
