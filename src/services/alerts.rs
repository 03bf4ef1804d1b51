use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    config::AlertPolicyConfig,
    db::DbPool,
    entities::{
        alert_record::{self, AlertStatus, AlertType, Entity as AlertRecord},
        inventory_record,
        store_location::Entity as StoreLocation,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::notifications::NotificationSender,
    stock_health::{RestockCadence, RestockPlan, StockAssessment, StockStatus, TriggerReason},
};

/// Filters for the open-alert listing.
#[derive(Debug, Clone, Default)]
pub struct AlertFilters {
    pub location_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub alert_type: Option<AlertType>,
}

/// Per-item result of a bulk approval; one failing item never aborts the rest.
#[derive(Debug, Clone, Serialize)]
pub struct BulkApprovalOutcome {
    pub alert_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Raises alert candidates from stock assessments and drives them through the
/// approval state machine to sent/rejected/failed.
#[derive(Clone)]
pub struct AlertService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    sender: Arc<dyn NotificationSender>,
    policy: AlertPolicyConfig,
}

impl AlertService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        sender: Arc<dyn NotificationSender>,
        policy: AlertPolicyConfig,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            sender,
            policy,
        }
    }

    /// Raises alerts for a freshly assessed record. Called by the ledger
    /// inside its per-pair critical section, so the open-alert uniqueness
    /// check cannot race with a concurrent mutation of the same record.
    ///
    /// A duplicate open alert is an expected outcome, not an error; it is
    /// suppressed silently.
    pub async fn generate_for_record<C: ConnectionTrait>(
        &self,
        conn: &C,
        record: &inventory_record::Model,
        assessment: &StockAssessment,
        plan: &RestockPlan,
        emergency: bool,
    ) -> Result<Vec<alert_record::Model>, ServiceError> {
        let mut candidates: Vec<(AlertType, Option<TriggerReason>)> = Vec::new();

        match assessment.status {
            StockStatus::Critical => {
                candidates.push((AlertType::Critical, Some(TriggerReason::StockCritical)))
            }
            StockStatus::Low => {
                candidates.push((AlertType::LowStock, Some(TriggerReason::StockLow)))
            }
            StockStatus::Healthy | StockStatus::Overstocked => {}
        }
        match plan.cadence {
            RestockCadence::Overdue => {
                candidates.push((AlertType::Overdue, Some(TriggerReason::DateDue)))
            }
            RestockCadence::Upcoming => {
                candidates.push((AlertType::UpcomingRestock, Some(TriggerReason::DateDue)))
            }
            RestockCadence::NeverRestocked | RestockCadence::OnTrack => {}
        }
        if emergency {
            candidates.push((AlertType::EmergencyRequest, None));
        }

        let mut raised = Vec::new();
        for (alert_type, trigger) in candidates {
            let open_exists = AlertRecord::find()
                .filter(alert_record::Column::LocationId.eq(record.location_id))
                .filter(alert_record::Column::ProductId.eq(record.product_id))
                .filter(alert_record::Column::AlertType.eq(alert_type.as_ref()))
                .filter(
                    Condition::any()
                        .add(alert_record::Column::Status.eq(AlertStatus::Pending.as_ref()))
                        .add(alert_record::Column::Status.eq(AlertStatus::Scheduled.as_ref())),
                )
                .one(conn)
                .await
                .map_err(ServiceError::db_error)?
                .is_some();
            if open_exists {
                debug!(
                    product_id = %record.product_id,
                    location_id = %record.location_id,
                    alert_type = alert_type.as_ref(),
                    "Open alert already exists; suppressing duplicate"
                );
                continue;
            }

            let priority = alert_type.default_priority();
            let now = Utc::now();
            let alert = alert_record::ActiveModel {
                id: Set(Uuid::new_v4()),
                location_id: Set(record.location_id),
                product_id: Set(record.product_id),
                alert_type: Set(alert_type.as_ref().to_string()),
                priority: Set(priority.as_ref().to_string()),
                message: Set(render_message(alert_type, record, plan)),
                status: Set(AlertStatus::Pending.as_ref().to_string()),
                trigger_reason: Set(trigger.map(|t| t.as_ref().to_string())),
                context_snapshot: Set(json!({
                    "current_stock": record.current_stock,
                    "minimum_stock": record.minimum_stock,
                    "maximum_stock": record.maximum_stock,
                    "ideal_stock": record.ideal_stock(),
                    "suggested_quantity": plan.suggested_quantity,
                    "days_until_stockout": plan.days_until_stockout,
                    "next_restock_date": plan.next_restock_date,
                })),
                send_at: Set(None),
                rejection_reason: Set(None),
                delivery_attempts: Set(0),
                provider_reference: Set(None),
                created_at: Set(now),
                approved_at: Set(None),
                sent_at: Set(None),
                updated_at: Set(now),
            }
            .insert(conn)
            .await
            .map_err(ServiceError::db_error)?;

            info!(
                alert_id = %alert.id,
                alert_type = %alert.alert_type,
                priority = %alert.priority,
                "Raised alert"
            );
            raised.push(alert);
        }

        Ok(raised)
    }

    async fn load(&self, alert_id: Uuid) -> Result<alert_record::Model, ServiceError> {
        AlertRecord::find_by_id(alert_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("alert {}", alert_id)))
    }

    fn current_status(alert: &alert_record::Model) -> Result<AlertStatus, ServiceError> {
        alert.status_enum().ok_or_else(|| {
            ServiceError::InternalError(format!(
                "alert {} has unknown status '{}'",
                alert.id, alert.status
            ))
        })
    }

    /// Moves an alert along one edge of the state machine, applying extra
    /// column updates atomically with the status change.
    async fn transition(
        &self,
        alert_id: Uuid,
        next: AlertStatus,
        apply: impl FnOnce(&mut alert_record::ActiveModel),
    ) -> Result<alert_record::Model, ServiceError> {
        let alert = self.load(alert_id).await?;
        let current = Self::current_status(&alert)?;
        if !current.can_transition_to(next) {
            return Err(ServiceError::InvalidTransition(format!(
                "alert {} cannot move {} -> {}",
                alert_id,
                current.as_ref(),
                next.as_ref()
            )));
        }

        let mut active: alert_record::ActiveModel = alert.into();
        active.status = Set(next.as_ref().to_string());
        active.updated_at = Set(Utc::now());
        apply(&mut active);
        active
            .update(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    /// Human approval: pending/scheduled -> approved, then dispatch.
    ///
    /// Delivery failure is captured on the record as `failed`; it is never
    /// surfaced as an error from this call, since the approval itself stood.
    #[instrument(skip(self))]
    pub async fn approve_alert(&self, alert_id: Uuid) -> Result<alert_record::Model, ServiceError> {
        let alert = self
            .transition(alert_id, AlertStatus::Approved, |active| {
                active.approved_at = Set(Some(Utc::now()));
            })
            .await?;

        self.event_sender
            .send(Event::AlertApproved(alert.id))
            .await
            .map_err(ServiceError::EventError)?;

        self.dispatch(alert).await
    }

    /// Terminal rejection; requires a non-empty reason.
    #[instrument(skip(self))]
    pub async fn reject_alert(
        &self,
        alert_id: Uuid,
        reason: String,
    ) -> Result<alert_record::Model, ServiceError> {
        if reason.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "rejection requires a reason".into(),
            ));
        }

        let alert = self
            .transition(alert_id, AlertStatus::Rejected, |active| {
                active.rejection_reason = Set(Some(reason));
            })
            .await?;

        self.event_sender
            .send(Event::AlertRejected(alert.id))
            .await
            .map_err(ServiceError::EventError)?;
        Ok(alert)
    }

    /// Caller-initiated cancellation of a pending/scheduled alert. Lands in
    /// the rejected terminal state with the cancellation recorded as reason.
    #[instrument(skip(self))]
    pub async fn cancel_alert(
        &self,
        alert_id: Uuid,
        cancelled_by: Option<String>,
    ) -> Result<alert_record::Model, ServiceError> {
        let reason = match cancelled_by {
            Some(who) => format!("cancelled by {}", who),
            None => "cancelled".to_string(),
        };
        let alert = self
            .transition(alert_id, AlertStatus::Rejected, |active| {
                active.rejection_reason = Set(Some(reason));
            })
            .await?;

        self.event_sender
            .send(Event::AlertRejected(alert.id))
            .await
            .map_err(ServiceError::EventError)?;
        Ok(alert)
    }

    /// Defers an alert: pending -> scheduled, re-entering the queue at send_at.
    #[instrument(skip(self))]
    pub async fn schedule_alert(
        &self,
        alert_id: Uuid,
        send_at: DateTime<Utc>,
    ) -> Result<alert_record::Model, ServiceError> {
        let alert = self.load(alert_id).await?;
        let current = Self::current_status(&alert)?;
        if current != AlertStatus::Pending {
            return Err(ServiceError::InvalidTransition(format!(
                "alert {} cannot move {} -> scheduled",
                alert_id,
                current.as_ref()
            )));
        }

        let alert = self
            .transition(alert_id, AlertStatus::Scheduled, |active| {
                active.send_at = Set(Some(send_at));
            })
            .await?;

        self.event_sender
            .send(Event::AlertScheduled {
                alert_id: alert.id,
                send_at,
            })
            .await
            .map_err(ServiceError::EventError)?;
        Ok(alert)
    }

    /// Re-drives a failed alert through approval and dispatch.
    #[instrument(skip(self))]
    pub async fn retry_alert(&self, alert_id: Uuid) -> Result<alert_record::Model, ServiceError> {
        let alert = self
            .transition(alert_id, AlertStatus::Approved, |active| {
                active.approved_at = Set(Some(Utc::now()));
            })
            .await?;
        self.dispatch(alert).await
    }

    /// Applies the single-alert approval to each id; partial failure of one
    /// item never aborts the others.
    #[instrument(skip(self))]
    pub async fn bulk_approve(&self, alert_ids: Vec<Uuid>) -> Vec<BulkApprovalOutcome> {
        let mut outcomes = Vec::with_capacity(alert_ids.len());
        for alert_id in alert_ids {
            match self.approve_alert(alert_id).await {
                Ok(alert) => outcomes.push(BulkApprovalOutcome {
                    alert_id,
                    success: true,
                    status: Some(alert.status),
                    error: None,
                }),
                Err(err) => outcomes.push(BulkApprovalOutcome {
                    alert_id,
                    success: false,
                    status: None,
                    error: Some(err.response_message()),
                }),
            }
        }
        outcomes
    }

    /// Moves scheduled alerts whose send_at has passed back into the queue;
    /// with auto-approval configured they are dispatched immediately.
    #[instrument(skip(self))]
    pub async fn release_due_alerts(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<alert_record::Model>, ServiceError> {
        let due = AlertRecord::find()
            .filter(alert_record::Column::Status.eq(AlertStatus::Scheduled.as_ref()))
            .filter(alert_record::Column::SendAt.lte(now))
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?;

        let mut released = Vec::with_capacity(due.len());
        for alert in due {
            let result = if self.policy.auto_approve_released {
                let approved = self
                    .transition(alert.id, AlertStatus::Approved, |active| {
                        active.approved_at = Set(Some(Utc::now()));
                    })
                    .await?;
                self.dispatch(approved).await
            } else {
                self.transition(alert.id, AlertStatus::Pending, |_| {}).await
            };
            released.push(result?);
        }
        Ok(released)
    }

    /// Open (pending/scheduled) alerts, newest first.
    #[instrument(skip(self))]
    pub async fn list_open_alerts(
        &self,
        filters: AlertFilters,
    ) -> Result<Vec<alert_record::Model>, ServiceError> {
        let mut query = AlertRecord::find()
            .filter(
                Condition::any()
                    .add(alert_record::Column::Status.eq(AlertStatus::Pending.as_ref()))
                    .add(alert_record::Column::Status.eq(AlertStatus::Scheduled.as_ref())),
            )
            .order_by_desc(alert_record::Column::CreatedAt);

        if let Some(location_id) = filters.location_id {
            query = query.filter(alert_record::Column::LocationId.eq(location_id));
        }
        if let Some(product_id) = filters.product_id {
            query = query.filter(alert_record::Column::ProductId.eq(product_id));
        }
        if let Some(alert_type) = filters.alert_type {
            query = query.filter(alert_record::Column::AlertType.eq(alert_type.as_ref()));
        }

        query
            .all(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)
    }

    pub async fn get_alert(&self, alert_id: Uuid) -> Result<alert_record::Model, ServiceError> {
        self.load(alert_id).await
    }

    /// Sends an approved alert to the store contact with bounded attempts.
    /// Ends in `sent` or in the retryable `failed` state, never in an error.
    async fn dispatch(
        &self,
        alert: alert_record::Model,
    ) -> Result<alert_record::Model, ServiceError> {
        let recipient = StoreLocation::find_by_id(alert.location_id)
            .one(self.db_pool.as_ref())
            .await
            .map_err(ServiceError::db_error)?
            .map(|loc| loc.contact_phone);

        let mut attempts = 0u32;
        let mut provider_reference = None;
        let mut delivered = false;

        if let Some(recipient) = recipient {
            while attempts < self.policy.max_delivery_attempts {
                attempts += 1;
                match self.sender.send(&recipient, &alert.message).await {
                    Ok(outcome) if outcome.delivered => {
                        provider_reference = outcome.provider_reference;
                        delivered = true;
                        break;
                    }
                    Ok(_) => {
                        warn!(alert_id = %alert.id, attempt = attempts, "Provider reported non-delivery");
                    }
                    Err(err) => {
                        warn!(alert_id = %alert.id, attempt = attempts, "Delivery attempt failed: {}", err);
                    }
                }
            }
        } else {
            warn!(
                alert_id = %alert.id,
                location_id = %alert.location_id,
                "No store contact on file; cannot deliver"
            );
        }

        let total_attempts = alert.delivery_attempts + attempts as i32;
        let updated = if delivered {
            let updated = self
                .transition(alert.id, AlertStatus::Sent, |active| {
                    active.sent_at = Set(Some(Utc::now()));
                    active.delivery_attempts = Set(total_attempts);
                    active.provider_reference = Set(provider_reference);
                })
                .await?;
            self.event_sender
                .send(Event::AlertSent(updated.id))
                .await
                .map_err(ServiceError::EventError)?;
            updated
        } else {
            let updated = self
                .transition(alert.id, AlertStatus::Failed, |active| {
                    active.delivery_attempts = Set(total_attempts);
                })
                .await?;
            self.event_sender
                .send(Event::AlertDeliveryFailed {
                    alert_id: updated.id,
                    attempts,
                })
                .await
                .map_err(ServiceError::EventError)?;
            updated
        };
        Ok(updated)
    }
}

fn render_message(
    alert_type: AlertType,
    record: &inventory_record::Model,
    plan: &RestockPlan,
) -> String {
    match alert_type {
        AlertType::Critical => format!(
            "CRITICAL stock for product {}: {} on hand (minimum {}). Suggested restock: {} units.",
            record.product_id, record.current_stock, record.minimum_stock, plan.suggested_quantity
        ),
        AlertType::LowStock => format!(
            "Low stock for product {}: {} on hand (minimum {}). Suggested restock: {} units.",
            record.product_id, record.current_stock, record.minimum_stock, plan.suggested_quantity
        ),
        AlertType::Overdue => match plan.next_restock_date {
            Some(date) => format!(
                "Restock overdue for product {} (was due {}). Suggested quantity: {} units.",
                record.product_id, date, plan.suggested_quantity
            ),
            None => format!(
                "Restock overdue for product {}. Suggested quantity: {} units.",
                record.product_id, plan.suggested_quantity
            ),
        },
        AlertType::UpcomingRestock => match plan.next_restock_date {
            Some(date) => format!(
                "Restock for product {} due on {}. Suggested quantity: {} units.",
                record.product_id, date, plan.suggested_quantity
            ),
            None => format!(
                "Restock for product {} coming up. Suggested quantity: {} units.",
                record.product_id, plan.suggested_quantity
            ),
        },
        AlertType::EmergencyRequest => format!(
            "Emergency replenishment recorded for product {}: {} now on hand.",
            record.product_id, record.current_stock
        ),
    }
}
