use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// What condition raised the alert.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertType {
    Critical,
    LowStock,
    UpcomingRestock,
    Overdue,
    EmergencyRequest,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl AlertType {
    /// Severity-derived priority for a freshly raised alert.
    pub fn default_priority(&self) -> AlertPriority {
        match self {
            AlertType::Critical | AlertType::EmergencyRequest => AlertPriority::Urgent,
            AlertType::LowStock | AlertType::Overdue => AlertPriority::High,
            AlertType::UpcomingRestock => AlertPriority::Normal,
        }
    }
}

/// Lifecycle states of an alert.
///
/// pending -> {approved, rejected, scheduled}
/// scheduled -> {pending, approved, rejected}
/// approved -> {sent, failed}
/// failed -> approved (retry)
/// sent and rejected are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertStatus {
    Pending,
    Approved,
    Rejected,
    Scheduled,
    Sent,
    Failed,
}

impl AlertStatus {
    /// States in which the alert still blocks a duplicate of the same type.
    pub fn is_open(&self) -> bool {
        matches!(self, AlertStatus::Pending | AlertStatus::Scheduled)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AlertStatus::Sent | AlertStatus::Rejected)
    }

    /// Whether `self -> next` is a legal edge of the state machine.
    pub fn can_transition_to(&self, next: AlertStatus) -> bool {
        use AlertStatus::*;
        matches!(
            (self, next),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Scheduled)
                | (Scheduled, Pending)
                | (Scheduled, Approved)
                | (Scheduled, Rejected)
                | (Approved, Sent)
                | (Approved, Failed)
                | (Failed, Approved)
        )
    }
}

/// A raised notification candidate awaiting human approval.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub location_id: Uuid,
    pub product_id: Uuid,
    pub alert_type: String,
    pub priority: String,
    pub message: String,
    pub status: String,
    pub trigger_reason: Option<String>,
    /// Stock figures at raise time, serialized JSON
    pub context_snapshot: Json,
    /// For scheduled alerts: when to re-enter the approval queue
    pub send_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub delivery_attempts: i32,
    pub provider_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status_enum(&self) -> Option<AlertStatus> {
        self.status.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for next in [
            AlertStatus::Pending,
            AlertStatus::Approved,
            AlertStatus::Rejected,
            AlertStatus::Scheduled,
            AlertStatus::Sent,
            AlertStatus::Failed,
        ] {
            assert!(!AlertStatus::Sent.can_transition_to(next));
            assert!(!AlertStatus::Rejected.can_transition_to(next));
        }
    }

    #[test]
    fn failed_is_retryable_to_approved_only() {
        assert!(AlertStatus::Failed.can_transition_to(AlertStatus::Approved));
        assert!(!AlertStatus::Failed.can_transition_to(AlertStatus::Sent));
        assert!(!AlertStatus::Failed.can_transition_to(AlertStatus::Pending));
    }

    #[test]
    fn priorities_follow_severity() {
        assert_eq!(AlertType::Critical.default_priority(), AlertPriority::Urgent);
        assert_eq!(AlertType::LowStock.default_priority(), AlertPriority::High);
        assert_eq!(
            AlertType::UpcomingRestock.default_priority(),
            AlertPriority::Normal
        );
        assert_eq!(AlertType::Overdue.default_priority(), AlertPriority::High);
    }
}
