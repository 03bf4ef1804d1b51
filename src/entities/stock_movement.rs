use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter as StrumEnumIter, EnumString};
use uuid::Uuid;

/// Kinds of stock movement the ledger accepts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    StrumEnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MovementType {
    /// Head office or hub to store; stamps the destination's restock date
    Transfer,
    /// Absolute stock set at the destination, exempt from the
    /// insufficient-stock check
    Adjustment,
    Sale,
    Return,
    Wastage,
    /// Unscheduled replenishment; also raises an emergency_request alert
    Emergency,
}

impl MovementType {
    /// Movement kinds that count as a replenishment of the destination.
    pub fn is_restock(&self) -> bool {
        matches!(self, MovementType::Transfer | MovementType::Emergency)
    }
}

/// Immutable audit row for a single quantity change.
///
/// Created in the same transaction as the record mutation it describes and
/// never updated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    /// Null for external inbound
    pub from_location_id: Option<Uuid>,
    /// Null for wastage/loss
    pub to_location_id: Option<Uuid>,
    pub quantity: i32,
    pub movement_type: String,
    pub movement_date: NaiveDate,
    pub reason: Option<String>,
    pub created_by: Option<String>,
    pub source_stock_before: Option<i32>,
    pub source_stock_after: Option<i32>,
    pub destination_stock_before: Option<i32>,
    pub destination_stock_after: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn movement_type_round_trips_as_snake_case() {
        assert_eq!(MovementType::Transfer.as_ref(), "transfer");
        assert_eq!(
            MovementType::from_str("emergency").unwrap(),
            MovementType::Emergency
        );
        assert!(MovementType::from_str("teleport").is_err());
    }

    #[test]
    fn only_transfers_and_emergencies_restock() {
        assert!(MovementType::Transfer.is_restock());
        assert!(MovementType::Emergency.is_restock());
        assert!(!MovementType::Sale.is_restock());
        assert!(!MovementType::Adjustment.is_restock());
    }
}
