use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::policy::StockPolicy;
use crate::entities::inventory_record;

/// Stock health label for one inventory record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    Critical,
    Low,
    Healthy,
    Overstocked,
}

/// The specific condition that flagged a record for restock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TriggerReason {
    StockCritical,
    StockLow,
    DateDue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAssessment {
    pub status: StockStatus,
    pub trigger_reason: Option<TriggerReason>,
    pub needs_restock: bool,
}

/// Classifies a record's stock health. Ordered rules, first match wins;
/// ties resolve to the more severe category.
///
/// A minimum_stock of zero is legal and never trips the stock-based rules
/// (current_stock cannot go below zero). A missing next_restock_date never
/// trips the date rule; the scheduler flags that record as never restocked.
pub fn classify(
    record: &inventory_record::Model,
    policy: &StockPolicy,
    today: NaiveDate,
) -> StockAssessment {
    let current = Decimal::from(record.current_stock);
    let minimum = Decimal::from(record.minimum_stock);

    if record.minimum_stock > 0 && current <= minimum * policy.critical_ratio {
        return StockAssessment {
            status: StockStatus::Critical,
            trigger_reason: Some(TriggerReason::StockCritical),
            needs_restock: true,
        };
    }

    if record.minimum_stock > 0 && record.current_stock <= record.minimum_stock {
        return StockAssessment {
            status: StockStatus::Low,
            trigger_reason: Some(TriggerReason::StockLow),
            needs_restock: true,
        };
    }

    if record.current_stock > record.maximum_stock {
        return StockAssessment {
            status: StockStatus::Overstocked,
            trigger_reason: None,
            needs_restock: false,
        };
    }

    let date_due = record
        .next_restock_date
        .map(|next| next <= today)
        .unwrap_or(false);

    StockAssessment {
        status: StockStatus::Healthy,
        trigger_reason: date_due.then_some(TriggerReason::DateDue),
        needs_restock: date_due,
    }
}
