use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

fn default_critical_ratio() -> Decimal {
    dec!(0.5)
}

fn default_upcoming_window_days() -> i64 {
    3
}

/// Named thresholds driving classification and scheduling.
///
/// Business rules, not code constants: deserialized from the `stock_policy`
/// config section so a deployment can tighten them without a rebuild.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StockPolicy {
    /// A record is CRITICAL when current_stock <= minimum_stock * critical_ratio
    #[serde(default = "default_critical_ratio")]
    pub critical_ratio: Decimal,

    /// Days before next_restock_date within which a restock counts as "upcoming"
    #[serde(default = "default_upcoming_window_days")]
    pub upcoming_window_days: i64,
}

impl Default for StockPolicy {
    fn default() -> Self {
        Self {
            critical_ratio: default_critical_ratio(),
            upcoming_window_days: default_upcoming_window_days(),
        }
    }
}
