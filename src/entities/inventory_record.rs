use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stock held for one (product, location) pair.
///
/// Derived columns (status, trigger reason, restock dates, stockout
/// projection) are recomputed by the stock ledger inside the same critical
/// section as every mutation; they are never updated independently.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub location_id: Uuid,
    pub current_stock: i32,
    pub minimum_stock: i32,
    pub maximum_stock: i32,
    /// Target buffer as a percentage of maximum capacity (0-100)
    pub ideal_stock_percentage: i32,
    /// Days between scheduled replenishments
    pub restock_cycle_days: i32,
    pub last_restock_date: Option<NaiveDate>,
    pub next_restock_date: Option<NaiveDate>,
    pub average_daily_sales: Decimal,
    pub unit_cost: Decimal,
    pub retail_price: Decimal,
    // Derived, refreshed on every mutation
    pub stock_status: String,
    pub needs_restock: bool,
    pub restock_trigger_reason: Option<String>,
    pub days_until_stockout: Option<i32>,
    pub projected_stockout_date: Option<NaiveDate>,
    /// Deactivation flag; records are never physically deleted
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Target buffer level: floor(maximum_stock * ideal_stock_percentage / 100)
    pub fn ideal_stock(&self) -> i32 {
        (self.maximum_stock as i64 * self.ideal_stock_percentage as i64 / 100) as i32
    }

    /// Value of stock on hand at cost
    pub fn stock_value(&self) -> Decimal {
        Decimal::from(self.current_stock) * self.unit_cost
    }

    /// Revenue if every unit on hand sold at retail
    pub fn potential_revenue(&self) -> Decimal {
        Decimal::from(self.current_stock) * self.retail_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(maximum_stock: i32, ideal_stock_percentage: i32) -> Model {
        Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            current_stock: 20,
            minimum_stock: 10,
            maximum_stock,
            ideal_stock_percentage,
            restock_cycle_days: 14,
            last_restock_date: None,
            next_restock_date: None,
            average_daily_sales: dec!(1.5),
            unit_cost: dec!(4.25),
            retail_price: dec!(9.99),
            stock_status: "healthy".into(),
            needs_restock: false,
            restock_trigger_reason: None,
            days_until_stockout: None,
            projected_stockout_date: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn ideal_stock_floors() {
        assert_eq!(record(50, 80).ideal_stock(), 40);
        assert_eq!(record(55, 33).ideal_stock(), 18); // 18.15 floors to 18
        assert_eq!(record(0, 80).ideal_stock(), 0);
    }

    #[test]
    fn valuation_uses_cost_and_retail() {
        let r = record(50, 80);
        assert_eq!(r.stock_value(), dec!(85.00));
        assert_eq!(r.potential_revenue(), dec!(199.80));
    }
}
