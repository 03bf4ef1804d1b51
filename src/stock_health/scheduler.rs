use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::policy::StockPolicy;
use crate::entities::inventory_record;

/// Where a record sits relative to its restock cycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RestockCadence {
    /// No last_restock_date on record; date-based rules do not apply
    NeverRestocked,
    /// next_restock_date is today or in the past
    Overdue,
    /// next_restock_date falls within the upcoming window
    Upcoming,
    OnTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockPlan {
    pub next_restock_date: Option<NaiveDate>,
    /// None when average_daily_sales is zero; an infinite runway is not "0 days"
    pub days_until_stockout: Option<i64>,
    pub projected_stockout_date: Option<NaiveDate>,
    pub suggested_quantity: i32,
    pub cadence: RestockCadence,
}

/// Computes the restock plan for a record as of a given date.
///
/// The suggested quantity restocks to the larger of (a) the gap to the ideal
/// buffer and (b) expected consumption over one cycle, so a fast seller is
/// never under-ordered just because it sits near its ideal level.
pub fn schedule(
    record: &inventory_record::Model,
    policy: &StockPolicy,
    as_of: NaiveDate,
) -> RestockPlan {
    let next_restock_date = record
        .last_restock_date
        .map(|last| last + Duration::days(record.restock_cycle_days as i64));

    let days_until_stockout = if record.average_daily_sales > Decimal::ZERO {
        (Decimal::from(record.current_stock) / record.average_daily_sales)
            .ceil()
            .to_i64()
    } else {
        None
    };

    let projected_stockout_date = days_until_stockout.map(|days| as_of + Duration::days(days));

    let ideal_gap = record.ideal_stock() - record.current_stock;
    let cycle_consumption = (record.average_daily_sales
        * Decimal::from(record.restock_cycle_days))
    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    .to_i32()
    .unwrap_or(i32::MAX);
    let suggested_quantity = ideal_gap.max(cycle_consumption).max(0);

    let cadence = match next_restock_date {
        None => RestockCadence::NeverRestocked,
        Some(next) => {
            let days_until = (next - as_of).num_days();
            if days_until <= 0 {
                RestockCadence::Overdue
            } else if days_until <= policy.upcoming_window_days {
                RestockCadence::Upcoming
            } else {
                RestockCadence::OnTrack
            }
        }
    };

    RestockPlan {
        next_restock_date,
        days_until_stockout,
        projected_stockout_date,
        suggested_quantity,
        cadence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn record() -> inventory_record::Model {
        inventory_record::Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            current_stock: 20,
            minimum_stock: 10,
            maximum_stock: 50,
            ideal_stock_percentage: 80,
            restock_cycle_days: 21,
            last_restock_date: None,
            next_restock_date: None,
            average_daily_sales: dec!(2),
            unit_cost: dec!(1),
            retail_price: dec!(2),
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

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    #[test]
    fn next_restock_is_last_plus_cycle() {
        let mut r = record();
        r.last_restock_date = Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        let plan = schedule(&r, &StockPolicy::default(), today());
        assert_eq!(
            plan.next_restock_date,
            Some(NaiveDate::from_ymd_opt(2026, 3, 22).unwrap())
        );
    }

    #[test]
    fn never_restocked_has_no_next_date() {
        let plan = schedule(&record(), &StockPolicy::default(), today());
        assert_eq!(plan.next_restock_date, None);
        assert_eq!(plan.cadence, RestockCadence::NeverRestocked);
    }

    #[test]
    fn suggested_quantity_covers_cycle_consumption() {
        // ideal = floor(50 * 80 / 100) = 40, gap = 20, consumption = 2 * 21 = 42
        let plan = schedule(&record(), &StockPolicy::default(), today());
        assert_eq!(plan.suggested_quantity, 42);
    }

    #[test]
    fn suggested_quantity_closes_ideal_gap_for_slow_sellers() {
        let mut r = record();
        r.average_daily_sales = dec!(0.2); // consumption = 4.2 rounds to 4
        let plan = schedule(&r, &StockPolicy::default(), today());
        assert_eq!(plan.suggested_quantity, 20);
    }

    #[test]
    fn suggested_quantity_never_negative() {
        let mut r = record();
        r.current_stock = 60; // over ideal
        r.average_daily_sales = Decimal::ZERO;
        let plan = schedule(&r, &StockPolicy::default(), today());
        assert_eq!(plan.suggested_quantity, 0);
    }

    #[test]
    fn stockout_projection_uses_ceiling() {
        let mut r = record();
        r.current_stock = 5;
        r.average_daily_sales = dec!(2); // 2.5 days -> 3
        let plan = schedule(&r, &StockPolicy::default(), today());
        assert_eq!(plan.days_until_stockout, Some(3));
        assert_eq!(plan.projected_stockout_date, Some(today() + Duration::days(3)));
    }

    #[test]
    fn zero_velocity_means_no_stockout_claim() {
        let mut r = record();
        r.average_daily_sales = Decimal::ZERO;
        let plan = schedule(&r, &StockPolicy::default(), today());
        assert_eq!(plan.days_until_stockout, None);
        assert_eq!(plan.projected_stockout_date, None);
    }

    #[test]
    fn cadence_windows() {
        let policy = StockPolicy::default();
        let mut r = record();

        r.last_restock_date = Some(today() - Duration::days(21)); // due today
        assert_eq!(schedule(&r, &policy, today()).cadence, RestockCadence::Overdue);

        r.last_restock_date = Some(today() - Duration::days(19)); // due in 2 days
        assert_eq!(schedule(&r, &policy, today()).cadence, RestockCadence::Upcoming);

        r.last_restock_date = Some(today() - Duration::days(10)); // due in 11 days
        assert_eq!(schedule(&r, &policy, today()).cadence, RestockCadence::OnTrack);
    }
}
