use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use restock_api::entities::inventory_record;
use restock_api::services::hub_economics::{evaluate, HubPolicy, HubScenario, ViabilityRating};
use restock_api::stock_health::{classify, schedule, StockPolicy, StockStatus};

fn record(
    current: i32,
    minimum: i32,
    maximum: i32,
    pct: i32,
    cycle: i32,
    avg: Decimal,
    last_restock: Option<NaiveDate>,
) -> inventory_record::Model {
    let now = Utc::now();
    inventory_record::Model {
        id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        location_id: Uuid::new_v4(),
        current_stock: current,
        minimum_stock: minimum,
        maximum_stock: maximum,
        ideal_stock_percentage: pct,
        restock_cycle_days: cycle,
        last_restock_date: last_restock,
        next_restock_date: None,
        average_daily_sales: avg,
        unit_cost: Decimal::ONE,
        retail_price: Decimal::TWO,
        stock_status: String::new(),
        needs_restock: false,
        restock_trigger_reason: None,
        days_until_stockout: None,
        projected_stockout_date: None,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
}

proptest! {
    #[test]
    fn classification_is_total_and_reasons_accompany_restock_flags(
        current in 0i32..5000,
        minimum in 0i32..500,
        maximum in 1i32..5000,
    ) {
        let rec = record(current, minimum, maximum, 80, 14, Decimal::ONE, None);
        let assessment = classify(&rec, &StockPolicy::default(), today());

        if assessment.needs_restock {
            prop_assert!(assessment.trigger_reason.is_some());
        }
        if assessment.status == StockStatus::Critical || assessment.status == StockStatus::Low {
            prop_assert!(current <= minimum);
        }
    }

    #[test]
    fn critical_threshold_sits_inside_the_low_band(
        minimum in 1i32..500,
    ) {
        // At exactly half the minimum the severity tie resolves to critical.
        let half = minimum / 2;
        let rec = record(half, minimum, minimum * 10, 80, 14, Decimal::ONE, None);
        let assessment = classify(&rec, &StockPolicy::default(), today());
        prop_assert_eq!(assessment.status, StockStatus::Critical);
    }

    #[test]
    fn suggested_quantity_is_never_negative(
        current in 0i32..10_000,
        maximum in 1i32..10_000,
        pct in 0i32..=100,
        cycle in 1i32..120,
        avg_tenths in 0i64..500,
    ) {
        let rec = record(
            current,
            0,
            maximum,
            pct,
            cycle,
            Decimal::new(avg_tenths, 1),
            None,
        );
        let plan = schedule(&rec, &StockPolicy::default(), today());
        prop_assert!(plan.suggested_quantity >= 0);
    }

    #[test]
    fn stockout_projection_exists_exactly_when_sales_are_positive(
        current in 0i32..10_000,
        avg_tenths in 0i64..500,
    ) {
        let avg = Decimal::new(avg_tenths, 1);
        let rec = record(current, 0, 10_000, 80, 14, avg, None);
        let plan = schedule(&rec, &StockPolicy::default(), today());
        prop_assert_eq!(plan.days_until_stockout.is_some(), avg > Decimal::ZERO);
        prop_assert_eq!(
            plan.projected_stockout_date.is_some(),
            avg > Decimal::ZERO
        );
    }

    #[test]
    fn ideal_stock_never_exceeds_maximum(
        maximum in 0i32..100_000,
        pct in 0i32..=100,
    ) {
        let rec = record(0, 0, maximum, pct, 14, Decimal::ONE, None);
        let ideal = rec.ideal_stock();
        prop_assert!(ideal >= 0);
        prop_assert!(ideal <= maximum);
    }

    #[test]
    fn break_even_exists_only_with_positive_savings_and_setup_cost(
        store_count in 0u32..60,
        direct_cents in 100i64..50_000,
        discount in 0i64..=90,
        local_cents in 0i64..20_000,
        storage_cents in 0i64..500_000,
        setup_cents in 0i64..5_000_000,
    ) {
        let scenario = HubScenario {
            store_count,
            commission_rate_percent: Decimal::new(2, 0),
            monthly_storage_fee: Decimal::new(storage_cents, 2),
            setup_cost: Decimal::new(setup_cents, 2),
            direct_shipment_cost: Decimal::new(direct_cents, 2),
            bulk_discount_percent: Decimal::new(discount, 0),
            local_delivery_cost: Decimal::new(local_cents, 2),
            average_order_value: Decimal::new(50_000, 2),
            shipments_per_store_per_month: 4,
            bulk_shipments_per_month: None,
        };
        let policy = HubPolicy::default();
        let eval = evaluate(&scenario, &policy);

        if eval.break_even_months.is_some() {
            prop_assert!(eval.monthly_savings > Decimal::ZERO);
            prop_assert!(scenario.setup_cost > Decimal::ZERO);
        }
        if store_count < policy.min_store_count {
            prop_assert_eq!(eval.viability_rating, ViabilityRating::NotViable);
        }
    }
}
