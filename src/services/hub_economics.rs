use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Viability thresholds for hub scenarios. Named and overridable via the
/// `hub_policy` config section rather than wired into the formulas.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HubPolicy {
    /// Default bulk shipment cadence when a scenario does not override it
    #[serde(default = "default_bulk_shipments_per_month")]
    pub bulk_shipments_per_month: u32,

    /// Hubs never pay off below this roster size
    #[serde(default = "default_min_store_count")]
    pub min_store_count: u32,

    #[serde(default = "default_good_break_even_months")]
    pub good_break_even_months: i64,

    #[serde(default = "default_good_min_savings")]
    pub good_min_savings: Decimal,

    #[serde(default = "default_excellent_break_even_months")]
    pub excellent_break_even_months: i64,

    #[serde(default = "default_excellent_min_savings")]
    pub excellent_min_savings: Decimal,
}

fn default_bulk_shipments_per_month() -> u32 {
    4
}
fn default_min_store_count() -> u32 {
    3
}
fn default_good_break_even_months() -> i64 {
    24
}
fn default_good_min_savings() -> Decimal {
    dec!(100)
}
fn default_excellent_break_even_months() -> i64 {
    12
}
fn default_excellent_min_savings() -> Decimal {
    dec!(300)
}

impl Default for HubPolicy {
    fn default() -> Self {
        Self {
            bulk_shipments_per_month: default_bulk_shipments_per_month(),
            min_store_count: default_min_store_count(),
            good_break_even_months: default_good_break_even_months(),
            good_min_savings: default_good_min_savings(),
            excellent_break_even_months: default_excellent_break_even_months(),
            excellent_min_savings: default_excellent_min_savings(),
        }
    }
}

/// What-if inputs for routing deliveries through a regional hub.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HubScenario {
    pub store_count: u32,
    pub commission_rate_percent: Decimal,
    pub monthly_storage_fee: Decimal,
    pub setup_cost: Decimal,
    pub direct_shipment_cost: Decimal,
    pub bulk_discount_percent: Decimal,
    pub local_delivery_cost: Decimal,
    pub average_order_value: Decimal,
    pub shipments_per_store_per_month: u32,
    /// Bulk head-office-to-hub cadence; falls back to the policy default
    #[serde(default)]
    pub bulk_shipments_per_month: Option<u32>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ViabilityRating {
    Excellent,
    Good,
    Poor,
    NotViable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HubEvaluation {
    pub current_monthly_cost: Decimal,
    pub projected_monthly_cost: Decimal,
    pub monthly_savings: Decimal,
    /// None when savings are not positive or there is no setup cost to recoup
    pub break_even_months: Option<i64>,
    /// Percentage; None when setup_cost is zero
    pub roi_12_month: Option<Decimal>,
    pub viability_rating: ViabilityRating,
}

const HUNDRED: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Compares direct shipping against hub-mediated delivery for one scenario.
///
/// Stateless and side-effect free; callers run it repeatedly with varied
/// inputs for what-if comparison.
pub fn evaluate(scenario: &HubScenario, policy: &HubPolicy) -> HubEvaluation {
    let store_count = Decimal::from(scenario.store_count);
    let shipments = Decimal::from(scenario.shipments_per_store_per_month);
    let bulk_cadence = Decimal::from(
        scenario
            .bulk_shipments_per_month
            .unwrap_or(policy.bulk_shipments_per_month),
    );

    let current_monthly_cost = store_count * shipments * scenario.direct_shipment_cost;

    let bulk_shipment_cost = bulk_cadence
        * (store_count
            * scenario.direct_shipment_cost
            * (Decimal::ONE - scenario.bulk_discount_percent / HUNDRED));
    let local_delivery_cost = store_count * shipments * scenario.local_delivery_cost;
    let hub_commission = store_count
        * shipments
        * scenario.average_order_value
        * (scenario.commission_rate_percent / HUNDRED);

    let projected_monthly_cost =
        bulk_shipment_cost + local_delivery_cost + hub_commission + scenario.monthly_storage_fee;

    let monthly_savings = current_monthly_cost - projected_monthly_cost;

    let break_even_months = if scenario.setup_cost > Decimal::ZERO
        && monthly_savings > Decimal::ZERO
    {
        (scenario.setup_cost / monthly_savings).ceil().to_i64()
    } else {
        None
    };

    let roi_12_month = if scenario.setup_cost > Decimal::ZERO {
        Some(
            (monthly_savings * MONTHS_PER_YEAR / scenario.setup_cost * HUNDRED).round_dp(2),
        )
    } else {
        None
    };

    let viability_rating = rate(scenario.store_count, monthly_savings, break_even_months, policy);

    HubEvaluation {
        current_monthly_cost: current_monthly_cost.round_dp(2),
        projected_monthly_cost: projected_monthly_cost.round_dp(2),
        monthly_savings: monthly_savings.round_dp(2),
        break_even_months,
        roi_12_month,
        viability_rating,
    }
}

fn rate(
    store_count: u32,
    monthly_savings: Decimal,
    break_even_months: Option<i64>,
    policy: &HubPolicy,
) -> ViabilityRating {
    if store_count < policy.min_store_count || monthly_savings <= Decimal::ZERO {
        return ViabilityRating::NotViable;
    }
    match break_even_months {
        Some(months)
            if months <= policy.excellent_break_even_months
                && monthly_savings >= policy.excellent_min_savings =>
        {
            ViabilityRating::Excellent
        }
        Some(months)
            if months <= policy.good_break_even_months
                && monthly_savings >= policy.good_min_savings =>
        {
            ViabilityRating::Good
        }
        _ => ViabilityRating::Poor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> HubScenario {
        HubScenario {
            store_count: 8,
            commission_rate_percent: dec!(2),
            monthly_storage_fee: dec!(150),
            setup_cost: dec!(2000),
            direct_shipment_cost: dec!(45),
            bulk_discount_percent: dec!(40),
            local_delivery_cost: dec!(8),
            average_order_value: dec!(120),
            shipments_per_store_per_month: 4,
            bulk_shipments_per_month: None,
        }
    }

    #[test]
    fn direct_cost_is_stores_times_shipments_times_rate() {
        let eval = evaluate(&scenario(), &HubPolicy::default());
        // 8 * 4 * 45
        assert_eq!(eval.current_monthly_cost, dec!(1440.00));
    }

    #[test]
    fn projected_cost_sums_all_hub_components() {
        let eval = evaluate(&scenario(), &HubPolicy::default());
        // bulk: 4 * (8 * 45 * 0.6) = 864
        // local: 8 * 4 * 8 = 256
        // commission: 8 * 4 * 120 * 0.02 = 76.8
        // storage: 150
        assert_eq!(eval.projected_monthly_cost, dec!(1346.80));
        assert_eq!(eval.monthly_savings, dec!(93.20));
    }

    #[test]
    fn break_even_uses_ceiling() {
        // 2000 / 93.20 = 21.46 -> 22 months
        let eval = evaluate(&scenario(), &HubPolicy::default());
        assert_eq!(eval.break_even_months, Some(22));
        // savings fall short of the GOOD floor of 100/month
        assert_eq!(eval.viability_rating, ViabilityRating::Poor);
    }

    #[test]
    fn small_rosters_are_never_viable() {
        let mut s = scenario();
        s.store_count = 2;
        let eval = evaluate(&s, &HubPolicy::default());
        assert_eq!(eval.viability_rating, ViabilityRating::NotViable);
    }

    #[test]
    fn negative_savings_are_not_viable_and_have_no_break_even() {
        let mut s = scenario();
        s.monthly_storage_fee = dec!(5000);
        let eval = evaluate(&s, &HubPolicy::default());
        assert!(eval.monthly_savings < Decimal::ZERO);
        assert_eq!(eval.break_even_months, None);
        assert_eq!(eval.viability_rating, ViabilityRating::NotViable);
        // ROI is still reported against the setup cost
        assert!(eval.roi_12_month.unwrap() < Decimal::ZERO);
    }

    #[test]
    fn zero_setup_cost_yields_no_break_even_or_roi() {
        let mut s = scenario();
        s.setup_cost = Decimal::ZERO;
        let eval = evaluate(&s, &HubPolicy::default());
        assert_eq!(eval.break_even_months, None);
        assert_eq!(eval.roi_12_month, None);
        // a missing break-even rates POOR even with positive savings
        assert_eq!(eval.viability_rating, ViabilityRating::Poor);
    }

    #[test]
    fn slow_payback_on_small_margin_rates_poor() {
        // Three stores passes the roster gate, but ceil(5000/31) = 162 months
        // is far past the 24-month GOOD ceiling.
        let rating = rate(3, dec!(31), Some(162), &HubPolicy::default());
        assert_eq!(rating, ViabilityRating::Poor);
    }

    #[test]
    fn strong_savings_and_fast_payback_rate_excellent() {
        let mut s = scenario();
        s.store_count = 20;
        s.monthly_storage_fee = dec!(100);
        s.setup_cost = dec!(3000);
        let eval = evaluate(&s, &HubPolicy::default());
        // current: 20*4*45 = 3600
        // bulk: 4*(20*45*0.6) = 2160; local: 640; commission: 192; storage: 100
        // projected 3092, savings 508, break-even ceil(3000/508)=6
        assert_eq!(eval.monthly_savings, dec!(508.00));
        assert_eq!(eval.break_even_months, Some(6));
        assert_eq!(eval.viability_rating, ViabilityRating::Excellent);
    }

    #[test]
    fn bulk_cadence_override_changes_projection() {
        let mut s = scenario();
        s.bulk_shipments_per_month = Some(2);
        let eval = evaluate(&s, &HubPolicy::default());
        // bulk halves to 432; projected 914.8, savings 525.2
        assert_eq!(eval.monthly_savings, dec!(525.20));
    }
}
