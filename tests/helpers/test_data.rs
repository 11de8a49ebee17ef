// Test Data Factory
//
// Plans, rates and subscription snapshots reused across test targets.

use billcalc::core::Currency;
use billcalc::pricing::{Plan, Tier};
use billcalc::rates::{InMemoryRateRepository, Rate, RateKind};
use billcalc::subscriptions::SubscriptionSnapshot;
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Test data factory for calculation inputs
pub struct TestDataFactory;

impl TestDataFactory {
    /// Tiers `[≤50 @100, 51–100 @80, 101+ @70]`
    pub fn seat_tiers() -> Vec<Tier> {
        vec![
            Tier::new(None, Some(50), dec!(100)),
            Tier::new(Some(51), Some(100), dec!(80)),
            Tier::new(Some(101), None, dec!(70)),
        ]
    }

    pub fn tiered_seats_plan() -> Plan {
        Plan::tiered("seats", "Seats", Self::seat_tiers())
            .expect("seat tiers are valid")
            .with_description("Team seats")
    }

    pub fn volume_seats_plan() -> Plan {
        Plan::volume("seats-volume", "Seats (volume)", Self::seat_tiers()).expect("seat tiers are valid")
    }

    pub fn starter_plan() -> Plan {
        Plan::per_unit("starter", "Starter", dec!(100))
    }

    pub fn pro_plan() -> Plan {
        Plan::per_unit("pro", "Pro", dec!(150))
    }

    /// VAT 20%, state tax 6.25%, promo 10% (order 2), loyalty $5 (order 1)
    /// and flat shipping $7.50
    pub fn rate_repository() -> InMemoryRateRepository {
        InMemoryRateRepository::with_rates([
            Rate::percent("vat", "VAT", RateKind::Tax, dec!(20)),
            Rate::percent("state", "State tax", RateKind::Tax, dec!(6.25)).with_order(1),
            Rate::percent("promo", "Promo", RateKind::Discount, dec!(10)).with_order(2),
            Rate::flat("loyalty", "Loyalty", RateKind::Discount, dec!(5)).with_order(1),
            Rate::flat("ground", "Ground shipping", RateKind::Shipping, dec!(7.50)),
        ])
    }

    /// Start of a 30-day billing period
    pub fn period_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()
    }

    pub fn period_end() -> DateTime<Utc> {
        Self::period_start() + Duration::days(30)
    }

    /// `days` into the billing period
    pub fn day(days: i64) -> DateTime<Utc> {
        Self::period_start() + Duration::days(days)
    }

    pub fn snapshot(plan: Plan, quantity: Decimal) -> SubscriptionSnapshot {
        SubscriptionSnapshot::new(
            "sub_test",
            Currency::USD,
            plan,
            quantity,
            Self::period_start(),
            Self::period_end(),
        )
    }
}
