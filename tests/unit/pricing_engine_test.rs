// Property-based tests for plan pricing
//
// - tiered pricing splits the quantity over tiers without losing any of it
// - volume pricing uses exactly one tier for the full quantity

#[path = "../helpers/mod.rs"]
mod helpers;

use billcalc::core::AppError;
use billcalc::pricing::{Plan, PricingEngine, Tier};
use helpers::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Contiguous tiers from a list of widths; the last tier is open-ended
fn tiers_from_widths(widths: &[u64]) -> Vec<Tier> {
    let mut tiers = Vec::with_capacity(widths.len() + 1);
    let mut next_min = 1u64;
    for (index, width) in widths.iter().enumerate() {
        let max = next_min + width - 1;
        tiers.push(Tier::new(Some(next_min), Some(max), Decimal::from(100 - index as i64)));
        next_min = max + 1;
    }
    tiers.push(Tier::new(Some(next_min), None, dec!(10)));
    tiers
}

proptest! {
    /// Property: Σ entry quantities == input quantity for any valid tier list
    #[test]
    fn test_tiered_entries_cover_quantity(
        widths in prop::collection::vec(1u64..50u64, 0..6),
        quantity in 1u64..1_000u64,
    ) {
        let plan = Plan::tiered("plan", "Plan", tiers_from_widths(&widths)).unwrap();
        let entries = PricingEngine::new().price(&plan, Decimal::from(quantity), None).unwrap();

        let covered: Decimal = entries.iter().map(|entry| entry.quantity).sum();
        prop_assert_eq!(covered, Decimal::from(quantity));
        prop_assert!(entries.iter().all(|entry| entry.quantity > Decimal::ZERO));
        prop_assert!(entries.iter().all(|entry| entry.tier_description.is_some()));
    }

    /// Property: volume pricing emits one entry for the whole quantity
    #[test]
    fn test_volume_single_entry(
        widths in prop::collection::vec(1u64..50u64, 0..6),
        quantity in 1u64..1_000u64,
    ) {
        let plan = Plan::volume("plan", "Plan", tiers_from_widths(&widths)).unwrap();
        let entries = PricingEngine::new().price(&plan, Decimal::from(quantity), None).unwrap();

        prop_assert_eq!(entries.len(), 1);
        prop_assert_eq!(entries[0].quantity, Decimal::from(quantity));
    }
}

#[test]
fn test_tiered_quantity_101_yields_three_entries() {
    let plan = TestDataFactory::tiered_seats_plan();
    let entries = PricingEngine::new().price(&plan, dec!(101), None).unwrap();

    let priced: Vec<_> = entries.iter().map(|entry| (entry.quantity, entry.unit_cost)).collect();
    assert_eq!(
        priced,
        vec![(dec!(50), dec!(100)), (dec!(50), dec!(80)), (dec!(1), dec!(70))]
    );

    let tiers: Vec<_> = entries
        .iter()
        .map(|entry| entry.tier_description.as_deref().unwrap())
        .collect();
    assert_eq!(tiers, vec!["1 - 50 tier", "51 - 100 tier", "101+ tier"]);
    assert!(entries.iter().all(|entry| entry.description.as_deref() == Some("Team seats")));
}

#[test]
fn test_volume_uses_containing_tier() {
    let plan = TestDataFactory::volume_seats_plan();
    let entries = PricingEngine::new().price(&plan, dec!(75), None).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].unit_cost, dec!(80));
    assert_eq!(entries[0].quantity, dec!(75));
}

#[test]
fn test_custom_plan_requires_amount() {
    let plan = Plan::custom("consulting", "Consulting");
    let engine = PricingEngine::new();

    assert!(matches!(engine.price(&plan, dec!(2), None), Err(AppError::Pricing(_))));

    let entries = engine.price(&plan, dec!(2), Some(dec!(250))).unwrap();
    assert_eq!(entries[0].unit_cost, dec!(250));
    assert_eq!(entries[0].quantity, dec!(2));
}

#[test]
fn test_invalid_tiers_rejected_at_definition() {
    let overlapping = vec![
        Tier::new(None, Some(50), dec!(100)),
        Tier::new(Some(40), None, dec!(80)),
    ];
    assert!(matches!(Plan::tiered("p", "P", overlapping), Err(AppError::InvalidTier(_))));

    let gap = vec![
        Tier::new(None, Some(50), dec!(100)),
        Tier::new(Some(60), None, dec!(80)),
    ];
    assert!(matches!(Plan::volume("p", "P", gap), Err(AppError::InvalidTier(_))));

    let closed = vec![Tier::new(None, Some(50), dec!(100))];
    assert!(matches!(Plan::tiered("p", "P", closed), Err(AppError::InvalidTier(_))));
}
