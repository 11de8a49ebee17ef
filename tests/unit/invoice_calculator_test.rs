// Property-based and scenario tests for the invoice calculator
//
// - recalculating an unchanged document yields an identical result
// - total = subtotal - subtotal discounts + shipping + all taxes
// - item discounts use the item amount, subtotal discounts are sequential

#[path = "../helpers/mod.rs"]
mod helpers;

use billcalc::config::CalculationConfig;
use billcalc::core::{AppError, Currency, Result};
use billcalc::invoices::{CalculatedInvoice, CalculationRequest, InvoiceCalculator, LineItem, LineItemInput};
use billcalc::rates::{AppliedRate, InMemoryRateRepository, RateKind, RateRef, RateScope};
use helpers::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn calculate(calc: &CalculatedInvoice) -> CalculatedInvoice {
    InvoiceCalculator::calculate_invoice(calc).unwrap()
}

#[test]
fn test_percent_item_discount_without_tax() -> Result<()> {
    let repository = InMemoryRateRepository::new();
    let request = CalculationRequest::new(Currency::USD).with_item(
        LineItemInput::new("Widget", dec!(2), dec!(100)).with_discounts(vec![AppliedRate::percent(
            RateKind::Discount,
            RateScope::Item,
            dec!(10),
        )]),
    );

    let calc = InvoiceCalculator::new(&repository, CalculationConfig::default()).prepare(request)?;

    assert_eq!(calc.items[0].amount, dec!(200));
    assert_eq!(calc.items[0].discounts[0].amount, dec!(20));
    assert_eq!(calc.subtotal, dec!(180));
    assert_eq!(calc.total, dec!(180));
    Ok(())
}

#[test]
fn test_inclusive_tax_is_backed_out() {
    let tax = AppliedRate {
        inclusive: true,
        ..AppliedRate::percent(RateKind::Tax, RateScope::Item, dec!(20))
    };
    let item = LineItem::new("Boxed set", dec!(1), dec!(100)).with_taxes(vec![tax]);
    let calc = calculate(&CalculatedInvoice::new(Currency::USD, vec![item]));

    assert_eq!(calc.items[0].amount, dec!(83.33));
    assert_eq!(calc.items[0].taxes[0].amount, dec!(16.67));
    assert_eq!(calc.subtotal, dec!(83.33));
    assert_eq!(calc.total, dec!(100));
}

#[test]
fn test_subtotal_discounts_apply_sequentially() {
    let discount = AppliedRate::percent(RateKind::Discount, RateScope::Subtotal, dec!(10));
    let calc = CalculatedInvoice {
        discounts: vec![discount.clone().with_order(1), discount.with_order(2)],
        ..CalculatedInvoice::new(Currency::USD, vec![LineItem::new("Licence", dec!(1), dec!(1000))])
    };
    let calc = calculate(&calc);

    assert_eq!(calc.subtotal, dec!(1000));
    assert_eq!(calc.discounts[0].amount, dec!(100));
    assert_eq!(calc.discounts[1].amount, dec!(90));
    assert_eq!(calc.discount_total(), dec!(190));
    assert_eq!(calc.total, dec!(810));
}

#[test]
fn test_calculate_invoice_sorts_rates_given_out_of_order() {
    let calc = CalculatedInvoice {
        discounts: vec![
            AppliedRate::percent(RateKind::Discount, RateScope::Subtotal, dec!(10)).with_order(2),
            AppliedRate::flat(RateKind::Discount, RateScope::Subtotal, dec!(50)).with_order(1),
        ],
        ..CalculatedInvoice::new(Currency::USD, vec![LineItem::new("Licence", dec!(1), dec!(1000))])
    };
    let calc = calculate(&calc);

    // 1000 - 50 = 950, then 10% of 950
    assert_eq!(calc.discounts[0].order, Some(1));
    assert_eq!(calc.discounts[0].amount, dec!(50));
    assert_eq!(calc.discounts[1].amount, dec!(95));
    assert_eq!(calc.total, dec!(855));
}

#[test]
fn test_request_json_normalizes_bare_numbers() -> Result<()> {
    let request: CalculationRequest = serde_json::from_str(
        r#"{
            "currency": "USD",
            "items": [
                {"name": "Widget", "quantity": 3, "unit_cost": "19.99", "taxes": ["vat"]}
            ],
            "discounts": ["loyalty"],
            "shipping": 4.5
        }"#,
    )
    .unwrap();

    let repository = TestDataFactory::rate_repository();
    let calc = InvoiceCalculator::new(&repository, CalculationConfig::strict()).prepare(request)?;

    // 59.97 + 20% VAT (11.99) - 5 loyalty + 4.50 shipping
    assert_eq!(calc.items[0].amount, dec!(59.97));
    assert_eq!(calc.items[0].taxes[0].amount, dec!(11.99));
    assert_eq!(calc.discounts[0].amount, dec!(5));
    assert_eq!(calc.shipping_total(), dec!(4.5));
    assert_eq!(calc.tax_total(), dec!(11.99));
    assert_eq!(calc.total, dec!(71.46));
    Ok(())
}

#[test]
fn test_negative_total_is_an_error() {
    let calc = CalculatedInvoice {
        shipping: vec![AppliedRate::flat(RateKind::Shipping, RateScope::Subtotal, dec!(-50))],
        ..CalculatedInvoice::new(Currency::USD, vec![LineItem::new("Widget", dec!(1), dec!(10))])
    };

    match InvoiceCalculator::calculate_invoice(&calc) {
        Err(AppError::NegativeTotal { field, total }) => {
            assert_eq!(field, "shipping");
            assert_eq!(total, dec!(-40));
        }
        other => panic!("expected a negative total, got {:?}", other),
    }
}

#[test]
fn test_rates_keep_order_across_recalculation() {
    let repository = TestDataFactory::rate_repository();
    let request = CalculationRequest::new(Currency::USD)
        .with_item(LineItemInput::new("Widget", dec!(1), dec!(200)))
        .with_discounts(vec![RateRef::id("promo"), RateRef::id("loyalty")]);

    let first = InvoiceCalculator::new(&repository, CalculationConfig::default())
        .prepare(request)
        .unwrap();
    let ids: Vec<_> = first.discounts.iter().map(|rate| rate.rate_id.as_deref().unwrap()).collect();
    assert_eq!(ids, vec!["loyalty", "promo"]);

    // 200 - 5 = 195, then 10% of 195
    assert_eq!(first.discounts[1].amount, dec!(19.50));
    assert_eq!(calculate(&first), first);
}

fn any_item() -> impl Strategy<Value = LineItem> {
    (1u32..20u32, 0i64..100_000i64, 0u32..50u32, 0u32..25u32, any::<bool>()).prop_map(
        |(quantity, cents, discount, tax, taxable)| {
            let mut item = LineItem::new("Item", Decimal::from(quantity), Decimal::new(cents, 2))
                .with_discounts(vec![AppliedRate::percent(
                    RateKind::Discount,
                    RateScope::Item,
                    Decimal::from(discount),
                )])
                .with_taxes(vec![AppliedRate::percent(
                    RateKind::Tax,
                    RateScope::Item,
                    Decimal::from(tax),
                )]);
            item.taxable = taxable;
            item
        },
    )
}

proptest! {
    /// Property: calculateInvoice(calculateInvoice(x)) == calculateInvoice(x)
    #[test]
    fn test_calculation_is_idempotent(
        items in prop::collection::vec(any_item(), 1..6),
        subtotal_discount in 0u32..50u32,
        subtotal_tax in 0u32..20u32,
        shipping_cents in 0i64..5_000i64,
    ) {
        let calc = CalculatedInvoice {
            discounts: vec![AppliedRate::percent(
                RateKind::Discount,
                RateScope::Subtotal,
                Decimal::from(subtotal_discount),
            )],
            taxes: vec![AppliedRate::percent(RateKind::Tax, RateScope::Subtotal, Decimal::from(subtotal_tax))],
            shipping: vec![AppliedRate::flat(
                RateKind::Shipping,
                RateScope::Subtotal,
                Decimal::new(shipping_cents, 2),
            )],
            ..CalculatedInvoice::new(Currency::USD, items)
        };

        let first = InvoiceCalculator::calculate_invoice(&calc).unwrap();
        let second = InvoiceCalculator::calculate_invoice(&first).unwrap();

        prop_assert_eq!(&second, &first);
    }

    /// Property: total reconciles with the component sums
    #[test]
    fn test_total_reconciles(items in prop::collection::vec(any_item(), 1..6)) {
        let calc = CalculatedInvoice {
            discounts: vec![AppliedRate::percent(RateKind::Discount, RateScope::Subtotal, dec!(5))],
            ..CalculatedInvoice::new(Currency::USD, items)
        };
        let calc = InvoiceCalculator::calculate_invoice(&calc).unwrap();

        let expected = calc.subtotal - calc.discount_total() + calc.shipping_total() + calc.tax_total();
        prop_assert_eq!(calc.total, expected);
        prop_assert!(calc.total >= Decimal::ZERO);
    }
}
