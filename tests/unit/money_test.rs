// Property-based tests for Money
//
// - fromDecimal(c, d).toDecimal() == round(d, precision(c)) for representable d
// - arithmetic between two currencies always fails
// - overflow is reported, never wrapped

use billcalc::core::{AppError, Currency, Money};
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

fn any_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::JPY),
        Just(Currency::IDR),
        Just(Currency::KWD),
        Just(Currency::MYR),
    ]
}

proptest! {
    /// Property: round-trip through minor units equals half-away-from-zero rounding
    #[test]
    fn test_round_trip_matches_currency_rounding(
        currency in any_currency(),
        mantissa in -1_000_000_000_000i64..1_000_000_000_000i64,
        scale in 0u32..8u32,
    ) {
        let amount = Decimal::new(mantissa, scale);
        let money = Money::from_decimal(currency, amount).unwrap();
        let expected = amount.round_dp_with_strategy(
            currency.scale(),
            RoundingStrategy::MidpointAwayFromZero,
        );

        prop_assert_eq!(money.to_decimal(), expected);
        prop_assert_eq!(money.to_decimal().scale(), currency.scale());
    }

    /// Property: add then subtract returns the original value
    #[test]
    fn test_add_subtract_inverse(
        a in -1_000_000_000i64..1_000_000_000i64,
        b in -1_000_000_000i64..1_000_000_000i64,
    ) {
        let a = Money::new(Currency::USD, a);
        let b = Money::new(Currency::USD, b);

        prop_assert_eq!(a.add(&b).unwrap().subtract(&b).unwrap(), a);
        prop_assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
    }

    /// Property: max/min pick one of the operands
    #[test]
    fn test_max_min_ordering(
        a in -1_000_000i64..1_000_000i64,
        b in -1_000_000i64..1_000_000i64,
    ) {
        let a = Money::new(Currency::EUR, a);
        let b = Money::new(Currency::EUR, b);

        let max = a.max(&b).unwrap();
        let min = a.min(&b).unwrap();
        prop_assert!(!min.greater_than(&max).unwrap());
        prop_assert_eq!(max.add(&min).unwrap(), a.add(&b).unwrap());
    }
}

#[test]
fn test_currency_mismatch_on_every_binary_operation() {
    let usd = Money::new(Currency::USD, 100);
    let eur = Money::new(Currency::EUR, 100);
    let mismatch = AppError::CurrencyMismatch {
        expected: Currency::USD,
        found: Currency::EUR,
    };

    assert_eq!(usd.add(&eur).unwrap_err(), mismatch);
    assert_eq!(usd.subtract(&eur).unwrap_err(), mismatch);
    assert_eq!(usd.max(&eur).unwrap_err(), mismatch);
    assert_eq!(usd.min(&eur).unwrap_err(), mismatch);
    assert_eq!(usd.greater_than(&eur).unwrap_err(), mismatch);
}

#[test]
fn test_overflow_is_an_error() {
    let max = Money::new(Currency::USD, i64::MAX);
    assert!(matches!(max.add(&Money::new(Currency::USD, 1)), Err(AppError::Overflow(_))));
    assert!(matches!(
        Money::from_decimal(Currency::USD, Decimal::MAX),
        Err(AppError::Overflow(_))
    ));
}

#[test]
fn test_rounding_examples() {
    let cases = [
        (Currency::USD, dec!(10.005), dec!(10.01)),
        (Currency::USD, dec!(-10.005), dec!(-10.01)),
        (Currency::JPY, dec!(2.5), dec!(3)),
        (Currency::KWD, dec!(1.2345), dec!(1.235)),
    ];

    for (currency, input, expected) in cases {
        let money = Money::from_decimal(currency, input).unwrap();
        assert_eq!(money.to_decimal(), expected, "{} {}", currency, input);
    }
}

#[test]
fn test_display() {
    let money = Money::from_decimal(Currency::USD, dec!(1000.5)).unwrap();
    assert_eq!(money.to_string(), "USD 1000.50");
}
