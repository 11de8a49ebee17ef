use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::rates::models::rate::{Rate, RateKind, RateScope};

/// A discount, tax or shipping charge attached to a line item or the subtotal.
///
/// `value` is authoritative: a percentage when `is_percent`, otherwise the
/// flat amount. `amount` is derived by the calculator on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRate {
    pub kind: RateKind,
    pub scope: RateScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_percent: bool,
    pub value: Decimal,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub inclusive: bool,
}

impl AppliedRate {
    /// Lock in a resolved rate's current value
    pub fn from_rate(rate: &Rate, scope: RateScope) -> Self {
        Self {
            kind: rate.kind,
            scope,
            rate_id: Some(rate.id.clone()),
            name: Some(rate.name.clone()),
            is_percent: rate.is_percent,
            value: rate.value,
            amount: Decimal::ZERO,
            order: rate.order,
            inclusive: rate.inclusive,
        }
    }

    /// Ad-hoc flat amount with no backing rate
    pub fn flat(kind: RateKind, scope: RateScope, amount: Decimal) -> Self {
        Self {
            kind,
            scope,
            rate_id: None,
            name: None,
            is_percent: false,
            value: amount,
            amount: Decimal::ZERO,
            order: None,
            inclusive: false,
        }
    }

    pub fn percent(kind: RateKind, scope: RateScope, value: Decimal) -> Self {
        Self {
            is_percent: true,
            ..Self::flat(kind, scope, value)
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Inline rate object as it appears in a calculation request.
///
/// Carrying a `value` means the rate is already locked in and is never
/// re-resolved. `amount` alone is a flat charge. A bare `rate_id` is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRate {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub rate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_percent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub inclusive: bool,
}

impl From<AppliedRate> for InlineRate {
    fn from(rate: AppliedRate) -> Self {
        Self {
            rate_id: rate.rate_id,
            name: rate.name,
            is_percent: rate.is_percent,
            value: Some(rate.value),
            amount: None,
            order: rate.order,
            inclusive: rate.inclusive,
        }
    }
}

/// Element of a rate list: a bare identifier or an inline object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateRef {
    Id(String),
    Inline(InlineRate),
}

impl RateRef {
    pub fn id(id: impl Into<String>) -> Self {
        RateRef::Id(id.into())
    }

    pub fn flat(amount: Decimal) -> Self {
        RateRef::Inline(InlineRate {
            amount: Some(amount),
            ..InlineRate::default()
        })
    }
}

impl From<AppliedRate> for RateRef {
    fn from(rate: AppliedRate) -> Self {
        RateRef::Inline(rate.into())
    }
}

/// Request field accepting either a bare number or a list of rate references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateField {
    Flat(Decimal),
    List(Vec<RateRef>),
}

impl RateField {
    /// Normalise into a rate list; a bare number becomes `[{amount: n}]`
    pub fn into_refs(self) -> Vec<RateRef> {
        match self {
            RateField::Flat(amount) => vec![RateRef::flat(amount)],
            RateField::List(refs) => refs,
        }
    }
}

impl Default for RateField {
    fn default() -> Self {
        RateField::List(Vec::new())
    }
}

impl From<Vec<RateRef>> for RateField {
    fn from(refs: Vec<RateRef>) -> Self {
        RateField::List(refs)
    }
}

impl From<Vec<AppliedRate>> for RateField {
    fn from(rates: Vec<AppliedRate>) -> Self {
        RateField::List(rates.into_iter().map(RateRef::from).collect())
    }
}
