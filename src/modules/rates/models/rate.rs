use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    Discount,
    Tax,
    Shipping,
}

/// Where an applied rate attaches: a single line item or the document subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateScope {
    Item,
    Subtotal,
}

impl RateScope {
    /// Sort rank: item-scoped rates come before subtotal-scoped ones
    pub fn rank(&self) -> u8 {
        match self {
            RateScope::Item => 0,
            RateScope::Subtotal => 1,
        }
    }
}

/// Rate definition as returned by the rate repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub id: String,
    pub name: String,
    pub kind: RateKind,
    pub is_percent: bool,
    /// Percentage (e.g. `10` for 10%) or flat amount
    pub value: Decimal,
    #[serde(default)]
    pub inclusive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Rate {
    pub fn percent(id: impl Into<String>, name: impl Into<String>, kind: RateKind, value: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            is_percent: true,
            value,
            inclusive: false,
            order: None,
        }
    }

    pub fn flat(id: impl Into<String>, name: impl Into<String>, kind: RateKind, value: Decimal) -> Self {
        Self {
            is_percent: false,
            ..Self::percent(id, name, kind, value)
        }
    }

    pub fn inclusive(mut self) -> Self {
        self.inclusive = true;
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }
}
