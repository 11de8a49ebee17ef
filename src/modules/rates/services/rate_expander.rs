use std::cmp::Ordering;
use std::collections::HashSet;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::{AppError, Result};
use crate::modules::rates::models::{AppliedRate, InlineRate, RateKind, RateRef, RateScope};
use crate::modules::rates::repositories::RateResolver;

/// Resolves rate references into ordered, de-duplicated applied rates
pub struct RateExpander<'a> {
    resolver: &'a dyn RateResolver,
    strict: bool,
}

impl<'a> RateExpander<'a> {
    /// Non-strict expander: unresolvable ids are dropped
    pub fn new(resolver: &'a dyn RateResolver) -> Self {
        Self {
            resolver,
            strict: false,
        }
    }

    /// Strict expander for document creation: unresolvable ids fail with `UnknownRate`
    pub fn strict(resolver: &'a dyn RateResolver) -> Self {
        Self {
            resolver,
            strict: true,
        }
    }

    pub fn with_strict(resolver: &'a dyn RateResolver, strict: bool) -> Self {
        Self { resolver, strict }
    }

    /// Expand a list of references of one `kind` attached at `scope`.
    ///
    /// Ids are resolved and locked in, duplicates (by resolved id) after the
    /// first occurrence are dropped, and the result is sorted with
    /// [`RateExpander::compare`].
    pub fn expand_list(
        &self,
        refs: &[RateRef],
        kind: RateKind,
        scope: RateScope,
    ) -> Result<Vec<AppliedRate>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut expanded = Vec::with_capacity(refs.len());

        for reference in refs {
            let Some(rate) = self.expand_one(reference, kind, scope)? else {
                continue;
            };

            if let Some(id) = &rate.rate_id {
                if !seen.insert(id.clone()) {
                    debug!(rate_id = %id, ?kind, "dropping duplicate rate");
                    continue;
                }
            }

            expanded.push(rate);
        }

        Self::sort(&mut expanded);
        Ok(expanded)
    }

    fn expand_one(
        &self,
        reference: &RateRef,
        kind: RateKind,
        scope: RateScope,
    ) -> Result<Option<AppliedRate>> {
        match reference {
            RateRef::Id(id) => self.resolve(id, None, kind, scope),
            RateRef::Inline(inline) => self.expand_inline(inline, kind, scope),
        }
    }

    fn expand_inline(
        &self,
        inline: &InlineRate,
        kind: RateKind,
        scope: RateScope,
    ) -> Result<Option<AppliedRate>> {
        let locked_value = match (inline.value, inline.amount) {
            (Some(value), _) => Some((inline.is_percent, value)),
            (None, Some(amount)) => Some((false, amount)),
            (None, None) => None,
        };

        match (locked_value, &inline.rate_id) {
            (Some((is_percent, value)), _) => Ok(Some(AppliedRate {
                kind,
                scope,
                rate_id: inline.rate_id.clone(),
                name: inline.name.clone(),
                is_percent,
                value,
                amount: Decimal::ZERO,
                order: inline.order,
                inclusive: inline.inclusive,
            })),
            (None, Some(id)) => self.resolve(id, inline.order, kind, scope),
            (None, None) => Err(AppError::validation(format!(
                "{:?} rate needs an id, a value or an amount",
                kind
            ))),
        }
    }

    fn resolve(
        &self,
        id: &str,
        order_override: Option<i64>,
        kind: RateKind,
        scope: RateScope,
    ) -> Result<Option<AppliedRate>> {
        let rate = self.resolver.resolve(id).filter(|rate| rate.kind == kind);

        match rate {
            Some(rate) => {
                let mut applied = AppliedRate::from_rate(&rate, scope);
                if order_override.is_some() {
                    applied.order = order_override;
                }
                Ok(Some(applied))
            }
            None if self.strict => Err(AppError::unknown_rate(id)),
            None => {
                warn!(rate_id = %id, ?kind, "rate no longer exists, dropping it");
                Ok(None)
            }
        }
    }

    /// Sort key: item-scoped before subtotal-scoped, then ascending `order`.
    /// Rates without an `order` follow the ordered ones of the same scope.
    pub fn sort_key(rate: &AppliedRate) -> (u8, bool, i64) {
        (
            rate.scope.rank(),
            rate.order.is_none(),
            rate.order.unwrap_or_default(),
        )
    }

    pub fn compare(a: &AppliedRate, b: &AppliedRate) -> Ordering {
        Self::sort_key(a).cmp(&Self::sort_key(b))
    }

    /// Stable sort; rates with equal keys keep their input order
    pub fn sort(rates: &mut [AppliedRate]) {
        rates.sort_by(Self::compare);
    }
}
