use std::collections::HashMap;

use crate::core::Resolver;
use crate::modules::rates::models::Rate;

/// Resolver the expander uses to turn rate ids into rate snapshots
pub trait RateResolver: Resolver<Rate> {}

impl<T: Resolver<Rate> + ?Sized> RateResolver for T {}

/// Caller-owned, request-scoped rate store.
///
/// Resolution returns a clone, so later edits to the stored rate never
/// reach rates that were already expanded.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateRepository {
    rates: HashMap<String, Rate>,
}

impl InMemoryRateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rates(rates: impl IntoIterator<Item = Rate>) -> Self {
        let mut repository = Self::new();
        for rate in rates {
            repository.upsert(rate);
        }
        repository
    }

    /// Insert or replace a rate, returning the previous definition
    pub fn upsert(&mut self, rate: Rate) -> Option<Rate> {
        self.rates.insert(rate.id.clone(), rate)
    }

    pub fn remove(&mut self, id: &str) -> Option<Rate> {
        self.rates.remove(id)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Resolver<Rate> for InMemoryRateRepository {
    fn resolve(&self, id: &str) -> Option<Rate> {
        self.rates.get(id).cloned()
    }
}
