//! Rate table providers

use crate::currency::CurrencyCode;
use crate::error::{DutyError, Result};
use hashbrown::HashMap;

/// A rate table quoted against a base currency:
/// code → units of that currency per 1 base-currency unit
pub type RateTable = HashMap<CurrencyCode, f64>;

/// Source of FX rate tables
///
/// Implementations wrap whatever rate feed the store uses. Fetches
/// happen behind the converter's TTL cache, so a provider is only hit
/// on cache misses and manual refreshes. A fetch failure is reported as
/// an error here but swallowed by the converter.
pub trait RateTableProvider: Send + Sync {
    /// Stable identifier, used in the cache key
    fn provider_id(&self) -> &str;

    /// Fetch the full table quoted against `base`
    fn fetch(&self, base: &CurrencyCode) -> Result<RateTable>;
}

/// Fixed in-memory rate table
///
/// Backs tests and stores that configure rates by hand rather than
/// subscribing to a feed.
#[derive(Debug, Clone)]
pub struct StaticRateTableProvider {
    table: RateTable,
}

impl StaticRateTableProvider {
    /// Build from (code, rate-vs-base) pairs
    pub fn new(rates: Vec<(&str, f64)>) -> Self {
        let table = rates
            .into_iter()
            .map(|(code, rate)| (CurrencyCode::new(code), rate))
            .collect();
        Self { table }
    }
}

impl RateTableProvider for StaticRateTableProvider {
    fn provider_id(&self) -> &str {
        "static"
    }

    fn fetch(&self, _base: &CurrencyCode) -> Result<RateTable> {
        Ok(self.table.clone())
    }
}

/// Provider that always fails
///
/// Exercises the converter's degradation path in tests: every
/// conversion through it must fall back to the identity rate.
#[derive(Debug, Clone, Default)]
pub struct FailingRateTableProvider;

impl RateTableProvider for FailingRateTableProvider {
    fn provider_id(&self) -> &str {
        "failing"
    }

    fn fetch(&self, base: &CurrencyCode) -> Result<RateTable> {
        Err(DutyError::ProviderError(format!(
            "rate feed unavailable for base {}",
            base
        )))
    }
}
