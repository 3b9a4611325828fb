//! Soft-fail currency conversion

use super::cache::RateCache;
use super::provider::{RateTable, RateTableProvider};
use crate::currency::CurrencyCode;
use log::{debug, warn};
use std::sync::Arc;

/// Optional hook that can pin a rate for a (from, to) pair
///
/// When it returns a rate it is used verbatim and the provider table is
/// never consulted. Lets operators hard-code a rate during feed outages.
pub type RateOverride = Arc<dyn Fn(&CurrencyCode, &CurrencyCode) -> Option<f64> + Send + Sync>;

/// Default cache TTL for fetched rate tables, in hours
pub const DEFAULT_TTL_HOURS: i64 = 12;

/// Converts amounts between currencies via a base-quoted rate table
///
/// All rates derive from a single table quoted against the base
/// currency (USD): code → units per 1 base unit. Conversion never
/// fails; any gap in the table degrades the rate to 1.0 because duty
/// estimation sits on the checkout path and must not block a sale.
pub struct CurrencyConverter {
    provider: Arc<dyn RateTableProvider>,
    cache: RateCache,
    base: CurrencyCode,
    override_hook: Option<RateOverride>,
}

impl CurrencyConverter {
    /// Create a converter with a USD base and the given cache TTL in hours
    pub fn new(provider: Arc<dyn RateTableProvider>, ttl_hours: i64) -> Self {
        Self::with_base(provider, ttl_hours, CurrencyCode::usd())
    }

    /// Create a converter with a USD base and the default TTL
    pub fn with_default_ttl(provider: Arc<dyn RateTableProvider>) -> Self {
        Self::new(provider, DEFAULT_TTL_HOURS)
    }

    /// Create a converter quoted against a different base currency
    pub fn with_base(
        provider: Arc<dyn RateTableProvider>,
        ttl_hours: i64,
        base: CurrencyCode,
    ) -> Self {
        Self {
            provider,
            cache: RateCache::new(ttl_hours),
            base,
            override_hook: None,
        }
    }

    /// Install an override hook
    pub fn with_override(mut self, hook: RateOverride) -> Self {
        self.override_hook = Some(hook);
        self
    }

    /// The base currency rates are quoted against
    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Convert an amount between currencies; infallible by contract
    pub fn convert(&self, amount: f64, from: &CurrencyCode, to: &CurrencyCode) -> f64 {
        amount * self.rate(from, to)
    }

    /// Effective rate for a (from, to) pair
    ///
    /// Derivation priority: identity, override hook, then the table
    /// (into-base, out-of-base, or cross via base). Missing or
    /// nonpositive entries degrade to 1.0.
    pub fn rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> f64 {
        if from == to {
            return 1.0;
        }

        if let Some(hook) = &self.override_hook {
            if let Some(rate) = hook(from, to) {
                debug!("fx: override rate {}->{} = {}", from, to, rate);
                return rate;
            }
        }

        let table = match self.table() {
            Some(table) => table,
            None => {
                warn!("fx: rate table unavailable, {}->{} degrades to 1.0", from, to);
                return 1.0;
            }
        };

        let rate = if to == &self.base {
            positive(table.get(from)).map(|r| 1.0 / r)
        } else if from == &self.base {
            positive(table.get(to))
        } else {
            let from_rate = positive(table.get(from));
            let to_rate = positive(table.get(to));
            match (from_rate, to_rate) {
                (Some(f), Some(t)) => Some((1.0 / f) * t),
                _ => None,
            }
        };

        match rate {
            Some(rate) => rate,
            None => {
                warn!("fx: no table entry for {}->{}, degrades to 1.0", from, to);
                1.0
            }
        }
    }

    /// Drop the cached table so the next conversion re-fetches
    pub fn refresh(&self) {
        self.cache.invalidate(&self.cache_key());
    }

    fn cache_key(&self) -> String {
        RateCache::key(self.provider.provider_id(), self.base.as_str())
    }

    /// Cached table, fetching on a miss; None when the provider fails
    fn table(&self) -> Option<RateTable> {
        let key = self.cache_key();
        if let Some(table) = self.cache.get(&key) {
            return Some(table);
        }

        match self.provider.fetch(&self.base) {
            Ok(table) => {
                self.cache.put(&key, table.clone());
                Some(table)
            }
            Err(err) => {
                warn!("fx: provider fetch failed: {}", err);
                None
            }
        }
    }
}

fn positive(rate: Option<&f64>) -> Option<f64> {
    rate.copied().filter(|r| r.is_finite() && *r > 0.0)
}
