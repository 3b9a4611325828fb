//! ISO 4217 currency codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217 currency code, uppercase-normalized
///
/// Stores may be configured with any currency, so this is an open value
/// type rather than a closed enum. Rate tables from providers are keyed
/// by these codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a normalized currency code (trimmed, uppercased)
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// US Dollar — the base currency all estimates are quoted in
    pub fn usd() -> Self {
        Self("USD".to_string())
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}
