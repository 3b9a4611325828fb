//! ISO-2 country codes

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 3166-1 alpha-2 country code, uppercase-normalized
///
/// Catalog data arrives with inconsistent casing ("ca", "Ca", "CA"), so
/// all comparisons go through this normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// Create a normalized country code (trimmed, uppercased)
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the code is empty (unset origin)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// United States
    pub fn us() -> Self {
        Self("US".to_string())
    }

    /// Canada
    pub fn ca() -> Self {
        Self("CA".to_string())
    }

    /// Mexico
    pub fn mx() -> Self {
        Self("MX".to_string())
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}
