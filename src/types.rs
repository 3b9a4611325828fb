//! Core type aliases

use chrono::{DateTime, Utc};

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Product (or variation) identifier from the catalog
pub type ProductId = u64;

/// Synthetic duty-profile identifier
pub type ProfileId = u64;

/// Monetary amount in US dollars
pub type Usd = f64;

/// Ad-valorem rate expressed in percent (0.0 to 100.0)
pub type RatePercent = f64;
