//! Foreign exchange subsystem
//!
//! Converts cart amounts from the store currency into USD for duty
//! computation. Rate tables are quoted against a fixed base currency
//! and supplied by a pluggable provider behind a TTL cache.
//!
//! Conversion is deliberately infallible: when the provider fails or a
//! code is missing from the table, the rate degrades to 1.0 so an
//! estimate can never block checkout on FX availability.
//!
//! # Example
//!
//! ```rust
//! use dutycalc::fx::{CurrencyConverter, StaticRateTableProvider};
//! use dutycalc::currency::CurrencyCode;
//! use std::sync::Arc;
//!
//! let provider = StaticRateTableProvider::new(vec![
//!     ("CAD", 1.35),
//!     ("EUR", 0.90),
//! ]);
//! let converter = CurrencyConverter::new(Arc::new(provider), 12);
//!
//! let usd = converter.convert(135.0, &CurrencyCode::new("CAD"), &CurrencyCode::usd());
//! assert!((usd - 100.0).abs() < 1e-9);
//! ```

pub mod cache;
pub mod converter;
pub mod provider;

pub use cache::RateCache;
pub use converter::{CurrencyConverter, RateOverride, DEFAULT_TTL_HOURS};
pub use provider::{FailingRateTableProvider, RateTable, RateTableProvider, StaticRateTableProvider};
