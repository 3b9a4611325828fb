//! # dutycalc
//!
//! A US import duty estimation engine for e-commerce checkout flows.
//!
//! Given a cart of line items with customs attributes (HS tariff code,
//! country of origin), the engine resolves duty-rate profiles from a
//! pluggable store, routes shipments to a postal or commercial clearance
//! channel, applies free-trade-agreement exemptions, converts amounts to
//! USD, and aggregates per-order totals and fees.
//!
//! The engine is built around one guarantee: it never blocks a sale.
//! Missing catalog data, unmatched profiles, and FX outages all degrade
//! to zero-value contributions with diagnostic counters instead of
//! errors.
//!
//! ## Example
//!
//! ```rust
//! use dutycalc::prelude::*;
//! use std::sync::Arc;
//!
//! let store = InMemoryProfileStore::new();
//! let provider = StaticRateTableProvider::new(vec![("CAD", 1.35)]);
//! let converter = CurrencyConverter::new(Arc::new(provider), 12);
//! let engine = DutyEstimator::new(Arc::new(store), converter);
//!
//! let line = CartLine::new(1, 2.0, 25.0, ProductCustomsAttributes::new("6109", "DE"));
//! let cart = engine.estimate_for_cart(
//!     &[line],
//!     &CountryCode::us(),
//!     None,
//!     &EngineConfig::default(),
//! );
//! assert_eq!(cart.missing_profiles, 1); // no profile loaded for 6109/DE
//! ```

pub mod attributes;
pub mod channel;
pub mod config;
pub mod country;
pub mod currency;
pub mod engine;
pub mod error;
pub mod fta;
pub mod fx;
pub mod profile;
pub mod rate;
pub mod snapshot;
pub mod types;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::attributes::ProductCustomsAttributes;
    pub use crate::channel::{Channel, ChannelRules, ShippingMethodContext};
    pub use crate::config::{EngineConfig, FeeMode, MissingProfilePolicy};
    pub use crate::country::CountryCode;
    pub use crate::currency::CurrencyCode;
    pub use crate::engine::{CartEstimate, CartLine, DutyEstimator, LineItemEstimate};
    pub use crate::error::{DutyError, Result};
    pub use crate::fx::{CurrencyConverter, RateTableProvider, StaticRateTableProvider};
    pub use crate::profile::{CustomsProfile, InMemoryProfileStore, ProfileStore};
    pub use crate::snapshot::OrderDutySnapshot;
    pub use crate::types::*;
}
