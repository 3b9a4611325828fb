//! Engine configuration
//!
//! Everything the engine needs from store settings travels in an
//! explicit `EngineConfig` passed into every call. There is no ambient
//! global state; callers own the config and may vary it per request.

use crate::channel::ChannelRules;
use crate::currency::CurrencyCode;
use crate::fta::FtaConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// What the caller should do when lines have no matching profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingProfilePolicy {
    /// Proceed with zero duty for the unmatched lines
    #[default]
    Allow,
    /// Instruct the checkout flow to halt
    Block,
}

/// How the checkout surfaces the estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeMode {
    /// Add the duty as a chargeable fee (DDP-style)
    #[default]
    Charge,
    /// Show a notice only; the buyer pays on delivery (DAP-style)
    Notify,
}

/// Per-order flat fees, applied once per channel used by the cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Brokerage fee when any line clears commercially
    pub commercial_fee_usd: f64,
    /// Clearance fee when any line clears postally
    pub postal_fee_usd: f64,
    pub commercial_fee_label: String,
    pub postal_fee_label: String,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            commercial_fee_usd: 0.0,
            postal_fee_usd: 0.0,
            commercial_fee_label: "Customs brokerage".to_string(),
            postal_fee_label: "Postal clearance".to_string(),
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Currency cart line prices are quoted in
    pub store_currency: CurrencyCode,
    /// Shipping channel routing rules
    pub channel_rules: ChannelRules,
    /// FTA exemption settings
    pub fta: FtaConfig,
    /// Per-order fee settings
    pub fees: FeeConfig,
    /// Caller policy for unmatched profiles
    pub missing_profile_policy: MissingProfilePolicy,
    /// Label the checkout shows for the duty fee line
    pub checkout_fee_label: String,
    /// Charge the duty or only notify
    pub fee_mode: FeeMode,
    /// Disable to skip FX and treat store amounts as USD
    pub fx_enabled: bool,
    /// Profile-lookup date; None means today
    pub as_of: Option<NaiveDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_currency: CurrencyCode::usd(),
            channel_rules: ChannelRules::default(),
            fta: FtaConfig::default(),
            fees: FeeConfig::default(),
            missing_profile_policy: MissingProfilePolicy::default(),
            checkout_fee_label: "Estimated import duty".to_string(),
            fee_mode: FeeMode::default(),
            fx_enabled: true,
            as_of: None,
        }
    }
}
