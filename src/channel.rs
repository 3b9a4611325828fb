//! Shipping channel resolution
//!
//! A shipment clears customs through one of two channels: "postal"
//! (informal, low-value entry) or "commercial" (formal entry via a
//! broker). Duty profiles carry a separate rate table per channel, so
//! picking the channel is the first step of rate computation.
//!
//! Resolution priority when a shipping-method context is available:
//! 1. exact method-id match against the configured map
//! 2. method-family match (portion before `:`) against the same map
//! 3. ordered keyword rules scanned against the lowercased label + id
//! 4. configured store-wide default
//!
//! Without a context, or when nothing above resolves, a static
//! per-country heuristic decides from the origin country.

use crate::country::CountryCode;
use crate::error::DutyError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Customs clearance channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Postal,
    Commercial,
}

impl Channel {
    /// Get the channel name as used in rate tables and snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Postal => "postal",
            Channel::Commercial => "commercial",
        }
    }

}

impl std::str::FromStr for Channel {
    type Err = DutyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postal" => Ok(Channel::Postal),
            "commercial" => Ok(Channel::Commercial),
            _ => Err(DutyError::InvalidData(format!("unknown channel: {}", s))),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which rule decided the channel — kept for estimate diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelSource {
    MapExact,
    MapFamily,
    Keyword,
    Default,
    CountryHeuristic,
}

/// The shipping method the customer actually selected at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingMethodContext {
    /// Method instance id, e.g. "flat_rate:3"
    pub method_id: String,
    /// Human label of the carrier service, e.g. "Canada Post Small Packet"
    pub label: String,
}

impl ShippingMethodContext {
    pub fn new(method_id: &str, label: &str) -> Self {
        Self {
            method_id: method_id.to_string(),
            label: label.to_string(),
        }
    }

    /// Method family: the portion before the `:` instance separator
    pub fn family(&self) -> &str {
        self.method_id
            .split_once(':')
            .map(|(family, _)| family)
            .unwrap_or(&self.method_id)
    }
}

/// Store-configured channel routing rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelRules {
    /// Exact method-id (or method-family) → channel
    pub method_map: HashMap<String, Channel>,
    /// Ordered (keyword, channel) rules; first substring match wins
    pub keyword_rules: Vec<(String, Channel)>,
    /// Store-wide fallback channel
    pub default: Option<Channel>,
}

/// Decide the clearance channel for a shipment
///
/// Evaluated once per cart when a shipping context exists, per line
/// (by origin) when it does not.
pub fn decide_channel(
    origin: Option<&CountryCode>,
    ctx: Option<&ShippingMethodContext>,
    rules: &ChannelRules,
) -> (Channel, ChannelSource) {
    if let Some(ctx) = ctx {
        if let Some(&channel) = rules.method_map.get(&ctx.method_id) {
            return (channel, ChannelSource::MapExact);
        }

        if let Some(&channel) = rules.method_map.get(ctx.family()) {
            return (channel, ChannelSource::MapFamily);
        }

        let haystack = format!("{} {}", ctx.label, ctx.method_id).to_lowercase();
        for (keyword, channel) in &rules.keyword_rules {
            if !keyword.is_empty() && haystack.contains(&keyword.to_lowercase()) {
                return (*channel, ChannelSource::Keyword);
            }
        }

        if let Some(channel) = rules.default {
            return (channel, ChannelSource::Default);
        }
    }

    (country_heuristic(origin), ChannelSource::CountryHeuristic)
}

/// Static per-country routing heuristic
///
/// Taiwan and China ship predominantly via postal networks; Canada and
/// everywhere else default to formal commercial entry.
pub fn country_heuristic(origin: Option<&CountryCode>) -> Channel {
    match origin.map(CountryCode::as_str) {
        Some("TW") | Some("CN") => Channel::Postal,
        Some("CA") => Channel::Commercial,
        _ => Channel::Commercial,
    }
}
