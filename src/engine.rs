//! Duty estimation engine
//!
//! Orchestrates profile resolution, channel routing, FTA evaluation,
//! rate computation, and currency conversion for single line items and
//! whole carts.
//!
//! The engine never fails for missing data: a line without a
//! classification or origin is simply "not applicable", an unmatched
//! profile contributes zero duty and bumps a diagnostic counter, and an
//! unavailable FX table converts at the identity rate. Estimation sits
//! on the checkout path and must not block a sale over incomplete
//! catalog data.

use crate::attributes::ProductCustomsAttributes;
use crate::channel::{decide_channel, Channel, ChannelSource, ShippingMethodContext};
use crate::config::{EngineConfig, MissingProfilePolicy};
use crate::country::CountryCode;
use crate::currency::CurrencyCode;
use crate::fta::{evaluate_exemption, ExemptionReason};
use crate::fx::CurrencyConverter;
use crate::profile::{normalize_description, CustomsProfile, ProfileStore};
use crate::rate::compute_rate_percent;
use crate::types::{ProductId, ProfileId, RatePercent, Usd};
use chrono::{NaiveDate, Utc};
use hashbrown::HashSet;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One cart line as the catalog hands it to the engine
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: f64,
    /// Unit price in the store currency
    pub unit_price: f64,
    /// Customs attributes, already resolved through inheritance
    pub attributes: ProductCustomsAttributes,
    /// Display description for the breakdown
    pub description: String,
}

impl CartLine {
    pub fn new(
        product_id: ProductId,
        quantity: f64,
        unit_price: f64,
        attributes: ProductCustomsAttributes,
    ) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
            attributes,
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// How the profile for a line was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Admin explicitly linked a profile to the product
    LinkedProfile,
    /// HS code + country lookup
    HsCode,
    /// Legacy description + country lookup
    Description,
    /// Classification present but nothing matched
    Unmatched,
}

/// Duty estimate for a single cart line; computed fresh on every call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemEstimate {
    pub product_id: ProductId,
    pub description: String,
    pub origin: CountryCode,
    pub channel: Channel,
    pub channel_source: ChannelSource,
    pub rate_percent: RatePercent,
    pub value_usd: Usd,
    pub duty_usd: Usd,
    pub fta_exempt: bool,
    pub exemption_reason: Option<ExemptionReason>,
    pub resolution: ResolutionSource,
    pub profile_id: Option<ProfileId>,
}

/// A per-order flat fee triggered by channel usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFee {
    pub label: String,
    pub channel: Channel,
    pub amount_usd: Usd,
}

/// Split of cart value by exemption status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Composition {
    pub cusma_value_usd: Usd,
    pub non_cusma_value_usd: Usd,
    pub total_value_usd: Usd,
}

/// Aggregated estimate for a whole cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEstimate {
    /// Total duty across all lines, before per-order fees
    pub total_usd: Usd,
    /// Sum of per-order fees
    pub fees_usd: Usd,
    pub fees: Vec<OrderFee>,
    pub lines: Vec<LineItemEstimate>,
    pub composition: Composition,
    /// Lines with a classification but no matching profile
    pub missing_profiles: u32,
    pub channels_used: HashSet<Channel>,
    /// Store currency the inputs were quoted in
    pub currency: CurrencyCode,
}

impl CartEstimate {
    /// Duty plus fees
    pub fn grand_total_usd(&self) -> Usd {
        self.total_usd + self.fees_usd
    }

    /// Whether the caller's policy says checkout should halt
    ///
    /// The engine only answers the question; acting on it is the
    /// checkout flow's decision.
    pub fn should_block(&self, config: &EngineConfig) -> bool {
        config.missing_profile_policy == MissingProfilePolicy::Block && self.missing_profiles > 0
    }
}

/// The duty estimation engine
///
/// Stateless per call apart from reads through the profile store and
/// the converter's rate cache; one instance serves concurrent estimates.
pub struct DutyEstimator {
    store: Arc<dyn ProfileStore>,
    converter: CurrencyConverter,
}

impl DutyEstimator {
    pub fn new(store: Arc<dyn ProfileStore>, converter: CurrencyConverter) -> Self {
        Self { store, converter }
    }

    /// Estimate duty for a single line item
    ///
    /// Returns None when no estimate is possible: the line has neither
    /// an HS code nor a legacy description, or no origin country. That
    /// is "not applicable", not an error, and such lines never count as
    /// missing profiles.
    pub fn estimate_for_line_item(
        &self,
        line: &CartLine,
        destination: &CountryCode,
        ctx: Option<&ShippingMethodContext>,
        config: &EngineConfig,
    ) -> Option<LineItemEstimate> {
        let cart_channel = resolve_cart_channel(ctx, config);
        self.estimate_line(line, destination, cart_channel, config, self.as_of(config))
    }

    /// Estimate duty for a whole cart
    ///
    /// Lines are independent, so they are estimated in parallel and the
    /// commutative aggregates folded afterwards. The shipping channel is
    /// resolved once per cart when a shipping context exists, per line
    /// from the origin country otherwise.
    pub fn estimate_for_cart(
        &self,
        lines: &[CartLine],
        destination: &CountryCode,
        ctx: Option<&ShippingMethodContext>,
        config: &EngineConfig,
    ) -> CartEstimate {
        let as_of = self.as_of(config);
        let cart_channel = resolve_cart_channel(ctx, config);

        let estimates: Vec<LineItemEstimate> = lines
            .par_iter()
            .filter_map(|line| self.estimate_line(line, destination, cart_channel, config, as_of))
            .collect();

        let mut total_usd = 0.0;
        let mut composition = Composition::default();
        let mut missing_profiles = 0u32;
        let mut channels_used = HashSet::new();

        for est in &estimates {
            total_usd += est.duty_usd;
            channels_used.insert(est.channel);
            if est.fta_exempt {
                composition.cusma_value_usd += est.value_usd;
            } else {
                composition.non_cusma_value_usd += est.value_usd;
            }
            composition.total_value_usd += est.value_usd;
            if est.resolution == ResolutionSource::Unmatched {
                missing_profiles += 1;
            }
        }

        let fees = self.order_fees(&channels_used, config);
        let fees_usd = fees.iter().map(|f| f.amount_usd).sum();

        CartEstimate {
            total_usd,
            fees_usd,
            fees,
            lines: estimates,
            composition,
            missing_profiles,
            channels_used,
            currency: config.store_currency.clone(),
        }
    }

    /// Drop the cached FX table so the next estimate re-fetches rates
    pub fn refresh_rates(&self) {
        self.converter.refresh();
    }

    fn as_of(&self, config: &EngineConfig) -> NaiveDate {
        config.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }


    fn estimate_line(
        &self,
        line: &CartLine,
        destination: &CountryCode,
        cart_channel: Option<(Channel, ChannelSource)>,
        config: &EngineConfig,
        as_of: NaiveDate,
    ) -> Option<LineItemEstimate> {
        let attrs = &line.attributes;
        if !attrs.is_estimable() {
            debug!(
                "line {}: no classification or origin, estimate not applicable",
                line.product_id
            );
            return None;
        }
        let origin = attrs.country_of_origin.clone()?;

        let (profile, resolution) = self.resolve_profile(attrs, &origin, as_of);
        debug!(
            "line {}: profile resolution {:?} (profile id {:?})",
            line.product_id,
            resolution,
            profile.as_ref().map(|p| p.id)
        );

        let (channel, channel_source) = match cart_channel {
            Some(resolved) => resolved,
            None => decide_channel(Some(&origin), None, &config.channel_rules),
        };

        let empty_flags = HashSet::new();
        let flags = profile.as_ref().map(|p| &p.fta_flags).unwrap_or(&empty_flags);
        let exemption = evaluate_exemption(&origin, destination, flags, &config.fta);

        let rate_percent = if exemption.is_some() {
            0.0
        } else {
            profile
                .as_ref()
                .map(|p| compute_rate_percent(&p.rate_tables, channel))
                .unwrap_or(0.0)
        };

        let value_store = line.unit_price * line.quantity;
        let value_usd = if config.fx_enabled {
            self.converter
                .convert(value_store, &config.store_currency, &CurrencyCode::usd())
        } else {
            value_store
        };
        let duty_usd = rate_percent / 100.0 * value_usd;

        Some(LineItemEstimate {
            product_id: line.product_id,
            description: line.description.clone(),
            origin,
            channel,
            channel_source,
            rate_percent,
            value_usd,
            duty_usd,
            fta_exempt: exemption.is_some(),
            exemption_reason: exemption,
            resolution,
            profile_id: profile.map(|p| p.id),
        })
    }

    /// Resolve the applicable profile, first hit wins:
    /// linked id → HS + country → legacy description + country
    fn resolve_profile(
        &self,
        attrs: &ProductCustomsAttributes,
        origin: &CountryCode,
        as_of: NaiveDate,
    ) -> (Option<CustomsProfile>, ResolutionSource) {
        if let Some(id) = attrs.linked_profile_id {
            if let Some(profile) = self.store.find_by_id(id) {
                return (Some(profile), ResolutionSource::LinkedProfile);
            }
            // A dangling link falls through to automatic matching.
        }

        if let Some(hs) = attrs.hs_code.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if let Some(profile) = self.store.find_by_hs_and_country(hs, origin, as_of) {
                return (Some(profile), ResolutionSource::HsCode);
            }
        }

        if let Some(desc) = attrs.customs_description.as_deref() {
            let normalized = normalize_description(desc);
            if !normalized.is_empty() {
                if let Some(profile) =
                    self.store
                        .find_by_description_and_country(&normalized, origin, as_of)
                {
                    return (Some(profile), ResolutionSource::Description);
                }
            }
        }

        (None, ResolutionSource::Unmatched)
    }

    fn order_fees(&self, channels_used: &HashSet<Channel>, config: &EngineConfig) -> Vec<OrderFee> {
        let mut fees = Vec::new();
        if channels_used.contains(&Channel::Commercial) && config.fees.commercial_fee_usd > 0.0 {
            fees.push(OrderFee {
                label: config.fees.commercial_fee_label.clone(),
                channel: Channel::Commercial,
                amount_usd: config.fees.commercial_fee_usd,
            });
        }
        if channels_used.contains(&Channel::Postal) && config.fees.postal_fee_usd > 0.0 {
            fees.push(OrderFee {
                label: config.fees.postal_fee_label.clone(),
                channel: Channel::Postal,
                amount_usd: config.fees.postal_fee_usd,
            });
        }
        fees
    }
}

/// Resolve the cart-wide channel from the shipping context
///
/// Only a context-based result (map, keyword, or configured default) is
/// shared across lines. When none of those rules fire the resolution is
/// discarded so each line falls back to its own origin's heuristic —
/// different lines may have different origins.
fn resolve_cart_channel(
    ctx: Option<&ShippingMethodContext>,
    config: &EngineConfig,
) -> Option<(Channel, ChannelSource)> {
    let ctx = ctx?;
    let (channel, source) = decide_channel(None, Some(ctx), &config.channel_rules);
    if source == ChannelSource::CountryHeuristic {
        return None;
    }
    Some((channel, source))
}
