//! Persisted order duty snapshots
//!
//! When an order is placed, the checkout flow freezes the cart estimate
//! into an `OrderDutySnapshot` for audit. The snapshot is immutable once
//! written and its JSON field names are a compatibility surface: older
//! reporting tooling reads them directly, so they must not change.

use crate::channel::{Channel, ChannelSource};
use crate::currency::CurrencyCode;
use crate::engine::{CartEstimate, Composition, ResolutionSource};
use crate::error::Result;
use crate::fta::ExemptionReason;
use crate::types::{ProductId, ProfileId, Timestamp, Usd};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One itemized per-order fee in the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFee {
    pub label: String,
    pub channel: Channel,
    pub amount_usd: Usd,
}

/// Resolution diagnostics frozen alongside each line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineDebug {
    pub resolution: ResolutionSource,
    pub profile_id: Option<ProfileId>,
    pub channel_source: ChannelSource,
    pub exemption: Option<ExemptionReason>,
}

/// One frozen line estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotLine {
    pub product_id: ProductId,
    pub desc: String,
    pub origin: String,
    pub channel: Channel,
    pub rate_pct: f64,
    pub value_usd: Usd,
    pub duty_usd: Usd,
    pub cusma: bool,
    pub debug: LineDebug,
}

/// Immutable duty snapshot persisted with an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDutySnapshot {
    pub id: Uuid,
    pub total_usd: Usd,
    pub fees_usd: Usd,
    pub fees: Vec<SnapshotFee>,
    pub lines: Vec<SnapshotLine>,
    pub composition: Composition,
    /// Which flow produced the snapshot, e.g. "checkout"
    pub scenario: String,
    pub missing_profiles: u32,
    pub currency: CurrencyCode,
    pub timestamp: Timestamp,
}

impl OrderDutySnapshot {
    /// Freeze a cart estimate into a snapshot
    pub fn from_cart(estimate: &CartEstimate, scenario: &str, timestamp: Timestamp) -> Self {
        let lines = estimate
            .lines
            .iter()
            .map(|line| SnapshotLine {
                product_id: line.product_id,
                desc: line.description.clone(),
                origin: line.origin.as_str().to_string(),
                channel: line.channel,
                rate_pct: line.rate_percent,
                value_usd: line.value_usd,
                duty_usd: line.duty_usd,
                cusma: line.fta_exempt,
                debug: LineDebug {
                    resolution: line.resolution,
                    profile_id: line.profile_id,
                    channel_source: line.channel_source,
                    exemption: line.exemption_reason,
                },
            })
            .collect();

        let fees = estimate
            .fees
            .iter()
            .map(|fee| SnapshotFee {
                label: fee.label.clone(),
                channel: fee.channel,
                amount_usd: fee.amount_usd,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            total_usd: estimate.total_usd,
            fees_usd: estimate.fees_usd,
            fees,
            lines,
            composition: estimate.composition.clone(),
            scenario: scenario.to_string(),
            missing_profiles: estimate.missing_profiles,
            currency: estimate.currency.clone(),
            timestamp,
        }
    }

    /// Serialize to the persisted JSON form
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
