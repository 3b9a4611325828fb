//! Free-trade-agreement exemption evaluation
//!
//! Two independent paths grant duty-free treatment; either one suffices:
//!
//! 1. destination-based auto-exemption: destination is the US, the
//!    feature is enabled, and the origin is on the configured whitelist;
//! 2. profile-flag exemption: the matched profile carries the "CUSMA"
//!    flag and the origin is a CUSMA member.
//!
//! An exempt line's effective rate is forced to zero regardless of the
//! profile's rate table.

use crate::country::CountryCode;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Trade-agreement flag carried by qualifying profiles
pub const CUSMA_FLAG: &str = "CUSMA";

/// CUSMA member countries
pub const CUSMA_MEMBERS: [&str; 3] = ["CA", "US", "MX"];

/// FTA-related store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtaConfig {
    /// Enable destination-based auto-exemption for US-bound orders
    pub auto_exempt_enabled: bool,
    /// Origins that qualify for the auto-exemption
    pub auto_exempt_origins: HashSet<CountryCode>,
}

impl Default for FtaConfig {
    fn default() -> Self {
        let mut origins = HashSet::new();
        origins.insert(CountryCode::ca());
        origins.insert(CountryCode::us());
        Self {
            auto_exempt_enabled: false,
            auto_exempt_origins: origins,
        }
    }
}

/// Which rule granted the exemption — kept for estimate diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExemptionReason {
    DestinationWhitelist,
    CusmaFlag,
}

/// Evaluate duty-free eligibility for one line
///
/// `profile_flags` is the matched profile's flag set; pass an empty set
/// when no profile matched (the destination path can still exempt).
pub fn evaluate_exemption(
    origin: &CountryCode,
    destination: &CountryCode,
    profile_flags: &HashSet<String>,
    config: &FtaConfig,
) -> Option<ExemptionReason> {
    if config.auto_exempt_enabled
        && destination == &CountryCode::us()
        && config.auto_exempt_origins.contains(origin)
    {
        return Some(ExemptionReason::DestinationWhitelist);
    }

    if profile_flags.contains(CUSMA_FLAG) && CUSMA_MEMBERS.contains(&origin.as_str()) {
        return Some(ExemptionReason::CusmaFlag);
    }

    None
}
