//! Effective rate computation
//!
//! Turns a profile's raw rate table for one channel into an ad-valorem
//! percentage. Pure and deterministic; tolerates malformed components by
//! ignoring them.

use crate::channel::Channel;
use crate::profile::RateTables;
use crate::types::RatePercent;

/// Compute the effective ad-valorem percentage for a channel
///
/// Rate tables are authored in two conventions depending on their import
/// source: components as fractions (0.053 = 5.3%) or as percentages
/// (5.3 = 5.3%). The convention is not tagged in the data, so it is
/// auto-detected by magnitude: if any component is >= 1.0 the whole
/// table is read as percentages and summed raw; otherwise every
/// component is read as a fraction and the sum is scaled by 100.
///
/// Known limitation: a genuine multi-component percentage table whose
/// components are all below 1.0 (e.g. three 0.3% surcharges) is
/// misread as fractions. Existing rate data depends on the current
/// behavior, so any change here needs a data migration first.
pub fn compute_rate_percent(rate_tables: &RateTables, channel: Channel) -> RatePercent {
    let components = match rate_tables.get(&channel) {
        Some(map) if !map.is_empty() => map,
        _ => return 0.0,
    };

    // Non-numeric components are ignored, not errors.
    let values: Vec<f64> = components.values().filter_map(|v| v.as_numeric()).collect();
    if values.is_empty() {
        return 0.0;
    }

    let sum: f64 = values.iter().sum();
    let max = values.iter().cloned().fold(f64::MIN, f64::max);

    if max >= 1.0 {
        sum
    } else {
        sum * 100.0
    }
}
