//! Customs duty profiles and the profile store
//!
//! A profile is a duty-rate record keyed by (HS code, origin country) or,
//! for legacy rows, by (normalized description, origin country), valid
//! over an inclusive date window. The store contract is defensive by
//! design: duplicate active rows for the same key are possible upstream,
//! so lookups always tie-break on the latest `effective_from`.

use crate::channel::Channel;
use crate::country::CountryCode;
use crate::types::ProfileId;
use chrono::{NaiveDate, NaiveDateTime};
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// A single rate-table component value
///
/// Imported rate tables are loosely typed: components are usually
/// numbers (either fractions or percentages, see `rate`), but stray
/// strings and nulls occur. Invalid entries are carried, not rejected,
/// and filtered out at computation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateValue {
    Numeric(f64),
    Invalid(serde_json::Value),
}

impl RateValue {
    /// The numeric value, if this component is numeric and finite
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            RateValue::Numeric(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for RateValue {
    fn from(v: f64) -> Self {
        RateValue::Numeric(v)
    }
}

/// Per-channel rate tables: channel → component name → value
pub type RateTables = HashMap<Channel, HashMap<String, RateValue>>;

/// A stored duty-rate record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomsProfile {
    /// Synthetic identifier
    pub id: ProfileId,
    /// HS tariff code; may be empty for legacy description-keyed rows
    pub hs_code: String,
    /// Origin country this rate applies to
    pub country: CountryCode,
    /// Lowercase, whitespace-collapsed description (legacy match key)
    pub description_normalized: String,
    /// Rate tables per clearance channel
    pub rate_tables: RateTables,
    /// Trade-agreement codes this profile qualifies for, e.g. "CUSMA"
    pub fta_flags: HashSet<String>,
    /// Start of validity, inclusive; None = since forever
    pub effective_from: Option<NaiveDate>,
    /// End of validity, inclusive; None = open-ended
    pub effective_to: Option<NaiveDate>,
    /// Free-text operator notes (not used in computation)
    #[serde(default)]
    pub notes: String,
    /// Original description as imported (not used in computation)
    #[serde(default)]
    pub description_raw: String,
    /// Where this row came from, e.g. an import batch name
    #[serde(default)]
    pub source: String,
    /// Last modification time, for audit only
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
}

impl CustomsProfile {
    /// Minimal profile for a (hs_code, country) key; rate tables empty
    pub fn new(id: ProfileId, hs_code: &str, country: CountryCode) -> Self {
        Self {
            id,
            hs_code: hs_code.to_string(),
            country,
            description_normalized: String::new(),
            rate_tables: HashMap::new(),
            fta_flags: HashSet::new(),
            effective_from: None,
            effective_to: None,
            notes: String::new(),
            description_raw: String::new(),
            source: String::new(),
            last_updated: None,
        }
    }

    /// True when the validity window contains `date` (both bounds inclusive)
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.effective_from {
            if from > date {
                return false;
            }
        }
        if let Some(to) = self.effective_to {
            if to < date {
                return false;
            }
        }
        true
    }

    /// Sort key for the tie-break: latest effective_from wins,
    /// undated rows lose against any dated row
    fn effective_rank(&self) -> NaiveDate {
        self.effective_from.unwrap_or(NaiveDate::MIN)
    }
}

/// Normalize a free-text customs description for matching:
/// lowercased, whitespace collapsed to single spaces, trimmed
pub fn normalize_description(desc: &str) -> String {
    desc.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Profile lookup contract consumed by the estimation engine
///
/// All lookups are point-in-time: a candidate must match the key fields
/// exactly and have a validity window containing `as_of`. When several
/// candidates qualify, the one with the latest `effective_from` is
/// returned — a newer rate supersedes an older one with overlapping
/// validity.
pub trait ProfileStore: Send + Sync {
    /// Look up by HS code + origin country (authoritative path)
    fn find_by_hs_and_country(
        &self,
        hs_code: &str,
        country: &CountryCode,
        as_of: NaiveDate,
    ) -> Option<CustomsProfile>;

    /// Look up by normalized description + origin country (legacy path)
    fn find_by_description_and_country(
        &self,
        description_normalized: &str,
        country: &CountryCode,
        as_of: NaiveDate,
    ) -> Option<CustomsProfile>;

    /// Retrieve by synthetic id (explicit admin assignment)
    fn find_by_id(&self, id: ProfileId) -> Option<CustomsProfile>;
}

/// In-memory profile store
///
/// Backs tests and small catalogs; production deployments wrap their
/// own persistence layer in the `ProfileStore` trait. Reads are point
/// queries; interior locking lets estimate calls share one store.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<ProfileId, CustomsProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile
    pub fn insert(&self, profile: CustomsProfile) {
        self.profiles.write().unwrap().insert(profile.id, profile);
    }

    /// Remove a profile by id, returning it if present
    pub fn remove(&self, id: ProfileId) -> Option<CustomsProfile> {
        self.profiles.write().unwrap().remove(&id)
    }

    /// Number of stored profiles
    pub fn len(&self) -> usize {
        self.profiles.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Select the best candidate among rows matching `pred` on `as_of`
    fn find_best<F>(&self, as_of: NaiveDate, pred: F) -> Option<CustomsProfile>
    where
        F: Fn(&CustomsProfile) -> bool,
    {
        let profiles = self.profiles.read().unwrap();
        profiles
            .values()
            .filter(|p| pred(p) && p.is_active_on(as_of))
            // Exact effective_from ties break on id so lookups are
            // reproducible across map iteration orders.
            .max_by_key(|p| (p.effective_rank(), p.id))
            .cloned()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn find_by_hs_and_country(
        &self,
        hs_code: &str,
        country: &CountryCode,
        as_of: NaiveDate,
    ) -> Option<CustomsProfile> {
        let hs = hs_code.trim();
        if hs.is_empty() {
            return None;
        }
        self.find_best(as_of, |p| p.hs_code == hs && &p.country == country)
    }

    fn find_by_description_and_country(
        &self,
        description_normalized: &str,
        country: &CountryCode,
        as_of: NaiveDate,
    ) -> Option<CustomsProfile> {
        let desc = normalize_description(description_normalized);
        if desc.is_empty() {
            return None;
        }
        self.find_best(as_of, |p| {
            p.description_normalized == desc && &p.country == country
        })
    }

    fn find_by_id(&self, id: ProfileId) -> Option<CustomsProfile> {
        self.profiles.read().unwrap().get(&id).cloned()
    }
}
