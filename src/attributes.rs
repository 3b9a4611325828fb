//! Per-product customs attributes and read-time inheritance

use crate::country::CountryCode;
use crate::types::ProfileId;
use serde::{Deserialize, Serialize};

/// Customs attributes attached to a product, variation, or category
///
/// All fields are optional: the catalog fills in whatever it knows, and
/// unset fields fall back through the inheritance chain at read time
/// (variation → parent product → first category default). Nothing is
/// copied at write time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCustomsAttributes {
    /// HS tariff classification code
    pub hs_code: Option<String>,
    /// Country of origin
    pub country_of_origin: Option<CountryCode>,
    /// Legacy free-text description used for profile matching
    pub customs_description: Option<String>,
    /// Explicit admin-assigned profile; overrides automatic matching
    pub linked_profile_id: Option<ProfileId>,
}

impl ProductCustomsAttributes {
    /// Attributes with just an HS code and origin
    pub fn new(hs_code: &str, origin: &str) -> Self {
        Self {
            hs_code: Some(hs_code.to_string()),
            country_of_origin: Some(CountryCode::new(origin)),
            customs_description: None,
            linked_profile_id: None,
        }
    }

    /// Field-wise fallback: unset fields take the fallback's values
    pub fn merged_with(&self, fallback: &ProductCustomsAttributes) -> ProductCustomsAttributes {
        ProductCustomsAttributes {
            hs_code: pick(&self.hs_code, &fallback.hs_code),
            country_of_origin: self
                .country_of_origin
                .clone()
                .filter(|c| !c.is_empty())
                .or_else(|| fallback.country_of_origin.clone()),
            customs_description: pick(&self.customs_description, &fallback.customs_description),
            linked_profile_id: self.linked_profile_id.or(fallback.linked_profile_id),
        }
    }

    /// True when either an HS code or a legacy description is present
    pub fn has_classification(&self) -> bool {
        is_set(&self.hs_code) || is_set(&self.customs_description)
    }

    /// True when a duty estimate is possible: classification plus origin
    pub fn is_estimable(&self) -> bool {
        self.has_classification()
            && self
                .country_of_origin
                .as_ref()
                .map(|c| !c.is_empty())
                .unwrap_or(false)
    }
}

fn is_set(field: &Option<String>) -> bool {
    field.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

fn pick(own: &Option<String>, fallback: &Option<String>) -> Option<String> {
    if is_set(own) {
        own.clone()
    } else {
        fallback.clone()
    }
}

/// Resolve effective attributes through the inheritance chain
///
/// `own` is the variation's (or product's) attributes, `parent` the
/// parent product's for variations, `category_default` the first
/// assigned category's defaults.
pub fn resolve_attributes(
    own: &ProductCustomsAttributes,
    parent: Option<&ProductCustomsAttributes>,
    category_default: Option<&ProductCustomsAttributes>,
) -> ProductCustomsAttributes {
    let mut resolved = own.clone();
    if let Some(parent) = parent {
        resolved = resolved.merged_with(parent);
    }
    if let Some(default) = category_default {
        resolved = resolved.merged_with(default);
    }
    resolved
}
