//! End-to-end estimation scenarios
//!
//! Exercises the full path: profile store → channel routing → FTA
//! evaluation → rate computation → FX conversion → aggregation →
//! snapshot.

use approx::assert_relative_eq;
use chrono::{NaiveDate, Utc};
use dutycalc::attributes::ProductCustomsAttributes;
use dutycalc::channel::{Channel, ChannelSource, ShippingMethodContext};
use dutycalc::config::{EngineConfig, MissingProfilePolicy};
use dutycalc::country::CountryCode;
use dutycalc::currency::CurrencyCode;
use dutycalc::engine::{CartLine, DutyEstimator, ResolutionSource};
use dutycalc::fx::{CurrencyConverter, StaticRateTableProvider};
use dutycalc::profile::{CustomsProfile, InMemoryProfileStore, RateValue};
use dutycalc::snapshot::OrderDutySnapshot;
use hashbrown::HashMap;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn profile(id: u64, hs: &str, country: &str, channel: Channel, rate: f64) -> CustomsProfile {
    let mut p = CustomsProfile::new(id, hs, CountryCode::new(country));
    let mut components = HashMap::new();
    components.insert("base".to_string(), RateValue::Numeric(rate));
    p.rate_tables.insert(channel, components);
    p
}

fn engine_with(store: InMemoryProfileStore) -> DutyEstimator {
    let provider = StaticRateTableProvider::new(vec![("CAD", 1.35), ("EUR", 0.90)]);
    let converter = CurrencyConverter::new(Arc::new(provider), 12);
    DutyEstimator::new(Arc::new(store), converter)
}

fn config() -> EngineConfig {
    EngineConfig {
        as_of: Some(date(2024, 9, 1)),
        ..EngineConfig::default()
    }
}

#[test]
fn test_profile_tie_break_latest_wins_end_to_end() {
    let store = InMemoryProfileStore::new();
    let mut old = profile(1, "1234", "CA", Channel::Commercial, 5.0);
    old.effective_from = Some(date(2024, 1, 1));
    let mut new = profile(2, "1234", "CA", Channel::Commercial, 8.0);
    new.effective_from = Some(date(2024, 6, 1));
    store.insert(old);
    store.insert(new);

    let engine = engine_with(store);
    let line = CartLine::new(1, 1.0, 100.0, ProductCustomsAttributes::new("1234", "CA"));
    let est = engine
        .estimate_for_line_item(&line, &CountryCode::us(), None, &config())
        .unwrap();

    assert_eq!(est.profile_id, Some(2));
    assert_relative_eq!(est.rate_percent, 8.0);
}

#[test]
fn test_exemption_forces_zero_despite_nonzero_table() {
    let store = InMemoryProfileStore::new();
    let mut p = profile(1, "1234", "CA", Channel::Commercial, 18.0);
    p.fta_flags.insert("CUSMA".to_string());
    store.insert(p);

    let engine = engine_with(store);
    let line = CartLine::new(1, 1.0, 100.0, ProductCustomsAttributes::new("1234", "CA"));
    let est = engine
        .estimate_for_line_item(&line, &CountryCode::us(), None, &config())
        .unwrap();

    assert!(est.fta_exempt);
    assert_relative_eq!(est.rate_percent, 0.0);
    assert_relative_eq!(est.duty_usd, 0.0);
}

#[test]
fn test_missing_classification_vs_missing_profile() {
    let engine = engine_with(InMemoryProfileStore::new());
    let cfg = config();

    // Empty HS code and description: not applicable, no counter.
    let blank = CartLine::new(1, 1.0, 50.0, ProductCustomsAttributes::default());
    let cart = engine.estimate_for_cart(&[blank], &CountryCode::us(), None, &cfg);
    assert_relative_eq!(cart.total_usd, 0.0);
    assert_eq!(cart.missing_profiles, 0);

    // Classification present, no matching profile: counted.
    let unmatched = CartLine::new(2, 1.0, 50.0, ProductCustomsAttributes::new("9999", "DE"));
    let cart = engine.estimate_for_cart(&[unmatched], &CountryCode::us(), None, &cfg);
    assert_relative_eq!(cart.total_usd, 0.0);
    assert_eq!(cart.missing_profiles, 1);
    assert_eq!(cart.lines[0].resolution, ResolutionSource::Unmatched);
}

#[test]
fn test_cart_aggregation_composition_split() {
    let store = InMemoryProfileStore::new();
    // Line A: 10% commercial rate, not exempt.
    store.insert(profile(1, "6109", "DE", Channel::Commercial, 10.0));
    // Line B: CUSMA-flagged profile from Canada.
    let mut exempt = profile(2, "4202", "CA", Channel::Commercial, 9.0);
    exempt.fta_flags.insert("CUSMA".to_string());
    store.insert(exempt);

    let engine = engine_with(store);
    let lines = vec![
        CartLine::new(1, 1.0, 100.0, ProductCustomsAttributes::new("6109", "DE")),
        CartLine::new(2, 1.0, 50.0, ProductCustomsAttributes::new("4202", "CA")),
    ];
    let cart = engine.estimate_for_cart(&lines, &CountryCode::us(), None, &config());

    assert_relative_eq!(cart.total_usd, 10.0);
    assert_relative_eq!(cart.composition.cusma_value_usd, 50.0);
    assert_relative_eq!(cart.composition.non_cusma_value_usd, 100.0);
    assert_relative_eq!(cart.composition.total_value_usd, 150.0);
}

#[test]
fn test_channel_map_exact_beats_keyword() {
    let store = InMemoryProfileStore::new();
    store.insert(profile(1, "6109", "DE", Channel::Postal, 5.0));

    let engine = engine_with(store);
    let mut cfg = config();
    cfg.channel_rules
        .method_map
        .insert("flat_rate:3".to_string(), Channel::Postal);
    cfg.channel_rules
        .keyword_rules
        .push(("flat rate".to_string(), Channel::Commercial));

    let ctx = ShippingMethodContext::new("flat_rate:3", "Flat Rate");
    let line = CartLine::new(1, 1.0, 100.0, ProductCustomsAttributes::new("6109", "DE"));
    let est = engine
        .estimate_for_line_item(&line, &CountryCode::us(), Some(&ctx), &cfg)
        .unwrap();

    assert_eq!(est.channel, Channel::Postal);
    assert_eq!(est.channel_source, ChannelSource::MapExact);
    assert_relative_eq!(est.rate_percent, 5.0);
}

#[test]
fn test_context_without_matching_rules_uses_origin_heuristic() {
    let store = InMemoryProfileStore::new();
    store.insert(profile(1, "6109", "TW", Channel::Postal, 5.0));
    let engine = engine_with(store);

    // The default config has no method map, keywords, or default
    // channel, so the selected shipping method resolves nothing and
    // the line's Taiwan origin routes it postally.
    let ctx = ShippingMethodContext::new("unknown:9", "Courier Express");
    let line = CartLine::new(1, 1.0, 100.0, ProductCustomsAttributes::new("6109", "TW"));
    let cart = engine.estimate_for_cart(&[line], &CountryCode::us(), Some(&ctx), &config());

    assert_eq!(cart.lines[0].channel, Channel::Postal);
    assert_eq!(cart.lines[0].channel_source, ChannelSource::CountryHeuristic);
    assert_relative_eq!(cart.total_usd, 5.0);
}

#[test]
fn test_store_currency_conversion_in_cart() {
    let store = InMemoryProfileStore::new();
    store.insert(profile(1, "6109", "DE", Channel::Commercial, 10.0));

    let engine = engine_with(store);
    let mut cfg = config();
    cfg.store_currency = CurrencyCode::new("CAD");

    let line = CartLine::new(1, 1.0, 135.0, ProductCustomsAttributes::new("6109", "DE"));
    let cart = engine.estimate_for_cart(&[line], &CountryCode::us(), None, &cfg);

    // 135 CAD at 1.35 CAD per USD = 100 USD, 10% duty.
    assert_relative_eq!(cart.lines[0].value_usd, 100.0, epsilon = 1e-9);
    assert_relative_eq!(cart.total_usd, 10.0, epsilon = 1e-9);
}

#[test]
fn test_block_policy_signal() {
    let engine = engine_with(InMemoryProfileStore::new());
    let mut cfg = config();
    cfg.missing_profile_policy = MissingProfilePolicy::Block;

    let unmatched = CartLine::new(1, 1.0, 50.0, ProductCustomsAttributes::new("9999", "DE"));
    let cart = engine.estimate_for_cart(&[unmatched], &CountryCode::us(), None, &cfg);

    assert!(cart.should_block(&cfg));

    let blank = CartLine::new(2, 1.0, 50.0, ProductCustomsAttributes::default());
    let cart = engine.estimate_for_cart(&[blank], &CountryCode::us(), None, &cfg);
    assert!(!cart.should_block(&cfg));
}

#[test]
fn test_snapshot_from_checkout_estimate() {
    let store = InMemoryProfileStore::new();
    store.insert(profile(1, "6109", "DE", Channel::Commercial, 10.0));
    let mut exempt = profile(2, "4202", "CA", Channel::Commercial, 9.0);
    exempt.fta_flags.insert("CUSMA".to_string());
    store.insert(exempt);

    let engine = engine_with(store);
    let mut cfg = config();
    cfg.fees.commercial_fee_usd = 12.0;

    let lines = vec![
        CartLine::new(1, 1.0, 100.0, ProductCustomsAttributes::new("6109", "DE"))
            .with_description("Cotton t-shirt"),
        CartLine::new(2, 1.0, 50.0, ProductCustomsAttributes::new("4202", "CA"))
            .with_description("Leather bag"),
    ];
    let cart = engine.estimate_for_cart(&lines, &CountryCode::us(), None, &cfg);
    let snapshot = OrderDutySnapshot::from_cart(&cart, "checkout", Utc::now());

    assert_relative_eq!(snapshot.total_usd, 10.0);
    assert_relative_eq!(snapshot.fees_usd, 12.0);
    assert_eq!(snapshot.lines.len(), 2);
    assert_eq!(snapshot.scenario, "checkout");

    let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(json["composition"]["cusma_value_usd"], 50.0);
    assert_eq!(json["composition"]["non_cusma_value_usd"], 100.0);
    assert_eq!(json["composition"]["total_value_usd"], 150.0);

    let cusma_line = json["lines"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["product_id"] == 2)
        .unwrap();
    assert_eq!(cusma_line["cusma"], true);
    assert_eq!(cusma_line["duty_usd"], 0.0);
    assert_eq!(cusma_line["debug"]["exemption"], "cusma_flag");
}

#[test]
fn test_inherited_attributes_estimate() {
    use dutycalc::attributes::resolve_attributes;

    let store = InMemoryProfileStore::new();
    store.insert(profile(1, "6109", "TW", Channel::Postal, 5.0));
    let engine = engine_with(store);

    // Variation carries nothing; parent has the HS code, category the origin.
    let variation = ProductCustomsAttributes::default();
    let parent = ProductCustomsAttributes {
        hs_code: Some("6109".to_string()),
        ..Default::default()
    };
    let category = ProductCustomsAttributes {
        country_of_origin: Some(CountryCode::new("TW")),
        ..Default::default()
    };
    let attrs = resolve_attributes(&variation, Some(&parent), Some(&category));

    let line = CartLine::new(1, 2.0, 10.0, attrs);
    let est = engine
        .estimate_for_line_item(&line, &CountryCode::us(), None, &config())
        .unwrap();

    // TW origin routes postal by heuristic; postal table applies.
    assert_eq!(est.channel, Channel::Postal);
    assert_relative_eq!(est.rate_percent, 5.0);
    assert_relative_eq!(est.duty_usd, 1.0);
}
