// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn interfaces(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn parse_plain_interface() {
    let filter = ServiceFilter::parse("java.lang.String");
    assert_eq!(filter.interface(), "java.lang.String");
    assert!(filter.properties().is_empty());
}

#[test]
fn parse_interface_with_properties() {
    let filter = ServiceFilter::parse("Store(region=eu, tier=gold)");
    assert_eq!(filter.interface(), "Store");
    assert_eq!(
        filter.properties(),
        &[
            ("region".to_string(), "eu".to_string()),
            ("tier".to_string(), "gold".to_string())
        ]
    );
    assert_eq!(filter.to_string(), "Store(region=eu,tier=gold)");
}

#[test]
fn parse_skips_malformed_pairs() {
    let filter = ServiceFilter::parse("Store(region, a=b=c, tier=gold)");
    assert_eq!(
        filter.properties(),
        &[("tier".to_string(), "gold".to_string())]
    );
}

#[parameterized(
    plain_match = { "Store", &["Store"], true },
    other_interface = { "Store", &["Cache"], false },
    one_of_many = { "Store", &["Cache", "Store"], true },
    property_match = { "Store(region=eu)", &["Store"], true },
    property_mismatch = { "Store(region=us)", &["Store"], false },
    property_missing = { "Store(zone=a)", &["Store"], false },
)]
fn filter_matching(filter: &str, offered: &[&str], expected: bool) {
    let props = Dictionary::new().with("region", "eu").with("tier", "gold");
    let filter = ServiceFilter::parse(filter);
    assert_eq!(filter.matches(&interfaces(offered), &props), expected);
}

#[test]
fn property_values_compare_by_display_form() {
    let props = Dictionary::new().with("rank", 3i64);
    let filter = ServiceFilter::new("Store").with_property("rank", "3");
    assert!(filter.matches(&interfaces(&["Store"]), &props));
}
