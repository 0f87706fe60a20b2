// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

fn table(text: &str) -> toml::Table {
    toml::from_str(text).unwrap()
}

#[test]
fn empty_table_gives_defaults() {
    assert_eq!(
        RuntimeConfig::from_table(&toml::Table::new()).unwrap(),
        RuntimeConfig::default()
    );
}

#[test]
fn nested_sections_parse_durations() {
    let config = RuntimeConfig::from_table(&table(
        r#"
max_settle_passes = 8

[coordination]
default_timeout = "30s"

[maintenance]
interval = "250ms"
enabled = false
"#,
    ))
    .unwrap();

    assert_eq!(config.max_settle_passes, 8);
    assert_eq!(config.coordination.default_timeout, Duration::from_secs(30));
    assert_eq!(config.maintenance.interval, Duration::from_millis(250));
    assert!(!config.maintenance.enabled);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = RuntimeConfig::from_table(&table("max_passes = 3")).unwrap_err();
    assert!(matches!(err, RuntimeError::Config(_)));
}

#[test]
fn assembly_without_runtime_uses_defaults() {
    let assembly = fx_assembly::parse_assembly("").unwrap();
    assert_eq!(
        RuntimeConfig::from_assembly(&assembly).unwrap().max_settle_passes,
        DEFAULT_MAX_SETTLE_PASSES
    );
}
