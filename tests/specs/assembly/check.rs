//! Check specs
//!
//! Verify `fx check` parses and validates without installing.

use crate::prelude::*;

#[test]
fn healthy_assembly_summary() {
    let temp = Project::empty();
    temp.file("shop.toml", HEALTHY);
    temp.fx()
        .args(&["check", "shop.toml"])
        .passes()
        .stdout_eq("ok: 2 components, 1 services, 1 configurations\n");
}

#[test]
fn unresolvable_assembly_still_checks() {
    let temp = Project::empty();
    temp.file("chain.toml", BROKEN_CHAIN);
    temp.fx()
        .args(&["check", "chain.toml"])
        .passes()
        .stdout_eq("ok: 2 components, 0 services, 0 configurations\n");
}

#[test]
fn every_validation_error_is_listed() {
    let temp = Project::empty();
    temp.file(
        "bad.toml",
        r#"
[[component]]
name = "A"
[[component]]
name = "A"
[[configuration]]
pid = "p"
[[configuration]]
pid = "p"
"#,
    );
    temp.fx()
        .args(&["check", "bad.toml"])
        .fails()
        .stderr_has("assembly validation failed with 2 error(s)")
        .stderr_has("component 'A' is defined more than once")
        .stderr_has("configuration 'p' is defined more than once");
}
