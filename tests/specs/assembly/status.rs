//! Status specs
//!
//! Verify `fx status` installs the assembly and reports each component.

use crate::prelude::*;

fn row(name: &str, state: &str) -> String {
    format!("{:<24} {:<10}", name, state)
}

#[test]
fn healthy_assembly_is_all_active() {
    let temp = Project::empty();
    temp.file("shop.toml", HEALTHY);
    let expected = format!(
        "{:<24} {:<10} REASON\n{}\n{}\n",
        "COMPONENT",
        "STATE",
        row("Db", "active"),
        row("Cart", "active")
    );
    temp.fx()
        .args(&["status", "shop.toml"])
        .passes()
        .stdout_eq(&expected);
}

#[test]
fn blocked_components_show_their_unbound_slots() {
    let temp = Project::empty();
    temp.file("chain.toml", BROKEN_CHAIN);
    temp.fx()
        .args(&["status", "chain.toml"])
        .passes()
        .stdout_has(&format!("{} unsatisfied: math", row("Obj", "created")))
        .stdout_has(&format!("{} unsatisfied: string", row("Math", "created")));
}

#[test]
fn rejected_configuration_is_explained() {
    let temp = Project::empty();
    temp.file(
        "shop.toml",
        &HEALTHY.replace("{ url = \"postgres://shop\" }", "{ host = \"shop\" }"),
    );
    temp.fx()
        .args(&["status", "shop.toml"])
        .passes()
        .stdout_has("configuration rejected: missing required key(s): url");
}

#[test]
fn json_rows() {
    let temp = Project::empty();
    temp.file("chain.toml", BROKEN_CHAIN);
    let output = temp
        .fx()
        .args(&["status", "--format", "json", "chain.toml"])
        .passes();
    let rows: Vec<serde_json::Value> = serde_json::from_str(output.stdout()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["name"], "Math");
    assert_eq!(rows[1]["reason"], "unsatisfied: string");
}

#[test]
fn empty_assembly() {
    let temp = Project::empty();
    temp.file("empty.toml", "");
    temp.fx()
        .args(&["status", "empty.toml"])
        .passes()
        .stdout_eq("No components\n");
}
