//! Error reporting specs
//!
//! Verify failures exit with code 1 and a single `error:` prefix.

use crate::prelude::*;

#[test]
fn missing_assembly_file() {
    let temp = Project::empty();
    let output = temp
        .fx()
        .args(&["check", "absent.toml"])
        .fails()
        .stderr_has("error: cannot read absent.toml");
    assert_eq!(output.code(), 1);
}

#[test]
fn malformed_toml() {
    let temp = Project::empty();
    temp.file("bad.toml", "[[component]\n");
    temp.fx()
        .args(&["status", "bad.toml"])
        .fails()
        .stderr_has("error: bad.toml: TOML parse error");
}

#[test]
fn reference_without_target() {
    let temp = Project::empty();
    temp.file(
        "bad.toml",
        "[[component]]\nname = \"A\"\n[[component.reference]]\nname = \"x\"\n",
    );
    temp.fx()
        .args(&["wtf", "bad.toml"])
        .fails()
        .stderr_has("missing required field: component.A.reference[0].service");
}

#[test]
fn unknown_runtime_setting() {
    let temp = Project::empty();
    temp.file("bad.toml", "[runtime]\nmax_passes = 3\n");
    temp.fx()
        .args(&["status", "bad.toml"])
        .fails()
        .stderr_has("invalid runtime settings");
}

#[test]
fn unknown_command_is_a_usage_error() {
    let temp = Project::empty();
    let output = temp.fx().args(&["frobnicate"]).fails();
    assert_eq!(output.code(), 2);
}
