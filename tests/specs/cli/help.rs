//! Help output specs
//!
//! Verify the CLI advertises its commands.

use crate::prelude::*;

#[test]
fn help_lists_every_command() {
    let temp = Project::empty();
    temp.fx()
        .args(&["--help"])
        .passes()
        .stdout_has("check")
        .stdout_has("status")
        .stdout_has("wtf");
}

#[test]
fn version_is_printed() {
    let temp = Project::empty();
    temp.fx()
        .args(&["--version"])
        .passes()
        .stdout_has("fx ");
}
