//! Diagnosis specs
//!
//! Verify `fx wtf` separates circular dependencies from missing leaves.

use crate::prelude::*;

#[test]
fn healthy_assembly() {
    let temp = Project::empty();
    temp.file("shop.toml", HEALTHY);
    temp.fx()
        .args(&["wtf", "shop.toml"])
        .passes()
        .stdout_eq("No unregistered components found\n");
}

#[test]
fn missing_leaf_behind_a_chain() {
    let temp = Project::empty();
    temp.file("chain.toml", BROKEN_CHAIN);
    temp.fx()
        .args(&["wtf", "chain.toml"])
        .passes()
        .stdout_eq(
            "2 unregistered components found\n\
             -------------------------------\n\
             The following service(s) are missing:\n \
             * java.lang.String for component Math\n",
        );
}

#[test]
fn ring_is_a_cycle() {
    let temp = Project::empty();
    temp.file("ring.toml", RING);
    temp.fx()
        .args(&["wtf", "ring.toml"])
        .passes()
        .stdout_eq(
            "2 unregistered components found\n\
             -------------------------------\n\
             Circular dependencies:\n \
             * -> A -> B -> A\n",
        );
}

#[test]
fn missing_configuration_is_listed_separately() {
    let temp = Project::empty();
    temp.file(
        "mail.toml",
        r#"
[[component]]
name = "Mailer"
[[component.reference]]
name = "settings"
configuration = "mail"
"#,
    );
    temp.fx()
        .args(&["wtf", "mail.toml"])
        .passes()
        .stdout_has("The following configuration(s) are missing:\n * mail for component Mailer\n");
}

#[test]
fn single_component_root_cause() {
    let temp = Project::empty();
    temp.file("ring.toml", RING);
    temp.fx()
        .args(&["wtf", "--component", "B", "ring.toml"])
        .passes()
        .stdout_eq("B: circular dependency: B -> A -> B\n");
}
