// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Components: descriptors, instance lifecycle and configuration validation

pub mod descriptor;
pub mod state;
pub mod validator;

pub use descriptor::{ComponentDescriptor, DependencyKind, Reference, Slot};
pub use state::{
    Bindings, ComponentInput, ComponentInstance, ComponentState, InvalidReason, Provider,
    COMPONENT_NAME,
};
pub use validator::{review, AcceptAll, AllOf, ConfigValidator, PatternRules, RequiredKeys, Verdict};
