// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fx-core: core of the fx service component runtime
//!
//! This crate provides:
//! - Coordinations: thread-scoped units of work with participant callbacks
//! - A pure state machine for component instance lifecycle
//! - Reconfiguration validators
//! - Dependency graph diagnostics (cycles and missing providers)

pub mod clock;
pub mod id;

pub mod component;
pub mod config;
pub mod coordination;
pub mod effect;
pub mod graph;
pub mod service;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use component::{
    ComponentDescriptor, ComponentInput, ComponentInstance, ComponentState, ConfigValidator,
    DependencyKind, Reference, Verdict,
};
pub use config::{Dictionary, Value};
pub use coordination::{
    Coordination, CoordinationError, CoordinationManager, CoordinationState, FailReason,
    ManagerConfig, Participant,
};
pub use effect::{Effect, Event};
pub use graph::{ComponentNode, DependencyGraph, DependencyNode, Diagnosis, RootCause};
pub use id::{IdGen, InstanceId, SequentialIdGen, UuidIdGen};
pub use service::{ServiceFilter, ServiceId, ServiceRecord};
