// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinations: units of work that end or fail as a whole
//!
//! This module provides:
//! - **Coordination** - participants notified together on end or failure
//! - **CoordinationManager** - id registry and thread-local nesting
//! - **Admin** - listing, lookup, forced failure and timeout changes by id
//! - **MaintenanceTask** - periodic expiry of overdue coordinations

pub mod admin;
#[allow(clippy::module_inception)]
pub mod coordination;
pub mod error;
pub mod maintenance;
pub mod manager;
pub mod participant;
mod stack;
pub mod variables;

#[cfg(test)]
pub(crate) mod test_support;

pub use admin::{render_table, CoordinationSnapshot};
pub use coordination::{Coordination, CoordinationState, EndOutcome, FailReason};
pub use error::CoordinationError;
pub use maintenance::{CoordinationStats, MaintenanceConfig, MaintenanceTask};
pub use manager::{
    CoordinationManager, ManagerConfig, DEFAULT_PARTICIPATION_TIMEOUT, IMPLICIT_NAME,
};
pub use participant::{Participant, ParticipantError};
pub use variables::Variables;
