// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! fx component runtime
//!
//! Owns component instances, the service registry and configurations, and
//! keeps every instance bound to whatever currently satisfies it.

mod config;
mod error;
mod events;
mod executor;
mod install;
mod registry;
mod runtime;

pub use config::{RuntimeConfig, DEFAULT_MAX_SETTLE_PASSES};
pub use error::RuntimeError;
pub use events::{EventListener, EventLog, Listeners};
pub use executor::{ExecuteError, Executor};
pub use install::INSTALL_NAME;
pub use registry::ServiceRegistry;
pub use runtime::Runtime;
