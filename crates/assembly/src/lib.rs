// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Assembly parsing and definition
//!
//! An assembly is a TOML file describing components, the external services
//! and configurations around them, and optional runtime settings.

mod loader;
mod parser;
mod types;
mod validate;

pub use loader::{load_assembly, LoadError};
pub use parser::{parse_assembly, ParseError};
pub use types::{Assembly, ComponentDef, ConfigurationDef, ServiceDef, ValidationDef};
pub use validate::{validate_assembly, ValidationError, ValidationErrors};
