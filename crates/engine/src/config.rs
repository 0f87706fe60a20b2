// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime settings

use crate::RuntimeError;
use fx_core::coordination::MaintenanceConfig;
use fx_core::ManagerConfig;
use serde::{Deserialize, Serialize};

/// Default bound on settle passes per mutation
pub const DEFAULT_MAX_SETTLE_PASSES: usize = 64;

/// Runtime settings, readable from an assembly's `[runtime]` table:
///
/// ```toml
/// [runtime]
/// max_settle_passes = 16
///
/// [runtime.coordination]
/// default_timeout = "30s"
///
/// [runtime.maintenance]
/// interval = "500ms"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub coordination: ManagerConfig,
    pub maintenance: MaintenanceConfig,
    /// Passes over all components before a mutation gives up converging
    pub max_settle_passes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            coordination: ManagerConfig::default(),
            maintenance: MaintenanceConfig::default(),
            max_settle_passes: DEFAULT_MAX_SETTLE_PASSES,
        }
    }
}

impl RuntimeConfig {
    pub fn from_table(table: &toml::Table) -> Result<Self, RuntimeError> {
        Ok(toml::Value::Table(table.clone()).try_into()?)
    }

    /// Settings from an assembly, defaults when it has no `[runtime]` table
    pub fn from_assembly(assembly: &fx_assembly::Assembly) -> Result<Self, RuntimeError> {
        match &assembly.runtime {
            Some(table) => Self::from_table(table),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
