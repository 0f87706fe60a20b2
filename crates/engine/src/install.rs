// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Installing an assembly into a runtime

use crate::{Runtime, RuntimeConfig, RuntimeError};
use fx_assembly::{validate_assembly, Assembly};
use fx_core::{Clock, FailReason, IdGen, InstanceId};

/// Name of the coordination an install runs in
pub const INSTALL_NAME: &str = "install";

impl Runtime {
    /// A runtime configured by the assembly's `[runtime]` table with the
    /// assembly installed
    pub fn from_assembly(assembly: &Assembly) -> Result<Self, RuntimeError> {
        let runtime = Runtime::new(RuntimeConfig::from_assembly(assembly)?);
        runtime.install(assembly)?;
        Ok(runtime)
    }
}

impl<C: Clock, I: IdGen> Runtime<C, I> {
    /// Add an assembly's configurations, then its external services, then its
    /// components, in file order.
    ///
    /// Everything happens inside one coordination, the caller's current one
    /// if there is one, so listeners see the whole install as a single batch.
    /// Nothing is added when the assembly fails validation.
    pub fn install(&self, assembly: &Assembly) -> Result<Vec<InstanceId>, RuntimeError> {
        validate_assembly(assembly)?;
        let mut validators = Vec::with_capacity(assembly.components.len());
        for def in &assembly.components {
            let validator = def.validation.build().map_err(|e| RuntimeError::Pattern {
                component: def.descriptor.name.clone(),
                message: e.to_string(),
            })?;
            validators.push(validator);
        }

        let (coordination, owned) = match self.coordinations().current() {
            Some(current) => (current, false),
            None => (self.coordinations().begin(INSTALL_NAME), true),
        };
        let span = tracing::info_span!("install", coordination = coordination.id());
        let _guard = span.enter();

        let result = (|| -> Result<Vec<InstanceId>, RuntimeError> {
            for def in &assembly.configurations {
                self.update_configuration(&def.pid, def.values.clone())?;
            }
            for def in &assembly.services {
                self.register_service(def.interfaces.clone(), def.properties.clone())?;
            }
            let mut ids = Vec::with_capacity(assembly.components.len());
            for (def, validator) in assembly.components.iter().zip(validators) {
                ids.push(self.add_component_with_validator(def.descriptor.clone(), validator)?);
            }
            Ok(ids)
        })();

        match result {
            Ok(ids) => {
                if owned {
                    coordination.end()?;
                }
                tracing::info!(components = ids.len(), "assembly installed");
                Ok(ids)
            }
            Err(e) => {
                tracing::error!(error = %e, "install failed");
                if owned {
                    coordination.fail(FailReason::Message(e.to_string()));
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "install_tests.rs"]
mod tests;
