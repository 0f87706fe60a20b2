// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effect executor

use crate::registry::ServiceRegistry;
use fx_core::{Effect, Event, InstanceId};
use thiserror::Error;

/// Errors that can occur during effect execution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    #[error("instance {0} already holds a registration")]
    AlreadyRegistered(InstanceId),
    #[error("instance {0} holds no registration")]
    NotRegistered(InstanceId),
}

/// Applies component effects to the service registry
#[derive(Debug, Default)]
pub struct Executor {
    registry: ServiceRegistry,
}

impl Executor {
    /// Execute a single effect with tracing
    ///
    /// Returns the event to deliver to listeners, if any.
    pub fn execute(&mut self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        let span = tracing::debug_span!("effect", effect = effect_name(&effect));
        let _guard = span.enter();

        let result = self.execute_inner(effect);
        if let Err(e) = &result {
            tracing::error!(error = %e, "failed");
        }
        result
    }

    fn execute_inner(&mut self, effect: Effect) -> Result<Option<Event>, ExecuteError> {
        match effect {
            Effect::Emit(event) => {
                tracing::debug!(event = event.name(), "emit");
                Ok(Some(event))
            }

            Effect::RegisterService {
                instance,
                interfaces,
                properties,
            } => {
                if self.registry.owned_by(&instance).is_some() {
                    return Err(ExecuteError::AlreadyRegistered(instance));
                }
                let id = self
                    .registry
                    .register(interfaces.clone(), properties, Some(instance.clone()));
                tracing::info!(%instance, service = %id, ?interfaces, "registered");
                Ok(Some(Event::ServiceRegistered {
                    id,
                    interfaces,
                    owner: Some(instance),
                }))
            }

            Effect::UpdateService {
                instance,
                properties,
            } => {
                let id = self
                    .registry
                    .owned_by(&instance)
                    .ok_or_else(|| ExecuteError::NotRegistered(instance.clone()))?;
                self.registry.update(id, properties);
                tracing::debug!(%instance, service = %id, "updated");
                Ok(None)
            }

            Effect::UnregisterService { instance } => {
                let id = self
                    .registry
                    .owned_by(&instance)
                    .ok_or_else(|| ExecuteError::NotRegistered(instance.clone()))?;
                self.registry.unregister(id);
                tracing::info!(%instance, service = %id, "unregistered");
                Ok(Some(Event::ServiceUnregistered { id }))
            }
        }
    }

    /// Execute effects in order, collecting their events
    pub fn execute_all(&mut self, effects: Vec<Effect>) -> Result<Vec<Event>, ExecuteError> {
        let mut events = Vec::new();
        for effect in effects {
            if let Some(event) = self.execute(effect)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ServiceRegistry {
        &mut self.registry
    }
}

fn effect_name(effect: &Effect) -> &'static str {
    match effect {
        Effect::Emit(_) => "emit",
        Effect::RegisterService { .. } => "register_service",
        Effect::UpdateService { .. } => "update_service",
        Effect::UnregisterService { .. } => "unregister_service",
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
