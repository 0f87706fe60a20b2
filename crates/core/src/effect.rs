// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events for state machine orchestration

use crate::config::Dictionary;
use crate::id::InstanceId;
use crate::service::ServiceId;
use serde::{Deserialize, Serialize};

/// Side effects requested by component state machines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Emit an event for listeners to observe
    Emit(Event),
    /// Publish the instance's provided interfaces in the service registry
    RegisterService {
        instance: InstanceId,
        interfaces: Vec<String>,
        properties: Dictionary,
    },
    /// Replace the properties of the instance's registration
    UpdateService {
        instance: InstanceId,
        properties: Dictionary,
    },
    /// Withdraw the instance's registration
    UnregisterService { instance: InstanceId },
}

/// Events emitted by the component runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Component lifecycle
    ComponentCreated {
        instance: InstanceId,
        component: String,
    },
    ComponentValidated {
        instance: InstanceId,
    },
    ComponentActivated {
        instance: InstanceId,
    },
    ComponentInvalidated {
        instance: InstanceId,
        reason: String,
    },
    ComponentReconfigured {
        instance: InstanceId,
    },
    ComponentDisposed {
        instance: InstanceId,
    },

    // Bindings
    DependencyBound {
        instance: InstanceId,
        slot: String,
        provider: String,
    },
    DependencyUnbound {
        instance: InstanceId,
        slot: String,
    },

    // Configuration
    ConfigurationRejected {
        instance: InstanceId,
        reason: String,
    },
    ConfigurationUpdated {
        pid: String,
    },
    ConfigurationDeleted {
        pid: String,
    },

    // Registry
    ServiceRegistered {
        id: ServiceId,
        interfaces: Vec<String>,
        owner: Option<InstanceId>,
    },
    ServiceUnregistered {
        id: ServiceId,
    },
}

impl Event {
    /// Short snake_case name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::ComponentCreated { .. } => "component_created",
            Event::ComponentValidated { .. } => "component_validated",
            Event::ComponentActivated { .. } => "component_activated",
            Event::ComponentInvalidated { .. } => "component_invalidated",
            Event::ComponentReconfigured { .. } => "component_reconfigured",
            Event::ComponentDisposed { .. } => "component_disposed",
            Event::DependencyBound { .. } => "dependency_bound",
            Event::DependencyUnbound { .. } => "dependency_unbound",
            Event::ConfigurationRejected { .. } => "configuration_rejected",
            Event::ConfigurationUpdated { .. } => "configuration_updated",
            Event::ConfigurationDeleted { .. } => "configuration_deleted",
            Event::ServiceRegistered { .. } => "service_registered",
            Event::ServiceUnregistered { .. } => "service_unregistered",
        }
    }

    /// The component instance this event concerns, if any
    pub fn instance(&self) -> Option<&InstanceId> {
        match self {
            Event::ComponentCreated { instance, .. }
            | Event::ComponentValidated { instance }
            | Event::ComponentActivated { instance }
            | Event::ComponentInvalidated { instance, .. }
            | Event::ComponentReconfigured { instance }
            | Event::ComponentDisposed { instance }
            | Event::DependencyBound { instance, .. }
            | Event::DependencyUnbound { instance, .. }
            | Event::ConfigurationRejected { instance, .. } => Some(instance),
            Event::ServiceRegistered { owner, .. } => owner.as_ref(),
            Event::ConfigurationUpdated { .. }
            | Event::ConfigurationDeleted { .. }
            | Event::ServiceUnregistered { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
