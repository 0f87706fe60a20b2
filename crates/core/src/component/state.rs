// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Component instance state machine
//!
//! ```text
//! Created --eligible--> Valid --Activate--> Active
//! Valid/Active --dependency lost or config rejected--> Invalid
//! Invalid --eligible again--> Valid
//! any --Dispose--> Disposed
//! ```
//!
//! An instance is eligible when every required slot is bound and its current
//! configuration was accepted. Transitions are pure: inputs carry everything
//! needed and side effects come back as [`Effect`]s.

use super::descriptor::ComponentDescriptor;
use super::validator::Verdict;
use crate::config::Dictionary;
use crate::effect::{Effect, Event};
use crate::id::InstanceId;
use crate::service::ServiceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Property added to every registration, naming the providing component
pub const COMPONENT_NAME: &str = "component.name";

/// What satisfies a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Service(ServiceId),
    Configuration(String),
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Service(id) => write!(f, "{}", id),
            Provider::Configuration(pid) => write!(f, "configuration {}", pid),
        }
    }
}

/// Slot name to bound provider; unbound slots are absent
pub type Bindings = BTreeMap<String, Provider>;

/// Why an instance is not eligible
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidReason {
    /// Required slots with no provider, in declaration order
    Unsatisfied { slots: Vec<String> },
    /// The validator rejected the current configuration
    Rejected { reason: String },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Unsatisfied { slots } => {
                write!(f, "unsatisfied: {}", slots.join(", "))
            }
            InvalidReason::Rejected { reason } => write!(f, "configuration rejected: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ComponentState {
    Created,
    Valid,
    Active,
    Invalid { reason: InvalidReason },
    Disposed,
}

impl ComponentState {
    pub fn name(&self) -> &'static str {
        match self {
            ComponentState::Created => "created",
            ComponentState::Valid => "valid",
            ComponentState::Active => "active",
            ComponentState::Invalid { .. } => "invalid",
            ComponentState::Disposed => "disposed",
        }
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self, ComponentState::Disposed)
    }
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inputs that drive an instance
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentInput {
    /// Replace all bindings with a freshly computed set
    Rebind { bindings: Bindings },
    /// Apply a configuration together with the validator's verdict on it
    Reconfigure {
        configuration: Dictionary,
        verdict: Verdict,
    },
    /// Register provided services; only acts on a valid instance
    Activate,
    Dispose,
}

/// A live instance of a component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentInstance {
    pub id: InstanceId,
    #[serde(skip)]
    pub descriptor: Arc<ComponentDescriptor>,
    pub state: ComponentState,
    pub configuration: Dictionary,
    pub verdict: Verdict,
    pub bindings: Bindings,
}

impl ComponentInstance {
    /// A new instance with its descriptor's default properties as configuration
    pub fn new(id: InstanceId, descriptor: Arc<ComponentDescriptor>) -> Self {
        Self {
            id,
            configuration: descriptor.properties.clone(),
            descriptor,
            state: ComponentState::Created,
            verdict: Verdict::Accept,
            bindings: Bindings::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Required slots without a provider, in declaration order
    pub fn unbound_required(&self) -> Vec<String> {
        self.descriptor
            .slots()
            .into_iter()
            .filter(|s| s.is_required() && !self.bindings.contains_key(&s.name))
            .map(|s| s.name)
            .collect()
    }

    /// Why the instance cannot become valid; `None` when eligible
    pub fn blocker(&self) -> Option<InvalidReason> {
        let slots = self.unbound_required();
        if !slots.is_empty() {
            return Some(InvalidReason::Unsatisfied { slots });
        }
        match &self.verdict {
            Verdict::Accept => None,
            Verdict::Reject { reason } => Some(InvalidReason::Rejected {
                reason: reason.clone(),
            }),
        }
    }

    pub fn is_eligible(&self) -> bool {
        self.blocker().is_none()
    }

    /// Properties published with the instance's registration
    pub fn service_properties(&self) -> Dictionary {
        let mut properties = self.configuration.clone();
        properties.insert(COMPONENT_NAME, self.descriptor.name.clone());
        properties
    }

    /// Whether the instance holds a service registration in its current state
    pub fn is_registered(&self) -> bool {
        self.state == ComponentState::Active && !self.descriptor.provides.is_empty()
    }

    pub fn transition(&self, input: ComponentInput) -> (ComponentInstance, Vec<Effect>) {
        if self.state.is_disposed() {
            return (self.clone(), vec![]);
        }

        match input {
            ComponentInput::Rebind { bindings } => {
                let mut next = self.clone();
                let mut effects = self.binding_events(&bindings);
                next.bindings = bindings;
                effects.extend(next.settle(self));
                (next, effects)
            }
            ComponentInput::Reconfigure {
                configuration,
                verdict,
            } => {
                if configuration == self.configuration && verdict == self.verdict {
                    return (self.clone(), vec![]);
                }
                let mut next = self.clone();
                let mut effects = Vec::new();
                if let Verdict::Reject { reason } = &verdict {
                    effects.push(Effect::Emit(Event::ConfigurationRejected {
                        instance: self.id.clone(),
                        reason: reason.clone(),
                    }));
                }
                let changed = configuration != self.configuration;
                next.configuration = configuration;
                next.verdict = verdict;
                effects.extend(next.settle(self));

                // still active under a new configuration: refresh the registration
                if changed && self.state == ComponentState::Active && next.state == ComponentState::Active {
                    if next.is_registered() {
                        effects.push(Effect::UpdateService {
                            instance: self.id.clone(),
                            properties: next.service_properties(),
                        });
                    }
                    effects.push(Effect::Emit(Event::ComponentReconfigured {
                        instance: self.id.clone(),
                    }));
                }
                (next, effects)
            }
            ComponentInput::Activate => {
                if self.state != ComponentState::Valid || !self.is_eligible() {
                    return (self.clone(), vec![]);
                }
                let next = self.with_state(ComponentState::Active);
                let mut effects = Vec::new();
                if next.is_registered() {
                    effects.push(Effect::RegisterService {
                        instance: self.id.clone(),
                        interfaces: self.descriptor.provides.clone(),
                        properties: next.service_properties(),
                    });
                }
                effects.push(Effect::Emit(Event::ComponentActivated {
                    instance: self.id.clone(),
                }));
                (next, effects)
            }
            ComponentInput::Dispose => {
                let mut effects = Vec::new();
                if self.is_registered() {
                    effects.push(Effect::UnregisterService {
                        instance: self.id.clone(),
                    });
                }
                effects.push(Effect::Emit(Event::ComponentDisposed {
                    instance: self.id.clone(),
                }));
                let mut next = self.with_state(ComponentState::Disposed);
                next.bindings.clear();
                (next, effects)
            }
        }
    }

    /// Move `self` (already carrying new bindings or configuration) to the
    /// state its eligibility calls for, starting from `before`
    fn settle(&mut self, before: &ComponentInstance) -> Vec<Effect> {
        let mut effects = Vec::new();
        match (self.blocker(), &before.state) {
            (None, ComponentState::Created | ComponentState::Invalid { .. }) => {
                self.state = ComponentState::Valid;
                effects.push(Effect::Emit(Event::ComponentValidated {
                    instance: self.id.clone(),
                }));
            }
            (None, _) => {}
            (Some(reason), ComponentState::Valid | ComponentState::Active) => {
                if before.is_registered() {
                    effects.push(Effect::UnregisterService {
                        instance: self.id.clone(),
                    });
                }
                effects.push(Effect::Emit(Event::ComponentInvalidated {
                    instance: self.id.clone(),
                    reason: reason.to_string(),
                }));
                self.state = ComponentState::Invalid { reason };
            }
            (Some(reason), ComponentState::Invalid { .. }) => {
                self.state = ComponentState::Invalid { reason };
            }
            (Some(_), _) => {}
        }
        effects
    }

    fn binding_events(&self, bindings: &Bindings) -> Vec<Effect> {
        let mut effects = Vec::new();
        for slot in self.descriptor.slots() {
            let old = self.bindings.get(&slot.name);
            let new = bindings.get(&slot.name);
            if old == new {
                continue;
            }
            if old.is_some() {
                effects.push(Effect::Emit(Event::DependencyUnbound {
                    instance: self.id.clone(),
                    slot: slot.name.clone(),
                }));
            }
            if let Some(provider) = new {
                effects.push(Effect::Emit(Event::DependencyBound {
                    instance: self.id.clone(),
                    slot: slot.name.clone(),
                    provider: provider.to_string(),
                }));
            }
        }
        effects
    }

    fn with_state(&self, state: ComponentState) -> ComponentInstance {
        ComponentInstance {
            state,
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
