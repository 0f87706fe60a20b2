// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime for the fx component engine
//!
//! Every mutation runs inside the calling thread's current coordination, or
//! an implicit one begun for it, and is followed by a settle loop that
//! re-evaluates every live component from the current registry until a full
//! pass changes nothing.

use crate::config::RuntimeConfig;
use crate::events::{EventListener, Listeners, PendingEvents};
use crate::{error::RuntimeError, Executor};
use fx_core::component::{AcceptAll, Bindings, Provider};
use fx_core::coordination::{CoordinationError, MaintenanceTask, IMPLICIT_NAME};
use fx_core::graph::{ComponentNode, DependencyGraph, DependencyNode, Diagnosis, RootCause};
use fx_core::{
    Clock, ComponentDescriptor, ComponentInput, ComponentInstance, ComponentState,
    ConfigValidator, CoordinationManager, DependencyKind, Dictionary, Event, FailReason, IdGen,
    InstanceId, ServiceFilter, ServiceId, ServiceRecord, SystemClock, UuidIdGen,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;

struct Entry {
    instance: ComponentInstance,
    validator: Arc<dyn ConfigValidator>,
    /// Set by `reconfigure`; replaces the pid's configuration until the pid changes
    supplied: Option<Dictionary>,
}

#[derive(Default)]
struct State {
    executor: Executor,
    /// Registration order
    components: Vec<Entry>,
    configurations: BTreeMap<String, Dictionary>,
}

impl State {
    fn index_of(&self, id: &InstanceId) -> Result<usize, RuntimeError> {
        self.components
            .iter()
            .position(|e| &e.instance.id == id)
            .ok_or_else(|| RuntimeError::ComponentNotFound(id.clone()))
    }

    /// Index of a live instance
    fn live(&self, id: &InstanceId) -> Result<usize, RuntimeError> {
        let index = self.index_of(id)?;
        if self.components[index].instance.state.is_disposed() {
            return Err(RuntimeError::Disposed(id.clone()));
        }
        Ok(index)
    }

    fn configuration_for(&self, index: usize) -> Dictionary {
        let entry = &self.components[index];
        let descriptor = &entry.instance.descriptor;
        let supplied = entry.supplied.as_ref().or_else(|| {
            descriptor
                .pid
                .as_ref()
                .and_then(|pid| self.configurations.get(pid))
        });
        descriptor.effective_configuration(supplied)
    }

    /// Bindings recomputed from scratch. Slots of one reference take distinct
    /// providers, oldest first; an instance never binds its own registration.
    fn bindings_for(&self, index: usize) -> Bindings {
        let instance = &self.components[index].instance;
        let registry = self.executor.registry();
        let mut bindings = Bindings::new();
        for reference in &instance.descriptor.references {
            let slots = reference.slots();
            match reference.kind {
                DependencyKind::Configuration => {
                    if self.configurations.contains_key(&reference.target) {
                        for slot in slots {
                            bindings.insert(slot.name, Provider::Configuration(reference.target.clone()));
                        }
                    }
                }
                DependencyKind::Service => {
                    let filter = ServiceFilter::parse(&reference.target);
                    let providers = registry.matching(&filter, Some(&instance.id));
                    for (slot, provider) in slots.into_iter().zip(providers) {
                        bindings.insert(slot.name, Provider::Service(provider.id));
                    }
                }
            }
        }
        bindings
    }

    /// Feed one input to an instance and execute the resulting effects.
    /// Returns whether anything happened.
    fn drive(
        &mut self,
        index: usize,
        input: ComponentInput,
        pending: &PendingEvents,
    ) -> Result<bool, RuntimeError> {
        let entry = &mut self.components[index];
        let (next, effects) = entry.instance.transition(input);
        if next.state != entry.instance.state {
            tracing::info!(
                instance = %next.id,
                component = next.name(),
                from = %entry.instance.state,
                to = %next.state,
                "transition"
            );
        }
        entry.instance = next;
        if effects.is_empty() {
            return Ok(false);
        }
        pending.extend(self.executor.execute_all(effects)?);
        Ok(true)
    }
}

/// Runtime that wires components to services and configurations
pub struct Runtime<C: Clock = SystemClock, I: IdGen = UuidIdGen> {
    config: RuntimeConfig,
    coordinations: CoordinationManager<C>,
    id_gen: I,
    listeners: Listeners,
    state: Mutex<State>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_deps(config, SystemClock, UuidIdGen)
    }
}

impl<C: Clock, I: IdGen> Runtime<C, I> {
    /// Create a runtime with explicit time and identity sources
    pub fn with_deps(config: RuntimeConfig, clock: C, id_gen: I) -> Self {
        Self {
            coordinations: CoordinationManager::with_clock(config.coordination.clone(), clock),
            config,
            id_gen,
            listeners: Listeners::default(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The manager whose coordinations batch this runtime's events
    pub fn coordinations(&self) -> &CoordinationManager<C> {
        &self.coordinations
    }

    /// Timeout reaper for this runtime's coordinations
    pub fn maintenance(&self) -> MaintenanceTask<C> {
        MaintenanceTask::new(self.config.maintenance.clone(), self.coordinations.clone())
    }

    /// Run [`maintenance`](Self::maintenance) on the current tokio runtime
    /// until `shutdown` turns true
    pub fn spawn_maintenance(&self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.maintenance().run(shutdown))
    }

    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        self.listeners.subscribe(listener);
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Add a component whose every configuration is acceptable
    pub fn add_component(&self, descriptor: ComponentDescriptor) -> Result<InstanceId, RuntimeError> {
        self.add_component_with_validator(descriptor, Arc::new(AcceptAll))
    }

    pub fn add_component_with_validator(
        &self,
        descriptor: ComponentDescriptor,
        validator: Arc<dyn ConfigValidator>,
    ) -> Result<InstanceId, RuntimeError> {
        self.mutate("add_component", |state, pending| {
            let id = self.id_gen.next();
            let instance = ComponentInstance::new(id.clone(), Arc::new(descriptor));
            tracing::info!(instance = %id, component = instance.name(), "created");
            pending.push(Event::ComponentCreated {
                instance: id.clone(),
                component: instance.name().to_string(),
            });
            state.components.push(Entry {
                instance,
                validator,
                supplied: None,
            });
            Ok(id)
        })
    }

    /// Register a service provided from outside the runtime
    pub fn register_service(
        &self,
        interfaces: Vec<String>,
        properties: Dictionary,
    ) -> Result<ServiceId, RuntimeError> {
        self.mutate("register_service", |state, pending| {
            let id = state
                .executor
                .registry_mut()
                .register(interfaces.clone(), properties, None);
            tracing::info!(service = %id, ?interfaces, "external service registered");
            pending.push(Event::ServiceRegistered {
                id,
                interfaces,
                owner: None,
            });
            Ok(id)
        })
    }

    /// Withdraw an external service. Registrations held by components are
    /// only withdrawn through their lifecycle.
    pub fn unregister_service(&self, id: ServiceId) -> Result<(), RuntimeError> {
        self.mutate("unregister_service", |state, pending| {
            let registry = state.executor.registry_mut();
            let record = registry.get(id).ok_or(RuntimeError::ServiceNotFound(id))?;
            if let Some(instance) = &record.owner {
                return Err(RuntimeError::OwnedService {
                    service: id,
                    instance: instance.clone(),
                });
            }
            registry.unregister(id);
            tracing::info!(service = %id, "external service unregistered");
            pending.push(Event::ServiceUnregistered { id });
            Ok(())
        })
    }

    /// Create or replace the configuration for `pid`.
    ///
    /// Instances using this pid drop any configuration given to them through
    /// [`reconfigure`](Self::reconfigure).
    pub fn update_configuration(&self, pid: &str, values: Dictionary) -> Result<(), RuntimeError> {
        self.mutate("update_configuration", |state, pending| {
            state.configurations.insert(pid.to_string(), values);
            for entry in &mut state.components {
                if entry.instance.descriptor.pid.as_deref() == Some(pid) {
                    entry.supplied = None;
                }
            }
            tracing::info!(pid, "configuration updated");
            pending.push(Event::ConfigurationUpdated {
                pid: pid.to_string(),
            });
            Ok(())
        })
    }

    /// Remove the configuration for `pid`; false if there was none
    pub fn delete_configuration(&self, pid: &str) -> Result<bool, RuntimeError> {
        self.mutate("delete_configuration", |state, pending| {
            if state.configurations.remove(pid).is_none() {
                return Ok(false);
            }
            tracing::info!(pid, "configuration deleted");
            pending.push(Event::ConfigurationDeleted {
                pid: pid.to_string(),
            });
            Ok(true)
        })
    }

    /// Supply a new configuration to one instance.
    ///
    /// An unacceptable configuration is not an error: the instance becomes
    /// invalid and the returned state says so.
    pub fn reconfigure(
        &self,
        id: &InstanceId,
        configuration: Dictionary,
    ) -> Result<ComponentState, RuntimeError> {
        self.mutate("reconfigure", |state, _| {
            let index = state.live(id)?;
            state.components[index].supplied = Some(configuration);
            Ok(())
        })?;
        self.component(id)
            .map(|c| c.state)
            .ok_or_else(|| RuntimeError::ComponentNotFound(id.clone()))
    }

    pub fn dispose(&self, id: &InstanceId) -> Result<(), RuntimeError> {
        self.mutate("dispose", |state, pending| {
            let index = state.live(id)?;
            state.drive(index, ComponentInput::Dispose, pending)?;
            Ok(())
        })
    }

    /// Dispose every live instance and release all coordinations.
    /// Returns how many instances were disposed.
    pub fn shutdown(&self) -> Result<usize, RuntimeError> {
        let disposed = self.mutate("shutdown", |state, pending| {
            let mut disposed = 0;
            for index in 0..state.components.len() {
                if !state.components[index].instance.state.is_disposed() {
                    state.drive(index, ComponentInput::Dispose, pending)?;
                    disposed += 1;
                }
            }
            Ok(disposed)
        })?;
        self.coordinations.clean_up();
        tracing::info!(disposed, "runtime shut down");
        Ok(disposed)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn component(&self, id: &InstanceId) -> Option<ComponentInstance> {
        let state = self.lock();
        state
            .components
            .iter()
            .find(|e| &e.instance.id == id)
            .map(|e| e.instance.clone())
    }

    /// Every instance, disposed ones included, in registration order
    pub fn components(&self) -> Vec<ComponentInstance> {
        self.lock()
            .components
            .iter()
            .map(|e| e.instance.clone())
            .collect()
    }

    pub fn services(&self) -> Vec<ServiceRecord> {
        self.lock().executor.registry().services().cloned().collect()
    }

    pub fn configuration(&self, pid: &str) -> Option<Dictionary> {
        self.lock().configurations.get(pid).cloned()
    }

    /// Snapshot of live components as a dependency graph
    pub fn graph(&self) -> DependencyGraph {
        let state = self.lock();
        let nodes = state
            .components
            .iter()
            .filter(|e| !e.instance.state.is_disposed())
            .map(|e| graph_node(&e.instance))
            .collect();
        DependencyGraph::build(nodes)
    }

    pub fn diagnose(&self) -> Diagnosis {
        Diagnosis::of(&self.graph())
    }

    /// Why the named component is not registered; `None` if it is
    pub fn root_cause(&self, component: &str) -> Option<RootCause> {
        self.graph().root_cause(component)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `f` and settle, inside the current coordination or an implicit
    /// one that is ended (or failed on error) before returning
    fn mutate<R>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&mut State, &PendingEvents) -> Result<R, RuntimeError>,
    ) -> Result<R, RuntimeError> {
        let span = tracing::debug_span!("mutate", operation);
        let _guard = span.enter();

        let (coordination, owned) = match self.coordinations.current() {
            Some(current) => (current, false),
            None => (self.coordinations.begin(IMPLICIT_NAME), true),
        };
        let pending = coordination
            .variables()
            .get_or_insert_with(|| PendingEvents::new(self.listeners.clone()));
        let joined = coordination.participate(pending.clone());

        let result = {
            let mut state = self.lock();
            let state = &mut *state;
            f(state, pending.as_ref()).and_then(|value| {
                self.settle(state, pending.as_ref())?;
                Ok(value)
            })
        };

        if owned {
            let closed = match &result {
                Ok(_) => coordination.end().map(|_| ()),
                Err(e) => {
                    coordination.fail(FailReason::Message(e.to_string()));
                    Ok(())
                }
            };
            match closed {
                Ok(()) => {}
                Err(CoordinationError::AlreadyTerminated { .. }) => {
                    tracing::warn!(
                        coordination = coordination.id(),
                        failure = ?coordination.failure(),
                        "batch terminated while the change was applied"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        // Terminated elsewhere mid-change: whatever arrived after its
        // participants were notified is still pending here.
        if !joined || coordination.is_terminated() {
            pending.flush();
        }
        result
    }

    /// Re-evaluate every live instance until a pass produces no effects
    fn settle(&self, state: &mut State, pending: &PendingEvents) -> Result<(), RuntimeError> {
        for pass in 1..=self.config.max_settle_passes {
            let mut changed = false;
            for index in 0..state.components.len() {
                if state.components[index].instance.state.is_disposed() {
                    continue;
                }
                let configuration = state.configuration_for(index);
                let verdict = state.components[index].validator.validate(&configuration);
                changed |= state.drive(
                    index,
                    ComponentInput::Reconfigure {
                        configuration,
                        verdict,
                    },
                    pending,
                )?;

                let bindings = state.bindings_for(index);
                changed |= state.drive(index, ComponentInput::Rebind { bindings }, pending)?;
                changed |= state.drive(index, ComponentInput::Activate, pending)?;
            }
            if !changed {
                tracing::trace!(passes = pass, "settled");
                return Ok(());
            }
        }
        tracing::warn!(
            passes = self.config.max_settle_passes,
            "components did not settle"
        );
        Ok(())
    }
}

fn graph_node(instance: &ComponentInstance) -> ComponentNode {
    let descriptor = &instance.descriptor;
    let mut node =
        ComponentNode::new(instance.name()).registered(instance.state == ComponentState::Active);
    node.provides = descriptor.provides.clone();
    node.properties = instance.service_properties();
    for slot in descriptor.slots() {
        let dependency = match slot.kind {
            DependencyKind::Service => DependencyNode::service(&slot.name, &slot.target),
            DependencyKind::Configuration => DependencyNode::configuration(&slot.name, &slot.target),
        };
        let dependency = if slot.optional {
            dependency.optional()
        } else {
            dependency
        };
        node = node.with_dependency(dependency.available(instance.bindings.contains_key(&slot.name)));
    }
    node
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
