// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process service registry

use fx_core::{Dictionary, InstanceId, ServiceFilter, ServiceId, ServiceRecord};
use std::collections::BTreeMap;

/// Registered services in registration order.
///
/// Ids are never reused, so the lowest matching id is always the longest
/// standing provider.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    next_id: u64,
    services: BTreeMap<ServiceId, ServiceRecord>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        interfaces: Vec<String>,
        properties: Dictionary,
        owner: Option<InstanceId>,
    ) -> ServiceId {
        self.next_id += 1;
        let id = ServiceId(self.next_id);
        self.services.insert(
            id,
            ServiceRecord {
                id,
                interfaces,
                properties,
                owner,
            },
        );
        id
    }

    pub fn unregister(&mut self, id: ServiceId) -> Option<ServiceRecord> {
        self.services.remove(&id)
    }

    /// Replace a registration's properties; false if `id` is unknown
    pub fn update(&mut self, id: ServiceId, properties: Dictionary) -> bool {
        match self.services.get_mut(&id) {
            Some(record) => {
                record.properties = properties;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ServiceId) -> Option<&ServiceRecord> {
        self.services.get(&id)
    }

    /// The registration held by a component instance
    pub fn owned_by(&self, instance: &InstanceId) -> Option<ServiceId> {
        self.services
            .values()
            .find(|s| s.owner.as_ref() == Some(instance))
            .map(|s| s.id)
    }

    /// Services satisfying `filter`, oldest first, skipping those owned by `exclude`
    pub fn matching(&self, filter: &ServiceFilter, exclude: Option<&InstanceId>) -> Vec<&ServiceRecord> {
        self.services
            .values()
            .filter(|s| exclude.is_none() || s.owner.as_ref() != exclude)
            .filter(|s| s.provides(filter))
            .collect()
    }

    pub fn services(&self) -> impl Iterator<Item = &ServiceRecord> {
        self.services.values()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
