// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared blackboard attached to a coordination, keyed by value type

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type Slot = Arc<dyn Any + Send + Sync>;

/// One value per type, visible to every party of the coordination
#[derive(Default)]
pub struct Variables {
    slots: Mutex<HashMap<TypeId, Slot>>,
}

impl Variables {
    /// Store `value`, returning the value previously held for `T`
    pub fn insert<T: Any + Send + Sync>(&self, value: T) -> Option<Arc<T>> {
        let previous = self.slots().insert(TypeId::of::<T>(), Arc::new(value) as Slot);
        previous.and_then(|slot| slot.downcast::<T>().ok())
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let slot = self.slots().get(&TypeId::of::<T>()).cloned()?;
        slot.downcast::<T>().ok()
    }

    /// Return the value for `T`, creating it with `init` if absent.
    ///
    /// `init` runs with the blackboard locked and must not touch it.
    pub fn get_or_insert_with<T: Any + Send + Sync>(&self, init: impl FnOnce() -> T) -> Arc<T> {
        let mut slots = self.slots();
        if let Some(existing) = slots.get(&TypeId::of::<T>()).cloned() {
            if let Ok(value) = existing.downcast::<T>() {
                return value;
            }
        }
        let value = Arc::new(init());
        slots.insert(TypeId::of::<T>(), value.clone() as Slot);
        value
    }

    pub fn remove<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let slot = self.slots().remove(&TypeId::of::<T>())?;
        slot.downcast::<T>().ok()
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<TypeId, Slot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for Variables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Variables").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
#[path = "variables_tests.rs"]
mod tests;
