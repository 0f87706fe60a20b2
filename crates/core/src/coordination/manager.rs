// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination manager: id registry plus per-thread nesting
//!
//! The registry is shared by every thread using the manager. The stack of
//! "current" coordinations is thread-local and scoped to the manager, so
//! `begin` on one thread is invisible to all others.

use super::coordination::{Coordination, FailReason};
use super::error::CoordinationError;
use super::participant::Participant;
use super::stack;
use crate::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Name given to coordinations started by [`CoordinationManager::participate_or_begin`]
pub const IMPLICIT_NAME: &str = "implicit";

static NEXT_SCOPE: AtomicU64 = AtomicU64::new(1);

/// How long joining waits for a participant held elsewhere
pub const DEFAULT_PARTICIPATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Manager settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Timeout given to new coordinations; zero means none
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,
    /// Wait for a participant held by another coordination; zero waits forever
    #[serde(with = "humantime_serde")]
    pub participation_timeout: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::ZERO,
            participation_timeout: DEFAULT_PARTICIPATION_TIMEOUT,
        }
    }
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_participation_timeout(mut self, timeout: Duration) -> Self {
        self.participation_timeout = timeout;
        self
    }
}

/// Live coordinations by id, plus which coordination holds each participant
pub(crate) struct Registry {
    scope: u64,
    next_id: AtomicU64,
    coordinations: Mutex<BTreeMap<u64, Arc<Coordination>>>,
    held: Mutex<HashMap<usize, u64>>,
    released: Condvar,
    participation_timeout: Duration,
}

impl Registry {
    fn new(participation_timeout: Duration) -> Self {
        Self {
            scope: NEXT_SCOPE.fetch_add(1, Ordering::Relaxed),
            next_id: AtomicU64::new(1),
            coordinations: Mutex::new(BTreeMap::new()),
            held: Mutex::new(HashMap::new()),
            released: Condvar::new(),
            participation_timeout,
        }
    }

    pub(crate) fn scope(&self) -> u64 {
        self.scope
    }

    pub(crate) fn remove(&self, id: u64) -> Option<Arc<Coordination>> {
        self.map().remove(&id)
    }

    /// Claim `participant` for `claimant`, waiting while another coordination
    /// holds it.
    ///
    /// Fails with `Deadlock` when the holder is pushed on the calling thread,
    /// since it could never be ended while this thread waits.
    pub(crate) fn lock_participant(
        &self,
        participant: usize,
        claimant: &Coordination,
    ) -> Result<(), CoordinationError> {
        let started = Instant::now();
        let mut held = self.held();
        loop {
            let holder = match held.get(&participant) {
                None => {
                    held.insert(participant, claimant.id());
                    return Ok(());
                }
                Some(&id) if id == claimant.id() => return Ok(()),
                Some(&id) => id,
            };

            let holder_thread = self.map().get(&holder).and_then(|c| c.thread());
            if holder_thread == Some(std::thread::current().id()) {
                return Err(CoordinationError::Deadlock {
                    id: claimant.id(),
                    name: claimant.name().to_string(),
                    holder,
                });
            }

            tracing::debug!(coordination = claimant.id(), holder, "waiting for participant");
            held = if self.participation_timeout.is_zero() {
                self.released.wait(held).unwrap_or_else(|e| e.into_inner())
            } else {
                let remaining = self.participation_timeout.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    return Err(CoordinationError::ParticipationTimeout {
                        id: claimant.id(),
                        name: claimant.name().to_string(),
                        holder,
                    });
                }
                self.released
                    .wait_timeout(held, remaining)
                    .unwrap_or_else(|e| e.into_inner())
                    .0
            };
        }
    }

    /// Give up `participant` if `holder` still has it
    pub(crate) fn release_participant(&self, participant: usize, holder: u64) {
        let mut held = self.held();
        if held.get(&participant) == Some(&holder) {
            held.remove(&participant);
            self.released.notify_all();
        }
    }

    /// Give up every participant `holder` has
    pub(crate) fn release_participants(&self, holder: u64) {
        self.held().retain(|_, id| *id != holder);
        self.released.notify_all();
    }

    fn map(&self) -> MutexGuard<'_, BTreeMap<u64, Arc<Coordination>>> {
        self.coordinations.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn held(&self) -> MutexGuard<'_, HashMap<usize, u64>> {
        self.held.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Creates coordinations and tracks them until they terminate
#[derive(Clone)]
pub struct CoordinationManager<C: Clock = SystemClock> {
    registry: Arc<Registry>,
    config: ManagerConfig,
    clock: C,
}

impl CoordinationManager<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(ManagerConfig::default(), SystemClock)
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for CoordinationManager<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> CoordinationManager<C> {
    pub fn with_clock(config: ManagerConfig, clock: C) -> Self {
        Self {
            registry: Arc::new(Registry::new(config.participation_timeout)),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Create and register an active coordination with the default timeout.
    /// Names need not be unique.
    pub fn create(&self, name: impl Into<String>) -> Arc<Coordination> {
        self.create_with_timeout(name, self.config.default_timeout)
    }

    pub fn create_with_timeout(&self, name: impl Into<String>, timeout: Duration) -> Arc<Coordination> {
        let id = self.registry.next_id.fetch_add(1, Ordering::SeqCst);
        let coordination = Arc::new(Coordination::new(
            id,
            name,
            self.clock.now(),
            timeout,
            Arc::downgrade(&self.registry),
        ));
        self.registry.map().insert(id, coordination.clone());
        tracing::debug!(coordination = id, name = coordination.name(), "created");
        coordination
    }

    /// Create a coordination and push it on the calling thread's stack
    pub fn begin(&self, name: impl Into<String>) -> Arc<Coordination> {
        let coordination = self.create(name);
        if let Err(e) = coordination.associate(std::thread::current().id()) {
            tracing::warn!(error = %e, "fresh coordination could not be associated");
        }
        stack::push(self.registry.scope, coordination.clone());
        coordination
    }

    /// Make `coordination` current for the calling thread.
    ///
    /// A coordination lives on at most one thread stack at a time.
    pub fn push(&self, coordination: &Arc<Coordination>) -> Result<(), CoordinationError> {
        if stack::contains(self.registry.scope, coordination.id()) {
            return Err(CoordinationError::AlreadyPushed {
                id: coordination.id(),
                name: coordination.name().to_string(),
            });
        }
        coordination.associate(std::thread::current().id())?;
        stack::push(self.registry.scope, coordination.clone());
        Ok(())
    }

    /// Remove and return the calling thread's current coordination
    pub fn pop(&self) -> Option<Arc<Coordination>> {
        let coordination = stack::pop(self.registry.scope)?;
        coordination.dissociate();
        Some(coordination)
    }

    /// The calling thread's current coordination.
    ///
    /// Entries terminated from another thread are dropped from the stack here.
    pub fn current(&self) -> Option<Arc<Coordination>> {
        stack::peek_active(self.registry.scope)
    }

    /// The coordination pushed directly before `coordination` on this thread
    pub fn enclosing(&self, coordination: &Coordination) -> Option<Arc<Coordination>> {
        stack::below(self.registry.scope, coordination.id())
    }

    /// Number of coordinations on the calling thread's stack
    pub fn depth(&self) -> usize {
        stack::depth(self.registry.scope)
    }

    /// Join the current coordination, if there is one
    pub fn participate(&self, participant: Arc<dyn Participant>) -> bool {
        match self.current() {
            Some(coordination) => coordination.participate(participant),
            None => false,
        }
    }

    /// Join the current coordination, beginning an implicit one if needed
    pub fn participate_or_begin(&self, participant: Arc<dyn Participant>) -> Arc<Coordination> {
        let coordination = self
            .current()
            .unwrap_or_else(|| self.begin(IMPLICIT_NAME));
        coordination.participate(participant);
        coordination
    }

    /// Forget `coordination`: drop it from the registry and from the calling
    /// thread's stack. Absent entries are ignored.
    pub fn unregister(&self, coordination: &Coordination) {
        self.registry.remove(coordination.id());
        stack::remove(self.registry.scope, coordination.id());
    }

    /// Fail every registered coordination and empty the registry.
    /// Returns how many were failed.
    pub fn clean_up(&self) -> usize {
        let drained: Vec<_> = std::mem::take(&mut *self.registry.map())
            .into_values()
            .collect();
        let failed = drained
            .iter()
            .filter(|c| c.fail(FailReason::Released))
            .count();
        if failed > 0 {
            tracing::info!(failed, "released coordinations");
        }
        failed
    }

    pub fn get(&self, id: u64) -> Option<Arc<Coordination>> {
        self.registry.map().get(&id).cloned()
    }

    /// Registered coordinations in id order
    pub fn coordinations(&self) -> Vec<Arc<Coordination>> {
        self.registry.map().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.registry.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.map().is_empty()
    }

    /// Fail every active coordination whose deadline has passed.
    /// Returns the ids that were failed.
    pub fn expire_overdue(&self) -> Vec<u64> {
        let mut expired = Vec::new();
        for coordination in self.coordinations() {
            if coordination.is_overdue(&self.clock) && coordination.fail(FailReason::Timeout) {
                tracing::warn!(
                    coordination = coordination.id(),
                    name = coordination.name(),
                    "timed out"
                );
                expired.push(coordination.id());
            }
        }
        expired
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
