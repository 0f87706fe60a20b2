// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single coordination: participants that end or fail together
//!
//! State only moves forward:
//!
//! ```text
//! Active --end()--> Terminating --> Terminated
//! Active --fail() / forced end()--> Terminating --> Failed
//! ```
//!
//! Participant callbacks run on the terminating thread, in the order the
//! participants joined, without the coordination lock held.

use super::admin::CoordinationSnapshot;
use super::error::CoordinationError;
use super::manager::Registry;
use super::participant::Participant;
use super::stack;
use crate::clock::Clock;
use super::variables::Variables;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/// Lifecycle state of a coordination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinationState {
    Active,
    Terminating,
    Terminated,
    Failed,
}

impl CoordinationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CoordinationState::Terminated | CoordinationState::Failed)
    }
}

impl fmt::Display for CoordinationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoordinationState::Active => "ACTIVE",
            CoordinationState::Terminating => "TERMINATING",
            CoordinationState::Terminated => "TERMINATED",
            CoordinationState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Why a coordination failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailReason {
    /// The deadline passed, or the timed-out flag was raised before `end()`
    Timeout,
    /// The must-fail flag was raised before `end()`
    Forced,
    /// The manager released every coordination on shutdown
    Released,
    /// A coordination pushed above this one failed while being ended
    Nested { id: u64 },
    Message(String),
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailReason::Timeout => write!(f, "timeout"),
            FailReason::Forced => write!(f, "forced failure"),
            FailReason::Released => write!(f, "released by manager"),
            FailReason::Nested { id } => write!(f, "nested coordination {} failed", id),
            FailReason::Message(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<&str> for FailReason {
    fn from(s: &str) -> Self {
        FailReason::Message(s.to_string())
    }
}

/// Reason code returned by [`Coordination::end`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOutcome {
    /// Every participant handled `ended`
    Ok,
    /// Ended, but at least one participant returned an error or panicked
    PartiallyEnded,
    /// The must-fail flag or a failing nested coordination turned `end()` into `fail()`
    Failed,
    /// The timed-out flag turned `end()` into `fail()`
    Timeout,
}

struct Inner {
    state: CoordinationState,
    timeout: Duration,
    must_fail: bool,
    timed_out: bool,
    participants: Vec<Arc<dyn Participant>>,
    failure: Option<FailReason>,
    thread: Option<ThreadId>,
}

#[derive(Clone, Copy)]
enum Notify {
    Ended,
    Failed,
}

pub struct Coordination {
    id: u64,
    name: String,
    created_at: Instant,
    inner: Mutex<Inner>,
    terminated: Condvar,
    variables: Variables,
    owner: Weak<Registry>,
}

impl Coordination {
    pub(crate) fn new(
        id: u64,
        name: impl Into<String>,
        created_at: Instant,
        timeout: Duration,
        owner: Weak<Registry>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
            inner: Mutex::new(Inner {
                state: CoordinationState::Active,
                timeout,
                must_fail: false,
                timed_out: false,
                participants: Vec::new(),
                failure: None,
                thread: None,
            }),
            terminated: Condvar::new(),
            variables: Variables::default(),
            owner,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn state(&self) -> CoordinationState {
        self.lock().state
    }

    /// True once termination has started
    pub fn is_terminated(&self) -> bool {
        self.state() != CoordinationState::Active
    }

    pub fn failure(&self) -> Option<FailReason> {
        self.lock().failure.clone()
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Participants in join order; empty once termination has started
    pub fn participants(&self) -> Vec<Arc<dyn Participant>> {
        self.lock().participants.clone()
    }

    /// Thread this coordination was pushed on, if any
    pub fn thread(&self) -> Option<ThreadId> {
        self.lock().thread
    }

    pub fn timeout(&self) -> Duration {
        self.lock().timeout
    }

    /// Creation instant plus timeout; `None` without a timeout
    pub fn deadline(&self) -> Option<Instant> {
        let timeout = self.timeout();
        (!timeout.is_zero()).then(|| self.created_at + timeout)
    }

    /// Still active with a deadline `clock` has passed
    pub fn is_overdue(&self, clock: &impl Clock) -> bool {
        !self.is_terminated() && self.deadline().is_some_and(|d| clock.has_passed(d))
    }

    pub fn must_fail(&self) -> bool {
        self.lock().must_fail
    }

    pub fn timed_out(&self) -> bool {
        self.lock().timed_out
    }

    /// Join this coordination.
    ///
    /// Returns false once termination has started, or when the participant
    /// cannot be claimed (see [`try_participate`](Self::try_participate)).
    /// Joining again with the same `Arc` is accepted but does not add a
    /// second notification.
    pub fn participate(&self, participant: Arc<dyn Participant>) -> bool {
        self.try_participate(participant).unwrap_or_else(|e| {
            tracing::warn!(coordination = self.id, name = %self.name, error = %e, "participant not added");
            false
        })
    }

    /// Join this coordination, reporting why a participant could not be claimed.
    ///
    /// A participant belongs to one coordination at a time. While another
    /// coordination holds it this blocks until that one terminates, failing
    /// with `Deadlock` if the holder is pushed on the calling thread and with
    /// `ParticipationTimeout` once the manager's participation timeout passes.
    pub fn try_participate(&self, participant: Arc<dyn Participant>) -> Result<bool, CoordinationError> {
        {
            let inner = self.lock();
            if inner.state != CoordinationState::Active {
                return Ok(false);
            }
            if inner.participants.iter().any(|p| Arc::ptr_eq(p, &participant)) {
                return Ok(true);
            }
        }

        let key = participant_key(&participant);
        let registry = self.owner.upgrade();
        if let Some(registry) = &registry {
            registry.lock_participant(key, self)?;
        }

        let mut inner = self.lock();
        if inner.state != CoordinationState::Active {
            drop(inner);
            if let Some(registry) = &registry {
                registry.release_participant(key, self.id);
            }
            return Ok(false);
        }
        if !inner.participants.iter().any(|p| Arc::ptr_eq(p, &participant)) {
            inner.participants.push(participant);
        }
        Ok(true)
    }

    /// Overwrite the timeout (zero clears it). False once terminated.
    pub fn add_timeout(&self, timeout: Duration) -> bool {
        let mut inner = self.lock();
        if inner.state != CoordinationState::Active {
            return false;
        }
        inner.timeout = timeout;
        true
    }

    /// Lengthen an existing timeout, returning the new deadline.
    ///
    /// Without a timeout this changes nothing and returns `None`.
    pub fn extend_timeout(&self, by: Duration) -> Result<Option<Instant>, CoordinationError> {
        let mut inner = self.lock();
        if inner.state != CoordinationState::Active {
            return Err(self.terminated_error(inner.state));
        }
        if inner.timeout.is_zero() {
            return Ok(None);
        }
        inner.timeout += by;
        Ok(Some(self.created_at + inner.timeout))
    }

    /// Make the next `end()` fail instead of ending
    pub fn mark_must_fail(&self) {
        let mut inner = self.lock();
        if inner.state == CoordinationState::Active {
            inner.must_fail = true;
        }
    }

    /// Make the next `end()` fail with [`FailReason::Timeout`]
    pub fn mark_timed_out(&self) {
        let mut inner = self.lock();
        if inner.state == CoordinationState::Active {
            inner.timed_out = true;
        }
    }

    /// End the coordination and notify participants with `ended`.
    ///
    /// A raised must-fail or timed-out flag, or a failing nested coordination,
    /// turns this into [`fail`](Self::fail). Participant errors are logged and
    /// downgrade the outcome to [`EndOutcome::PartiallyEnded`]; the final state
    /// is still `Terminated`.
    pub fn end(&self) -> Result<EndOutcome, CoordinationError> {
        let forced = {
            let inner = self.lock();
            if inner.state != CoordinationState::Active {
                return Err(self.terminated_error(inner.state));
            }
            if inner.thread.is_some_and(|t| t != thread::current().id()) {
                return Err(CoordinationError::WrongThread {
                    id: self.id,
                    name: self.name.clone(),
                });
            }
            if inner.timed_out {
                Some(FailReason::Timeout)
            } else if inner.must_fail {
                Some(FailReason::Forced)
            } else {
                None
            }
        };

        let forced = forced.or_else(|| self.end_nested().map(|id| FailReason::Nested { id }));
        if let Some(reason) = forced {
            let outcome = match reason {
                FailReason::Timeout => EndOutcome::Timeout,
                _ => EndOutcome::Failed,
            };
            return if self.fail(reason) {
                Ok(outcome)
            } else {
                Err(self.terminated_error(self.state()))
            };
        }

        let Some(participants) = self.start_termination(None) else {
            return Err(self.terminated_error(self.state()));
        };

        let mut partial = false;
        for participant in &participants {
            if !self.notify(participant, Notify::Ended) {
                partial = true;
            }
        }
        self.finish(CoordinationState::Terminated);

        let outcome = if partial {
            EndOutcome::PartiallyEnded
        } else {
            EndOutcome::Ok
        };
        tracing::debug!(
            coordination = self.id,
            name = %self.name,
            participants = participants.len(),
            ?outcome,
            "ended"
        );
        Ok(outcome)
    }

    /// Fail the coordination and notify participants with `failed`.
    ///
    /// Returns false without side effects unless the coordination is active.
    pub fn fail(&self, reason: FailReason) -> bool {
        let Some(participants) = self.start_termination(Some(reason.clone())) else {
            return false;
        };

        for participant in &participants {
            self.notify(participant, Notify::Failed);
        }
        self.finish(CoordinationState::Failed);

        tracing::debug!(
            coordination = self.id,
            name = %self.name,
            participants = participants.len(),
            %reason,
            "failed"
        );
        true
    }

    /// `end()` reduced to whether it ran
    pub fn terminate(&self) -> bool {
        self.end().is_ok()
    }

    /// Wait until the coordination is terminal or `timeout` elapses
    pub fn join(&self, timeout: Duration) -> bool {
        let inner = self.lock();
        let (inner, _) = self
            .terminated
            .wait_timeout_while(inner, timeout, |i| !i.state.is_terminal())
            .unwrap_or_else(|e| e.into_inner());
        inner.state.is_terminal()
    }

    pub fn snapshot(&self) -> CoordinationSnapshot {
        let inner = self.lock();
        CoordinationSnapshot {
            id: self.id,
            name: self.name.clone(),
            state: inner.state,
            timeout_ms: inner.timeout.as_millis() as u64,
            participants: inner.participants.len(),
            failure: inner.failure.as_ref().map(|f| f.to_string()),
        }
    }

    pub(crate) fn associate(&self, thread: ThreadId) -> Result<(), CoordinationError> {
        let mut inner = self.lock();
        if inner.state != CoordinationState::Active {
            return Err(self.terminated_error(inner.state));
        }
        match inner.thread {
            Some(current) if current != thread => Err(CoordinationError::AlreadyPushed {
                id: self.id,
                name: self.name.clone(),
            }),
            _ => {
                inner.thread = Some(thread);
                Ok(())
            }
        }
    }

    pub(crate) fn dissociate(&self) {
        self.lock().thread = None;
    }

    /// End coordinations pushed above this one on the calling thread.
    /// Returns the id of the first one that did not end cleanly.
    fn end_nested(&self) -> Option<u64> {
        let registry = self.owner.upgrade()?;
        let mut failed = None;
        for nested in stack::above(registry.scope(), self.id) {
            match nested.end() {
                Ok(EndOutcome::Ok | EndOutcome::PartiallyEnded) => {}
                Ok(_) => {
                    failed.get_or_insert(nested.id());
                }
                Err(e) => {
                    tracing::warn!(
                        coordination = self.id,
                        nested = nested.id(),
                        error = %e,
                        "nested coordination could not be ended"
                    );
                    stack::remove(registry.scope(), nested.id());
                    if nested.state() == CoordinationState::Failed {
                        failed.get_or_insert(nested.id());
                    }
                }
            }
        }
        failed
    }

    fn start_termination(&self, failure: Option<FailReason>) -> Option<Vec<Arc<dyn Participant>>> {
        let mut inner = self.lock();
        if inner.state != CoordinationState::Active {
            return None;
        }
        inner.state = CoordinationState::Terminating;
        if let Some(reason) = failure {
            if reason == FailReason::Timeout {
                inner.timed_out = true;
            }
            inner.failure = Some(reason);
        }
        Some(std::mem::take(&mut inner.participants))
    }

    fn finish(&self, state: CoordinationState) {
        {
            let mut inner = self.lock();
            inner.state = state;
            inner.thread = None;
        }
        if let Some(registry) = self.owner.upgrade() {
            registry.remove(self.id);
            stack::remove(registry.scope(), self.id);
            registry.release_participants(self.id);
        }
        self.terminated.notify_all();
    }

    fn notify(&self, participant: &Arc<dyn Participant>, notify: Notify) -> bool {
        let (callback, result) = match notify {
            Notify::Ended => (
                "ended",
                panic::catch_unwind(AssertUnwindSafe(|| participant.ended(self))),
            ),
            Notify::Failed => (
                "failed",
                panic::catch_unwind(AssertUnwindSafe(|| participant.failed(self))),
            ),
        };
        match result {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!(
                    coordination = self.id,
                    name = %self.name,
                    callback,
                    error = %e,
                    "participant returned an error"
                );
                false
            }
            Err(_) => {
                tracing::error!(
                    coordination = self.id,
                    name = %self.name,
                    callback,
                    "participant panicked"
                );
                false
            }
        }
    }

    fn terminated_error(&self, state: CoordinationState) -> CoordinationError {
        CoordinationError::AlreadyTerminated {
            id: self.id,
            name: self.name.clone(),
            state,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Identity of a participant for exclusivity: the address it points to
fn participant_key(participant: &Arc<dyn Participant>) -> usize {
    Arc::as_ptr(participant) as *const () as usize
}

impl fmt::Debug for Coordination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordination")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
#[path = "coordination_tests.rs"]
mod tests;
