// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination errors

use super::coordination::CoordinationState;
use thiserror::Error;

/// Misuse of a coordination or a failed administrative lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinationError {
    #[error("coordination {id}/{name} has already terminated ({state})")]
    AlreadyTerminated {
        id: u64,
        name: String,
        state: CoordinationState,
    },
    #[error("coordination {id}/{name} is already on a thread stack")]
    AlreadyPushed { id: u64, name: String },
    #[error("coordination {id}/{name} is associated with a different thread")]
    WrongThread { id: u64, name: String },
    #[error("coordination {id}/{name} would deadlock: participant is held by coordination {holder} on this thread")]
    Deadlock { id: u64, name: String, holder: u64 },
    #[error("coordination {id}/{name} timed out waiting for a participant held by coordination {holder}")]
    ParticipationTimeout { id: u64, name: String, holder: u64 },
    #[error("coordination {0} not found")]
    NotFound(u64),
    #[error("invalid name pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl CoordinationError {
    /// True for lookups of unknown ids, as opposed to protocol misuse
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoordinationError::NotFound(_))
    }
}
