// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Participants notified when a coordination terminates

use super::coordination::Coordination;
use thiserror::Error;

/// Error returned by a participant callback.
///
/// The coordination logs it and keeps notifying the remaining participants.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParticipantError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ParticipantError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// A collaborator that joins a coordination.
///
/// Exactly one of the callbacks is invoked, once, when the coordination
/// terminates. Identity is the `Arc` allocation: joining twice with the same
/// `Arc` yields a single notification.
pub trait Participant: Send + Sync {
    /// The coordination ended successfully
    fn ended(&self, coordination: &Coordination) -> Result<(), ParticipantError>;

    /// The coordination failed; [`Coordination::failure`] holds the reason
    fn failed(&self, coordination: &Coordination) -> Result<(), ParticipantError>;
}
