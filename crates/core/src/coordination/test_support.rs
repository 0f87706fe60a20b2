// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Participants that record their notifications

use super::coordination::Coordination;
use super::participant::{Participant, ParticipantError};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Behavior {
    Ok,
    Error,
    Panic,
}

/// Shared, ordered log of `label:callback` entries
#[derive(Clone, Default)]
pub(crate) struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }
}

pub(crate) struct Recorder {
    label: String,
    log: Log,
    behavior: Behavior,
}

impl Recorder {
    pub(crate) fn new(label: &str, log: &Log) -> Arc<Self> {
        Self::with_behavior(label, log, Behavior::Ok)
    }

    pub(crate) fn with_behavior(label: &str, log: &Log, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            log: log.clone(),
            behavior,
        })
    }

    fn record(&self, callback: &str) -> Result<(), ParticipantError> {
        self.log.push(format!("{}:{}", self.label, callback));
        match self.behavior {
            Behavior::Ok => Ok(()),
            Behavior::Error => Err(ParticipantError::new(format!("{} refused", self.label))),
            Behavior::Panic => panic!("{} panicked", self.label),
        }
    }
}

impl Participant for Recorder {
    fn ended(&self, _: &Coordination) -> Result<(), ParticipantError> {
        self.record("ended")
    }

    fn failed(&self, _: &Coordination) -> Result<(), ParticipantError> {
        self.record("failed")
    }
}
