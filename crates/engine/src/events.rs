// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event listeners and coordination-batched delivery.
//!
//! Events produced while a coordination is open are held by a participant
//! stored in that coordination's variables, and handed to listeners once the
//! coordination terminates.

use fx_core::coordination::ParticipantError;
use fx_core::{Coordination, Event, Participant};
use std::sync::{Arc, Mutex};

/// Observer of runtime events
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &Event);
}

impl<F> EventListener for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// The runtime's subscribed listeners
#[derive(Clone, Default)]
pub struct Listeners {
    inner: Arc<Mutex<Vec<Arc<dyn EventListener>>>>,
}

impl Listeners {
    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver events in order to every listener.
    ///
    /// The listener list is copied first so listeners may subscribe others.
    pub fn deliver(&self, events: &[Event]) {
        if events.is_empty() {
            return;
        }
        let listeners = self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone();
        for event in events {
            for listener in &listeners {
                listener.on_event(event);
            }
        }
    }
}

/// Events waiting for their coordination to terminate
pub(crate) struct PendingEvents {
    listeners: Listeners,
    events: Mutex<Vec<Event>>,
}

impl PendingEvents {
    pub(crate) fn new(listeners: Listeners) -> Self {
        Self {
            listeners,
            events: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    pub(crate) fn extend(&self, events: impl IntoIterator<Item = Event>) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(events);
    }

    /// Hand everything collected so far to the listeners
    pub(crate) fn flush(&self) -> usize {
        let events = std::mem::take(&mut *self.events.lock().unwrap_or_else(|e| e.into_inner()));
        self.listeners.deliver(&events);
        events.len()
    }
}

impl Participant for PendingEvents {
    fn ended(&self, coordination: &Coordination) -> Result<(), ParticipantError> {
        let delivered = self.flush();
        tracing::debug!(coordination = coordination.id(), delivered, "delivered events");
        Ok(())
    }

    fn failed(&self, coordination: &Coordination) -> Result<(), ParticipantError> {
        let reason = coordination
            .failure()
            .map(|f| f.to_string())
            .unwrap_or_default();
        let delivered = self.flush();
        tracing::warn!(
            coordination = coordination.id(),
            name = coordination.name(),
            %reason,
            delivered,
            "coordination failed, delivering events anyway"
        );
        Ok(())
    }
}

/// Listener that keeps every event it sees
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Event names in delivery order
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(Event::name).collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl EventListener for EventLog {
    fn on_event(&self, event: &Event) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
