// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use fx_core::{CoordinationManager, FailReason, InstanceId};

fn activated(id: &str) -> Event {
    Event::ComponentActivated {
        instance: InstanceId::from(id),
    }
}

fn listening() -> (Listeners, EventLog) {
    let listeners = Listeners::default();
    let log = EventLog::new();
    listeners.subscribe(Arc::new(log.clone()));
    (listeners, log)
}

#[test]
fn deliver_reaches_every_listener_in_order() {
    let (listeners, first) = listening();
    let second = EventLog::new();
    listeners.subscribe(Arc::new(second.clone()));
    assert_eq!(listeners.len(), 2);

    listeners.deliver(&[activated("a"), activated("b")]);
    assert_eq!(first.events(), vec![activated("a"), activated("b")]);
    assert_eq!(second.events(), first.events());
}

#[test]
fn closures_are_listeners() {
    let seen = Arc::new(Mutex::new(0usize));
    let counter = seen.clone();
    let listeners = Listeners::default();
    listeners.subscribe(Arc::new(move |_: &Event| {
        *counter.lock().unwrap() += 1;
    }));

    listeners.deliver(&[activated("a"), activated("b")]);
    assert_eq!(*seen.lock().unwrap(), 2);
}

#[test]
fn pending_events_wait_for_the_coordination_to_end() {
    let (listeners, log) = listening();
    let manager = CoordinationManager::new();
    let coordination = manager.begin("batch");

    let pending = coordination
        .variables()
        .get_or_insert_with(|| PendingEvents::new(listeners.clone()));
    assert!(coordination.participate(pending.clone()));
    pending.push(activated("a"));
    pending.extend([activated("b")]);
    assert!(log.events().is_empty());

    coordination.end().unwrap();
    assert_eq!(log.names(), vec!["component_activated", "component_activated"]);
}

#[test]
fn failed_coordination_still_delivers() {
    let (listeners, log) = listening();
    let manager = CoordinationManager::new();
    let coordination = manager.create("doomed");

    let pending = Arc::new(PendingEvents::new(listeners));
    coordination.participate(pending.clone());
    pending.push(activated("a"));

    assert!(coordination.fail(FailReason::from("boom")));
    assert_eq!(log.events(), vec![activated("a")]);
}

#[test]
fn flush_empties_the_buffer() {
    let (listeners, log) = listening();
    let pending = PendingEvents::new(listeners);
    pending.push(activated("a"));
    assert_eq!(pending.flush(), 1);
    assert_eq!(pending.flush(), 0);
    assert_eq!(log.events().len(), 1);

    log.clear();
    assert!(log.events().is_empty());
}
