// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime tests

use super::*;
use crate::EventLog;
use fx_core::component::{InvalidReason, RequiredKeys, COMPONENT_NAME};
use fx_core::{FakeClock, Reference, SequentialIdGen, Value, Verdict};
use yare::parameterized;

type TestRuntime = Runtime<FakeClock, SequentialIdGen>;

fn setup() -> (TestRuntime, EventLog) {
    let runtime = Runtime::with_deps(
        RuntimeConfig::default(),
        FakeClock::new(),
        SequentialIdGen::new("c"),
    );
    let log = EventLog::new();
    runtime.subscribe(Arc::new(log.clone()));
    (runtime, log)
}

fn interfaces(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn state_of(runtime: &TestRuntime, id: &InstanceId) -> ComponentState {
    runtime.component(id).unwrap().state
}

fn unsatisfied(slots: &[&str]) -> ComponentState {
    ComponentState::Invalid {
        reason: InvalidReason::Unsatisfied {
            slots: slots.iter().map(|s| s.to_string()).collect(),
        },
    }
}

#[test]
fn component_without_references_activates_and_registers() {
    let (runtime, log) = setup();
    let id = runtime
        .add_component(ComponentDescriptor::new("Log").provides("Log"))
        .unwrap();

    assert_eq!(id, InstanceId::from("c-1"));
    assert_eq!(state_of(&runtime, &id), ComponentState::Active);
    assert_eq!(
        log.names(),
        vec![
            "component_created",
            "component_validated",
            "service_registered",
            "component_activated",
        ]
    );

    let services = runtime.services();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0].owner, Some(id));
    assert_eq!(
        services[0].properties.get(COMPONENT_NAME),
        Some(&Value::from("Log"))
    );
}

#[test]
fn nan_property_settles_without_reconfiguring() {
    let (runtime, log) = setup();
    let id = runtime
        .add_component(
            ComponentDescriptor::new("Gauge")
                .provides("Gauge")
                .with_property("threshold", f64::NAN),
        )
        .unwrap();

    assert_eq!(state_of(&runtime, &id), ComponentState::Active);
    assert!(!log.names().contains(&"component_reconfigured"));
    assert_eq!(log.events().len(), 4);
}

#[test]
fn component_waits_for_a_provider_added_later() {
    let (runtime, _log) = setup();
    let obj = runtime
        .add_component(
            ComponentDescriptor::new("Obj").with_reference(Reference::service("math", "Math")),
        )
        .unwrap();
    assert_eq!(state_of(&runtime, &obj), ComponentState::Created);

    runtime
        .add_component(ComponentDescriptor::new("Math").provides("Math"))
        .unwrap();

    let instance = runtime.component(&obj).unwrap();
    assert_eq!(instance.state, ComponentState::Active);
    assert_eq!(
        instance.bindings.get("math"),
        Some(&Provider::Service(ServiceId(1)))
    );
}

#[test]
fn losing_a_required_service_invalidates_and_recovery_keeps_the_instance() {
    let (runtime, log) = setup();
    let log_service = runtime
        .register_service(interfaces(&["Log"]), Dictionary::new())
        .unwrap();
    let db = runtime
        .add_component(
            ComponentDescriptor::new("Db")
                .provides("Db")
                .with_reference(Reference::service("log", "Log")),
        )
        .unwrap();
    assert_eq!(state_of(&runtime, &db), ComponentState::Active);
    log.clear();

    runtime.unregister_service(log_service).unwrap();
    assert_eq!(state_of(&runtime, &db), unsatisfied(&["log"]));
    assert_eq!(
        log.names(),
        vec![
            "service_unregistered",
            "dependency_unbound",
            "service_unregistered",
            "component_invalidated",
        ]
    );
    assert!(runtime.services().is_empty());

    runtime
        .register_service(interfaces(&["Log"]), Dictionary::new())
        .unwrap();
    let instance = runtime.component(&db).unwrap();
    assert_eq!(instance.id, db);
    assert_eq!(instance.state, ComponentState::Active);
    assert_eq!(
        instance.bindings.get("log"),
        Some(&Provider::Service(ServiceId(3)))
    );
}

#[test]
fn optional_reference_does_not_block() {
    let (runtime, _log) = setup();
    let id = runtime
        .add_component(
            ComponentDescriptor::new("Web").with_reference(Reference::service("metrics", "Metrics").optional()),
        )
        .unwrap();
    assert_eq!(state_of(&runtime, &id), ComponentState::Active);
    assert!(runtime.component(&id).unwrap().bindings.is_empty());

    runtime
        .register_service(interfaces(&["Metrics"]), Dictionary::new())
        .unwrap();
    assert_eq!(
        runtime.component(&id).unwrap().bindings.get("metrics"),
        Some(&Provider::Service(ServiceId(1)))
    );
}

#[test]
fn numbered_slots_take_distinct_providers() {
    let (runtime, _log) = setup();
    let pool = runtime
        .add_component(
            ComponentDescriptor::new("Pool").with_reference(Reference::service("disk", "Disk").numbered(2)),
        )
        .unwrap();

    runtime
        .register_service(interfaces(&["Disk"]), Dictionary::new())
        .unwrap();
    assert_eq!(state_of(&runtime, &pool), ComponentState::Created);

    runtime
        .register_service(interfaces(&["Disk"]), Dictionary::new())
        .unwrap();
    let instance = runtime.component(&pool).unwrap();
    assert_eq!(instance.state, ComponentState::Active);
    assert_eq!(instance.bindings.get("disk0"), Some(&Provider::Service(ServiceId(1))));
    assert_eq!(instance.bindings.get("disk1"), Some(&Provider::Service(ServiceId(2))));
}

#[test]
fn component_never_binds_its_own_service() {
    let (runtime, _log) = setup();
    let id = runtime
        .add_component(
            ComponentDescriptor::new("Relay")
                .provides("Log")
                .with_reference(Reference::service("upstream", "Log")),
        )
        .unwrap();
    assert_eq!(state_of(&runtime, &id), ComponentState::Created);
    assert!(runtime.services().is_empty());
}

#[test]
fn configuration_reference_follows_the_pid() {
    let (runtime, _log) = setup();
    let id = runtime
        .add_component(
            ComponentDescriptor::new("Mailer").with_reference(Reference::configuration("settings", "mail")),
        )
        .unwrap();
    assert_eq!(state_of(&runtime, &id), ComponentState::Created);

    runtime
        .update_configuration("mail", Dictionary::new().with("host", "smtp"))
        .unwrap();
    assert_eq!(
        runtime.component(&id).unwrap().bindings.get("settings"),
        Some(&Provider::Configuration("mail".to_string()))
    );
    assert_eq!(state_of(&runtime, &id), ComponentState::Active);

    assert!(runtime.delete_configuration("mail").unwrap());
    assert_eq!(state_of(&runtime, &id), unsatisfied(&["settings"]));
    assert!(!runtime.delete_configuration("mail").unwrap());
}

#[test]
fn pid_configuration_overlays_default_properties() {
    let (runtime, _log) = setup();
    let id = runtime
        .add_component(
            ComponentDescriptor::new("Db")
                .provides("Db")
                .with_pid("db")
                .with_property("pool", 4i64)
                .with_property("url", "mem"),
        )
        .unwrap();

    runtime
        .update_configuration("db", Dictionary::new().with("pool", 8i64))
        .unwrap();

    let instance = runtime.component(&id).unwrap();
    assert_eq!(instance.configuration.get("pool"), Some(&Value::Integer(8)));
    assert_eq!(instance.configuration.get("url"), Some(&Value::from("mem")));
    assert_eq!(
        runtime.services()[0].properties.get("pool"),
        Some(&Value::Integer(8))
    );
}

#[test]
fn rejected_reconfiguration_invalidates_until_fixed() {
    let (runtime, log) = setup();
    let id = runtime
        .add_component_with_validator(
            ComponentDescriptor::new("Db").provides("Db").with_property("url", "mem"),
            Arc::new(RequiredKeys::new(["url"])),
        )
        .unwrap();
    assert_eq!(state_of(&runtime, &id), ComponentState::Active);
    log.clear();

    let state = runtime
        .reconfigure(&id, Dictionary::new().with("pool", 2i64))
        .unwrap();
    assert_eq!(state, ComponentState::Active, "defaults still carry url");

    let id = runtime
        .add_component_with_validator(
            ComponentDescriptor::new("Cache"),
            Arc::new(RequiredKeys::new(["size"])),
        )
        .unwrap();
    assert_eq!(state_of(&runtime, &id), ComponentState::Created);

    let state = runtime
        .reconfigure(&id, Dictionary::new().with("size", 64i64))
        .unwrap();
    assert_eq!(state, ComponentState::Active);

    let state = runtime.reconfigure(&id, Dictionary::new()).unwrap();
    assert!(matches!(
        state,
        ComponentState::Invalid {
            reason: InvalidReason::Rejected { .. }
        }
    ));
    assert!(log.names().contains(&"configuration_rejected"));
}

#[test]
fn pid_update_supersedes_a_direct_reconfiguration() {
    let (runtime, _log) = setup();
    let id = runtime
        .add_component(ComponentDescriptor::new("Db").with_pid("db"))
        .unwrap();

    runtime
        .reconfigure(&id, Dictionary::new().with("pool", 2i64))
        .unwrap();
    assert_eq!(
        runtime.component(&id).unwrap().configuration.get("pool"),
        Some(&Value::Integer(2))
    );

    runtime
        .update_configuration("db", Dictionary::new().with("pool", 5i64))
        .unwrap();
    assert_eq!(
        runtime.component(&id).unwrap().configuration.get("pool"),
        Some(&Value::Integer(5))
    );
}

#[test]
fn events_batch_inside_an_outer_coordination() {
    let (runtime, log) = setup();
    let batch = runtime.coordinations().begin("batch");

    runtime
        .add_component(ComponentDescriptor::new("A").provides("A"))
        .unwrap();
    runtime
        .register_service(interfaces(&["B"]), Dictionary::new())
        .unwrap();
    assert!(log.events().is_empty());
    assert_eq!(runtime.coordinations().len(), 1);

    batch.end().unwrap();
    assert_eq!(log.events().len(), 5);
    assert!(runtime.coordinations().current().is_none());
}

#[test]
fn failed_outer_coordination_still_delivers_its_events() {
    let (runtime, log) = setup();
    let batch = runtime.coordinations().begin("batch");
    runtime
        .register_service(interfaces(&["B"]), Dictionary::new())
        .unwrap();

    assert!(batch.fail(FailReason::from("abandoned")));
    assert_eq!(log.names(), vec!["service_registered"]);
}

/// Validator that fails every open coordination, as an overdue sweep
/// running on another thread would
fn interrupting(runtime: &TestRuntime) -> Arc<dyn ConfigValidator> {
    let manager = runtime.coordinations().clone();
    Arc::new(move |_: &Dictionary| {
        for coordination in manager.coordinations() {
            coordination.fail(FailReason::Timeout);
        }
        Verdict::Accept
    })
}

#[test]
fn implicit_batch_terminated_mid_change_still_delivers_everything() {
    let (runtime, log) = setup();
    let validator = interrupting(&runtime);
    let id = runtime
        .add_component_with_validator(ComponentDescriptor::new("Log").provides("Log"), validator)
        .unwrap();

    assert_eq!(state_of(&runtime, &id), ComponentState::Active);
    assert_eq!(
        log.names(),
        vec![
            "component_created",
            "component_validated",
            "service_registered",
            "component_activated",
        ]
    );
    assert!(runtime.coordinations().is_empty());
}

#[test]
fn outer_batch_terminated_mid_change_still_delivers_everything() {
    let (runtime, log) = setup();
    let batch = runtime.coordinations().begin("batch");
    let validator = interrupting(&runtime);
    runtime
        .add_component_with_validator(ComponentDescriptor::new("Log").provides("Log"), validator)
        .unwrap();

    assert_eq!(batch.failure(), Some(FailReason::Timeout));
    assert_eq!(log.events().len(), 4);
    assert!(runtime.coordinations().current().is_none());
}

#[test]
fn failed_mutation_leaves_no_coordination_behind() {
    let (runtime, log) = setup();
    let err = runtime.unregister_service(ServiceId(7)).unwrap_err();
    assert!(matches!(err, RuntimeError::ServiceNotFound(ServiceId(7))));
    assert!(runtime.coordinations().is_empty());
    assert!(runtime.coordinations().current().is_none());
    assert!(log.events().is_empty());
}

#[test]
fn component_registrations_cannot_be_withdrawn_directly() {
    let (runtime, _log) = setup();
    let id = runtime
        .add_component(ComponentDescriptor::new("Log").provides("Log"))
        .unwrap();
    let err = runtime.unregister_service(ServiceId(1)).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::OwnedService { service: ServiceId(1), ref instance } if instance == &id
    ));
    assert_eq!(runtime.services().len(), 1);
}

#[test]
fn dispose_withdraws_and_unbinds_dependents() {
    let (runtime, log) = setup();
    let log_id = runtime
        .add_component(ComponentDescriptor::new("Log").provides("Log"))
        .unwrap();
    let db = runtime
        .add_component(ComponentDescriptor::new("Db").with_reference(Reference::service("log", "Log")))
        .unwrap();
    assert_eq!(state_of(&runtime, &db), ComponentState::Active);

    runtime.dispose(&log_id).unwrap();
    assert_eq!(state_of(&runtime, &log_id), ComponentState::Disposed);
    assert_eq!(state_of(&runtime, &db), unsatisfied(&["log"]));
    assert!(log.names().contains(&"component_disposed"));

    let err = runtime.dispose(&log_id).unwrap_err();
    assert!(matches!(err, RuntimeError::Disposed(_)));
    let err = runtime.reconfigure(&log_id, Dictionary::new()).unwrap_err();
    assert!(matches!(err, RuntimeError::Disposed(_)));
}

#[parameterized(
    dispose = { "dispose" },
    reconfigure = { "reconfigure" },
)]
fn unknown_instance_is_not_found(operation: &str) {
    let (runtime, _log) = setup();
    let missing = InstanceId::from("nope");
    let err = match operation {
        "dispose" => runtime.dispose(&missing).unwrap_err(),
        _ => runtime.reconfigure(&missing, Dictionary::new()).unwrap_err(),
    };
    assert!(matches!(err, RuntimeError::ComponentNotFound(ref id) if id == &missing));
}

#[test]
fn shutdown_disposes_everything_once() {
    let (runtime, log) = setup();
    runtime
        .add_component(ComponentDescriptor::new("Log").provides("Log"))
        .unwrap();
    runtime
        .add_component(ComponentDescriptor::new("Db").with_reference(Reference::service("log", "Log")))
        .unwrap();
    log.clear();

    assert_eq!(runtime.shutdown().unwrap(), 2);
    assert!(runtime
        .components()
        .iter()
        .all(|c| c.state == ComponentState::Disposed));
    assert!(runtime.services().is_empty());
    assert_eq!(
        log.names()
            .iter()
            .filter(|n| **n == "component_disposed")
            .count(),
        2
    );
    assert_eq!(runtime.shutdown().unwrap(), 0);
}

#[test]
fn graph_reflects_live_components() {
    let (runtime, _log) = setup();
    let gone = runtime
        .add_component(ComponentDescriptor::new("Gone"))
        .unwrap();
    runtime
        .add_component(
            ComponentDescriptor::new("Obj")
                .provides("Obj")
                .with_reference(Reference::service("math", "Math"))
                .with_reference(Reference::service("trace", "Trace").optional()),
        )
        .unwrap();
    runtime.dispose(&gone).unwrap();

    let graph = runtime.graph();
    assert_eq!(graph.len(), 1);
    let obj = graph.component("Obj").unwrap();
    assert!(!obj.registered);
    assert_eq!(obj.dependencies.len(), 2);
    assert!(obj.dependencies[0].is_blocking());
    assert!(!obj.dependencies[1].is_blocking());
}

#[test]
fn diagnose_finds_the_missing_leaf_behind_a_chain() {
    let (runtime, _log) = setup();
    runtime
        .add_component(
            ComponentDescriptor::new("Obj")
                .provides("Obj")
                .with_reference(Reference::service("math", "Math")),
        )
        .unwrap();
    runtime
        .add_component(
            ComponentDescriptor::new("Math")
                .provides("Math")
                .with_reference(Reference::service("string", "java.lang.String")),
        )
        .unwrap();

    let cause = runtime.root_cause("Obj").unwrap();
    assert_eq!(cause.unregistered, vec!["Obj", "Math"]);
    assert_eq!(cause.missing_names(), vec!["java.lang.String"]);

    let diagnosis = runtime.diagnose();
    assert!(!diagnosis.is_healthy());
    assert!(diagnosis
        .to_string()
        .contains(" * java.lang.String for component Math\n"));

    runtime
        .register_service(interfaces(&["java.lang.String"]), Dictionary::new())
        .unwrap();
    assert!(runtime.root_cause("Obj").is_none());
    assert!(runtime.diagnose().is_healthy());
}

#[test]
fn diagnose_reports_a_cycle() {
    let (runtime, _log) = setup();
    for (name, needs) in [("A", "B"), ("B", "A")] {
        runtime
            .add_component(
                ComponentDescriptor::new(name)
                    .provides(name)
                    .with_reference(Reference::service(needs.to_lowercase(), needs)),
            )
            .unwrap();
    }

    let cause = runtime.root_cause("A").unwrap();
    assert!(cause.is_cycle());
    assert_eq!(cause.to_string(), "circular dependency: A -> B -> A");
}

#[test]
fn settle_limit_is_not_an_error() {
    let runtime = Runtime::with_deps(
        RuntimeConfig {
            max_settle_passes: 1,
            ..RuntimeConfig::default()
        },
        FakeClock::new(),
        SequentialIdGen::new("c"),
    );
    let obj = runtime
        .add_component(ComponentDescriptor::new("Obj").with_reference(Reference::service("math", "Math")))
        .unwrap();
    runtime
        .add_component(ComponentDescriptor::new("Math").provides("Math"))
        .unwrap();

    // Obj is visited before Math registers, and one pass does not revisit it
    assert_eq!(state_of(&runtime, &obj), ComponentState::Created);
    runtime
        .update_configuration("unrelated", Dictionary::new())
        .unwrap();
    assert_eq!(state_of(&runtime, &obj), ComponentState::Active);
}

#[test]
fn listeners_run_outside_the_state_lock() {
    let (runtime, _log) = setup();
    let runtime = Arc::new(runtime);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let observer = Arc::clone(&runtime);
    let record = Arc::clone(&seen);
    runtime.subscribe(Arc::new(move |event: &Event| {
        if let Event::ComponentActivated { instance } = event {
            let state = observer.component(instance).map(|c| c.state);
            record.lock().unwrap().push(state);
        }
    }));

    runtime
        .add_component(ComponentDescriptor::new("Log").provides("Log"))
        .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Some(ComponentState::Active)]);
}
