//! Dispatch gate specs
//!
//! While dispatch is disabled every post fails with the disable reason and
//! no listener runs; registration keeps working.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[derive(Debug)]
struct Ping;

impl Event for Ping {}

#[test]
fn disabled_window_rejects_posts_with_reason() {
    let h = Harness::new();
    let bus = h.managed("managed");
    let journal = Journal::new();
    bus.register(&journal.at::<Ping>("listener", 0)).unwrap();

    bus.disable_dispatch("bulk register");
    let err = bus.post(Ping).unwrap_err();

    assert!(matches!(
        err,
        BusError::DispatchDisabled { ref reason, .. } if reason == "bulk register"
    ));
    assert!(err.to_string().contains("bulk register"));
    assert!(journal.take().is_empty());

    bus.enable_dispatch();
    bus.post(Ping).unwrap();
    assert_eq!(journal.take(), labels(&["listener"]));
}

#[test]
fn bulk_registration_inside_window() {
    let h = Harness::new();
    let bus = h.managed("managed");
    let journal = Journal::new();
    let gate = bus.gate();

    gate.disable_dispatch("loading plugins");
    for n in 0..10 {
        let recorder = journal.clone();
        let composite = CompositeListener::builder(format!("plugin-{n}"))
            .priority(n)
            .on_infallible::<Ping, _>(move |_| recorder.record(format!("plugin-{n}")))
            .build();
        bus.register_composite(&composite).unwrap();
        assert!(bus.post(Ping).is_err());
    }
    gate.enable_dispatch();

    bus.post(Ping).unwrap();
    let expected: Vec<String> = (0..10).rev().map(|n| format!("plugin-{n}")).collect();
    assert_eq!(journal.take(), expected);
}

#[test]
fn config_file_can_start_gated() {
    let config = BusConfig::from_toml_str(
        r#"
        name = "boot"
        dispatch_disabled = "static init"
        "#,
    )
    .unwrap();
    let bus = ManagedBus::with_config(EventRegistry::new(), &config);

    let err = bus.post(Ping).unwrap_err();

    assert!(err.to_string().contains("boot"));
    assert!(err.to_string().contains("static init"));
    assert_eq!(bus.gate().disabled_reason().as_deref(), Some("static init"));
}

#[test]
fn plain_bus_has_no_gate() {
    let h = Harness::new();
    assert!(h.bus.post(Ping).is_ok());
}
