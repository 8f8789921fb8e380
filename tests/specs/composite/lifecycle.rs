//! Composite listener specs
//!
//! A composite registers and unregisters as one unit, leaving every affected
//! event type exactly as it found it.

use crate::prelude::*;
use similar_asserts::assert_eq;

struct Ping;

impl Event for Ping {}

struct Pong;

impl Event for Pong {}

struct Tick;

impl Event for Tick {
    const PHASES: &'static [&'static str] = &["early", "default", "late"];
}

fn snapshot(bus: &EventBus) -> (usize, usize, usize) {
    (
        bus.listener_count_of::<Ping>(),
        bus.listener_count_of::<Pong>(),
        bus.listener_count_of::<Tick>(),
    )
}

#[test]
fn register_then_unregister_restores_every_type() {
    let h = Harness::new();
    let journal = Journal::new();
    let kept = journal.at::<Ping>("kept", 0);
    h.bus.register(&kept).unwrap();
    let before = snapshot(&h.bus);

    let recorder = journal.clone();
    let composite = CompositeListener::builder("overlay")
        .on_infallible::<Ping, _>({
            let journal = recorder.clone();
            move |_| journal.record("overlay ping")
        })
        .on_infallible::<Pong, _>({
            let journal = recorder.clone();
            move |_| journal.record("overlay pong")
        })
        .listener(&journal.listener::<Tick>("overlay tick", "late", 0))
        .build();

    h.bus.register_composite(&composite).unwrap();
    assert_eq!(snapshot(&h.bus), (2, 1, 1));

    h.bus.unregister_composite(&composite).unwrap();
    assert_eq!(snapshot(&h.bus), before);

    let pings = h.bus.listeners::<Ping>();
    assert!(pings[0].same_as(&kept));
    h.bus.post(Ping).unwrap();
    assert_eq!(journal.take(), labels(&["kept"]));
}

#[test]
fn override_block_places_every_member() {
    let h = Harness::new();
    let journal = Journal::new();
    h.bus.register(&journal.listener::<Tick>("plain early", "early", 0)).unwrap();
    h.bus.register(&journal.listener::<Tick>("plain late", "late", 0)).unwrap();

    let recorder = journal.clone();
    let composite = CompositeListener::builder("first-in-late")
        .phase("late")
        .priority(priority::HIGHEST)
        .on_infallible::<Tick, _>(move |_| recorder.record("composite"))
        .build();
    h.bus.register_composite(&composite).unwrap();

    h.bus.post(Tick).unwrap();

    assert_eq!(
        journal.take(),
        labels(&["plain early", "composite", "plain late"])
    );
}

#[test]
fn composite_members_are_listed_with_their_placement() {
    let composite = CompositeListener::builder("hud")
        .priority(priority::LOW)
        .on_infallible::<Ping, _>(|_| {})
        .on_infallible::<Pong, _>(|_| {})
        .build();

    let placements: Vec<_> = composite
        .members()
        .map(|m| (m.event_type(), m.phase().to_string(), m.priority()))
        .collect();

    assert_eq!(
        placements,
        vec![
            (EventKey::of::<Ping>(), "default".to_string(), priority::LOW),
            (EventKey::of::<Pong>(), "default".to_string(), priority::LOW),
        ]
    );
}

#[test]
fn unregistering_twice_is_an_error_and_changes_nothing() {
    let h = Harness::new();
    let composite = CompositeListener::builder("once")
        .on_infallible::<Ping, _>(|_| {})
        .on_infallible::<Pong, _>(|_| {})
        .build();
    h.bus.register_composite(&composite).unwrap();
    h.bus.unregister_composite(&composite).unwrap();
    h.bus.register(&SingularListener::<Pong>::infallible(|_| {})).unwrap();

    let err = h.bus.unregister_composite(&composite).unwrap_err();

    assert!(matches!(err, BusError::UnknownListener { .. }));
    assert_eq!(snapshot(&h.bus), (0, 1, 0));
}

#[test]
fn composite_can_live_on_several_buses() {
    let h = Harness::new();
    let other = h.sibling("other-bus");
    let journal = Journal::new();
    let recorder = journal.clone();
    let composite = CompositeListener::builder("shared")
        .on_infallible::<Ping, _>(move |_| recorder.record("shared"))
        .build();

    h.bus.register_composite(&composite).unwrap();
    other.register_composite(&composite).unwrap();
    h.bus.unregister_composite(&composite).unwrap();

    h.bus.post(Ping).unwrap();
    other.post(Ping).unwrap();

    assert_eq!(journal.take(), labels(&["shared"]));
}
