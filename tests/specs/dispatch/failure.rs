//! Dispatch failure specs
//!
//! A failing listener aborts the rest of the chain; the error reaches the
//! poster wrapped with bus and event context.

use crate::prelude::*;
use similar_asserts::assert_eq;
use std::error::Error as _;

#[derive(Debug, Default)]
struct Ping {
    finished: bool,
}

impl Event for Ping {
    fn finish(&mut self) {
        self.finished = true;
    }
}

#[test]
fn failure_at_third_of_five_stops_the_chain() {
    let h = Harness::new();
    let journal = Journal::new();
    h.bus.register(&journal.at::<Ping>("1", 5)).unwrap();
    h.bus.register(&journal.at::<Ping>("2", 4)).unwrap();
    h.bus.register(&journal.failing::<Ping>("3", 3)).unwrap();
    h.bus.register(&journal.at::<Ping>("4", 2)).unwrap();
    h.bus.register(&journal.at::<Ping>("5", 1)).unwrap();

    let err = h.bus.post(Ping::default()).unwrap_err();

    assert_eq!(journal.take(), labels(&["1", "2", "3"]));
    let BusError::DispatchFailure {
        bus,
        position,
        source,
        ..
    } = &err
    else {
        panic!("expected a dispatch failure, got {err}");
    };
    assert_eq!(bus, "harness-bus");
    assert_eq!(*position, 2);
    assert_eq!(source.to_string(), "3 failed");
    assert_eq!(err.source().map(|e| e.to_string()), Some("3 failed".to_string()));
}

#[test]
fn failed_post_skips_finish() {
    let h = Harness::new();
    let journal = Journal::new();
    h.bus.register(&journal.failing::<Ping>("boom", 0)).unwrap();

    let mut ping = Ping::default();
    assert!(h.bus.post_mut(&mut ping).is_err());

    assert!(!ping.finished);
}

#[test]
fn successful_post_runs_finish() {
    let h = Harness::new();
    let journal = Journal::new();
    h.bus.register(&journal.at::<Ping>("ok", 0)).unwrap();

    let ping = h.bus.post(Ping::default()).unwrap();

    assert!(ping.finished);
}

#[test]
fn panicking_listener_is_reported_not_propagated() {
    let h = Harness::new();
    let journal = Journal::new();
    h.bus
        .register(&SingularListener::<Ping>::infallible(|_| panic!("listener bug")))
        .unwrap();
    h.bus.register(&journal.at::<Ping>("after", priority::LOWEST)).unwrap();

    let err = h.bus.post(Ping::default()).unwrap_err();

    assert!(err.to_string().contains("listener panicked: listener bug"));
    assert!(journal.take().is_empty());
}

#[test]
fn bus_keeps_working_after_a_failure() {
    let h = Harness::new();
    let journal = Journal::new();
    let failing = journal.failing::<Ping>("bad", 0);
    h.bus.register(&failing).unwrap();
    assert!(h.bus.post(Ping::default()).is_err());

    h.bus.unregister(&failing).unwrap();
    h.bus.register(&journal.at::<Ping>("good", 0)).unwrap();
    journal.take();

    assert!(h.bus.post(Ping::default()).is_ok());
    assert_eq!(journal.take(), labels(&["good"]));
}

#[test]
fn closed_bus_fails_fast() {
    let h = Harness::new();
    let journal = Journal::new();
    let listener = journal.at::<Ping>("never", 0);
    h.bus.register(&listener).unwrap();

    h.bus.close();

    assert!(matches!(
        h.bus.post(Ping::default()),
        Err(BusError::Closed { .. })
    ));
    assert!(matches!(
        h.bus.register(&listener),
        Err(BusError::Closed { .. })
    ));
    assert!(journal.take().is_empty());
}
