//! Dispatch order specs
//!
//! Listeners run by phase, then priority (higher first), then registration
//! order, and each registration runs exactly once per post.

use crate::prelude::*;
use proptest::prelude::*;
use similar_asserts::assert_eq;

struct Ping;

impl Event for Ping {}

struct Tick;

impl Event for Tick {
    const PHASES: &'static [&'static str] = &["early", "default", "late"];
}

#[test]
fn higher_priority_runs_first_regardless_of_registration() {
    let h = Harness::new();
    let journal = Journal::new();
    h.bus.register(&journal.at::<Ping>("L2", 5)).unwrap();
    h.bus.register(&journal.at::<Ping>("L1", 10)).unwrap();

    h.bus.post(Ping).unwrap();

    assert_eq!(journal.take(), labels(&["L1", "L2"]));
}

#[test]
fn phase_wins_over_priority() {
    let h = Harness::new();
    let journal = Journal::new();
    h.bus.register(&journal.listener::<Tick>("A", "late", 100)).unwrap();
    h.bus.register(&journal.listener::<Tick>("B", "early", -100)).unwrap();

    h.bus.post(Tick).unwrap();

    assert_eq!(journal.take(), labels(&["B", "A"]));
}

#[test]
fn equal_placement_keeps_registration_order() {
    let h = Harness::new();
    let journal = Journal::new();
    for label in ["first", "second", "third"] {
        h.bus.register(&journal.at::<Ping>(label, priority::NORMAL)).unwrap();
    }

    h.bus.post(Ping).unwrap();

    assert_eq!(journal.take(), labels(&["first", "second", "third"]));
}

#[test]
fn repeated_posts_use_the_same_order() {
    let h = Harness::new();
    let journal = Journal::new();
    h.bus.register(&journal.listener::<Tick>("late", "late", priority::HIGHEST)).unwrap();
    h.bus.register(&journal.at::<Tick>("mid-low", priority::LOW)).unwrap();
    h.bus.register(&journal.at::<Tick>("mid-high", priority::HIGH)).unwrap();
    h.bus.register(&journal.listener::<Tick>("early", "early", priority::LOWEST)).unwrap();

    h.bus.post(Tick).unwrap();
    let first = journal.take();
    h.bus.post(Tick).unwrap();

    assert_eq!(first, labels(&["early", "mid-high", "mid-low", "late"]));
    assert_eq!(journal.take(), first);
}

#[test]
fn buses_do_not_share_listeners() {
    let h = Harness::new();
    let other = h.sibling("other-bus");
    let journal = Journal::new();
    h.bus.register(&journal.at::<Ping>("main", 0)).unwrap();
    other.register(&journal.at::<Ping>("other", 0)).unwrap();

    h.bus.post(Ping).unwrap();

    assert_eq!(journal.take(), labels(&["main"]));
}

#[derive(Debug, Clone)]
enum Step {
    Register { priority: i32 },
    Unregister { pick: usize },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (-2i32..=2).prop_map(|priority| Step::Register { priority }),
        any::<usize>().prop_map(|pick| Step::Unregister { pick }),
    ]
}

proptest! {
    #[test]
    fn post_runs_exactly_the_registered_set(steps in proptest::collection::vec(step(), 0..32)) {
        let h = Harness::new();
        let journal = Journal::new();
        // (label, priority, listener) in registration order
        let mut live: Vec<(String, i32, SingularListener<Ping>)> = Vec::new();

        for (n, step) in steps.iter().enumerate() {
            match step {
                Step::Register { priority } => {
                    let label = format!("l{n}");
                    let listener = journal.at::<Ping>(&label, *priority);
                    h.bus.register(&listener).unwrap();
                    live.push((label, *priority, listener));
                }
                Step::Unregister { pick } if !live.is_empty() => {
                    let (_, _, listener) = live.remove(pick % live.len());
                    h.bus.unregister(&listener).unwrap();
                }
                Step::Unregister { .. } => {}
            }
        }

        h.bus.post(Ping).unwrap();

        let mut expected = live.clone();
        expected.sort_by_key(|(_, priority, _)| std::cmp::Reverse(*priority));
        let expected: Vec<String> = expected.into_iter().map(|(label, _, _)| label).collect();
        prop_assert_eq!(journal.take(), expected);
    }
}
