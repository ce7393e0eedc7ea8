use std::{
    num::NonZeroUsize,
    sync::{Arc, Mutex},
    time::Duration,
};

use kispec::prelude::*;
use pretty_assertions::assert_eq;

use crate::lib::Buffer;

type Cart = Vec<&'static str>;

#[test]
#[cfg_attr(all(ci, target_os = "macos"), ignore = "too slow on macos")]
fn every_scenario_gets_its_own_cart() {
    let t = TestContext::root("every_scenario_gets_its_own_cart");
    let buffer = Buffer::default();
    let backgrounds = Arc::new(Mutex::new(0));
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);

    let count = backgrounds.clone();
    let run = FeatureSuite::new(&t)
        .with_output(buffer.output())
        .parallel(move || done_tx.send(()).unwrap())
        .with_thread_count(NonZeroUsize::new(2).unwrap())
        .run(|f| {
            f.feature("Cart", |f| {
                f.background(|f| {
                    f.given("a cart with two items", move |_, world| {
                        *count.lock().unwrap() += 1;
                        world.set("cart", vec!["apple", "kiwi"]);
                    });
                });
                f.scenario("removing", |f| {
                    f.when("one item is removed", |_, world| {
                        world.swap("cart", |mut cart: Cart| {
                            cart.pop();
                            cart
                        });
                    });
                    f.then("one item is left", |t, world| {
                        t.expect_eq(world.get::<Cart>("cart"), Some(vec!["apple"]));
                    });
                });
                f.scenario("adding", |f| {
                    f.when("one item is added", |_, world| {
                        world.swap("cart", |mut cart: Cart| {
                            cart.push("pear");
                            cart
                        });
                    });
                    f.then("three items are in it", |t, world| {
                        world.with("cart", |cart: &Cart| t.expect_len(cart, 3));
                    });
                });
            });
        });

    done_rx.recv_timeout(Duration::from_secs(10)).unwrap();
    let report = run.join_timeout(Duration::from_secs(10)).unwrap();

    assert!(report.is_good());
    assert_eq!(report.passed(), 2);
    assert_eq!(*backgrounds.lock().unwrap(), 2);

    let output = buffer.try_to_string().unwrap();
    assert!(output.contains("✔ Then one item is left\n"));
    assert!(output.contains("✔ Then three items are in it\n"));
    t.conclude();
}

#[test]
fn spec_suites_run_in_parallel_too() {
    let t = TestContext::root("spec_suites_run_in_parallel_too");
    let buffer = Buffer::default();

    let report = SpecSuite::new(&t)
        .with_output(buffer.output())
        .parallel(|| ())
        .run(|s| {
            s.describe("counter", |s| {
                s.before_each(|_, world| world.set("n", 0u32));
                for n in 1..=4u32 {
                    s.it(format!("adds {n}"), move |t, world| {
                        world.swap("n", |value: u32| value + n);
                        t.expect_eq(world.get::<u32>("n"), Some(n));
                    });
                }
            });
        })
        .join();

    assert_eq!(report.passed(), 4);
    assert_eq!(
        buffer.try_to_string().unwrap(),
        "counter\n  ✔ adds 1\n  ✔ adds 2\n  ✔ adds 3\n  ✔ adds 4\n\n"
    );
    t.conclude();
}

#[test]
fn parallel_output_has_no_durations() {
    let t = TestContext::root("parallel_output_has_no_durations");
    let buffer = Buffer::default();

    SpecSuite::new(&t)
        .with_output(buffer.output().with_durations(true))
        .parallel(|| ())
        .run(|s| {
            s.describe("group", |s| s.it("leaf", |_, _| ()));
        })
        .join();

    assert_eq!(buffer.try_to_string().unwrap(), "group\n  ✔ leaf\n\n");
}

#[test]
fn failures_are_reported_after_joining() {
    let t = TestContext::root("failures_are_reported_after_joining");
    let buffer = Buffer::default();

    let report = SpecSuite::new(&t)
        .with_output(buffer.output())
        .parallel(|| ())
        .run(|s| {
            s.describe("group", |s| {
                s.it("fails", |t, world| {
                    world.get::<u32>("never set");
                    t.expect_true(false);
                });
                s.it("passes", |_, _| ());
            });
        })
        .join();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.passed(), 1);
    assert!(t.failed());

    let failed = t
        .sub_tests()
        .into_iter()
        .find(|outcome| outcome.failed())
        .unwrap();
    assert_eq!(failed.name, "group/fails");
    let TestStatus::Failed(failure) = failed.status else {
        unreachable!()
    };
    assert!(failure.message().contains("world does not have value set for 'never set'"));
    assert_eq!(
        buffer.try_to_string().unwrap(),
        "group\n  ⨯ fails\n  ✔ passes\n\n"
    );
}

#[test]
fn a_panicking_done_callback_fails_the_run() {
    let t = TestContext::root("a_panicking_done_callback_fails_the_run");
    let buffer = Buffer::default();

    let report = SpecSuite::new(&t)
        .with_output(buffer.output())
        .parallel(|| panic!("done callback broke"))
        .run(|s| {
            s.describe("group", |s| s.it("leaf", |_, _| ()));
        })
        .join();

    assert!(report.interrupted);
    assert!(!report.is_good());
    assert!(report.outcomes.is_empty());
}
