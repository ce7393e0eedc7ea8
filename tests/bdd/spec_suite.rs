use std::sync::{Arc, Mutex};

use kispec::{
    error::DeclarationError,
    formatter::Indent,
    outcome::TestStatus,
    prelude::*,
};
use pretty_assertions::assert_eq;

use crate::lib::{Buffer, sanitize};

#[test]
fn nested_blocks_render_as_a_tree() {
    let t = TestContext::root("nested_blocks_render_as_a_tree");
    let buffer = Buffer::default();

    let report = SpecSuite::new(&t).with_output(buffer.output()).run(|s| {
        s.describe("a stack", |s| {
            s.it("starts empty", |_| ());
            s.context("with one element", |s| {
                s.it("is not empty", |_| ());
                s.context("popped", |s| {
                    s.it("is empty again", |_| ());
                });
            });
        });
        s.describe("a queue", |s| {
            s.it("starts empty", |_| ());
        });
    });

    assert!(report.is_good());
    assert_eq!(report.passed(), 4);
    assert_eq!(
        buffer.try_to_string().unwrap(),
        "a stack\n\
         \x20 ✔ starts empty\n\
         \x20 with one element\n\
         \x20   ✔ is not empty\n\
         \x20   popped\n\
         \x20     ✔ is empty again\n\
         \n\
         a queue\n\
         \x20 ✔ starts empty\n\
         \n"
    );
    t.conclude();
}

#[test]
fn every_leaf_replays_the_setups_above_it() {
    let t = TestContext::root("every_leaf_replays_the_setups_above_it");
    let nums = Mutex::new(Vec::new());
    let seen = Mutex::new(Vec::new());
    let record = |last: i32| {
        let mut nums = nums.lock().unwrap();
        nums.push(last);
        seen.lock().unwrap().push(nums.clone());
    };

    SpecSuite::new(&t)
        .with_output(Buffer::default().output())
        .run(|s| {
            s.describe("low", |s| {
                s.before_each(|| nums.lock().unwrap().clear());
                s.before_each(|| nums.lock().unwrap().push(1));
                s.context("nested", |s| {
                    s.before_each(|| nums.lock().unwrap().push(2));
                    s.it("three", |_| record(3));
                    s.it("four", |_| record(4));
                });
            });
            s.describe("high", |s| {
                s.before_each(|| nums.lock().unwrap().clear());
                s.before_each(|| nums.lock().unwrap().push(11));
                s.context("nested", |s| {
                    s.before_each(|| nums.lock().unwrap().push(12));
                    s.it("thirteen", |_| record(13));
                    s.it("fourteen", |_| record(14));
                });
            });
        });

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            vec![1, 2, 3],
            vec![1, 2, 4],
            vec![11, 12, 13],
            vec![11, 12, 14]
        ]
    );
    assert_eq!(
        t.sub_test_names(),
        vec![
            "low/nested/three",
            "low/nested/four",
            "high/nested/thirteen",
            "high/nested/fourteen"
        ]
    );
    t.conclude();
}

#[test]
fn setups_only_apply_after_their_declaration() {
    let t = TestContext::root("setups_only_apply_after_their_declaration");
    let calls = Mutex::new(Vec::new());

    SpecSuite::new(&t)
        .with_output(Buffer::default().output())
        .run(|s| {
            s.describe("group", |s| {
                s.it("first", |_| calls.lock().unwrap().push("first"));
                s.before_each(|| calls.lock().unwrap().push("setup"));
                s.it("second", |_| calls.lock().unwrap().push("second"));
            });
        });

    assert_eq!(*calls.lock().unwrap(), vec!["first", "setup", "second"]);
    t.conclude();
}

#[test]
fn background_runs_before_earlier_setups() {
    let t = TestContext::root("background_runs_before_earlier_setups");
    let calls = Mutex::new(Vec::new());

    SpecSuite::new(&t)
        .with_output(Buffer::default().output())
        .run(|s| {
            s.describe("group", |s| {
                s.before_each(|| calls.lock().unwrap().push("setup"));
                s.background(|s| {
                    s.before_each(|| calls.lock().unwrap().push("background"));
                });
                s.it("leaf", |_| calls.lock().unwrap().push("leaf"));
            });
        });

    assert_eq!(*calls.lock().unwrap(), vec!["background", "setup", "leaf"]);
    t.conclude();
}

#[test]
fn a_failing_leaf_does_not_affect_its_siblings() {
    let t = TestContext::root("a_failing_leaf_does_not_affect_its_siblings");
    let buffer = Buffer::default();

    let report = SpecSuite::new(&t).with_output(buffer.output()).run(|s| {
        s.describe("math", |s| {
            s.it("is wrong", |t| {
                t.expect_eq(1 + 1, 3);
            });
            s.it("panics", |_| panic!("boom"));
            s.it("is right", |t| {
                t.expect_eq(1 + 1, 2);
            });
        });
    });

    assert_eq!(report.failed(), 2);
    assert_eq!(report.passed(), 1);
    assert!(!report.is_good());
    assert_eq!(
        buffer.try_to_string().unwrap(),
        "math\n  ⨯ is wrong\n  ⨯ panics\n  ✔ is right\n\n"
    );

    let sub_tests = t.sub_tests();
    let TestStatus::Failed(failure) = &sub_tests[1].status else {
        panic!("expected a failure, got {:?}", sub_tests[1].status);
    };
    assert!(failure.message().contains("boom"));
    assert!(t.failed());
}

#[test]
fn a_failing_setup_skips_the_leaf_glyph() {
    let t = TestContext::root("a_failing_setup_skips_the_leaf_glyph");
    let buffer = Buffer::default();

    SpecSuite::new(&t).with_output(buffer.output()).run(|s| {
        s.describe("broken setup", |s| {
            s.before_each(|| panic!("setup failed"));
            s.it("never really runs", |_| ());
        });
    });

    assert_eq!(
        buffer.try_to_string().unwrap(),
        "broken setup\n  s never really runs\n\n"
    );
    assert!(t.failed());
}

#[test]
fn a_skipped_leaf_is_marked() {
    let t = TestContext::root("a_skipped_leaf_is_marked");
    let buffer = Buffer::default();

    let report = SpecSuite::new(&t).with_output(buffer.output()).run(|s| {
        s.describe("group", |s| {
            s.it("not today", |t| t.skip_because("flaky"));
        });
    });

    assert_eq!(report.skipped(), 1);
    assert!(report.is_good());
    assert_eq!(buffer.try_to_string().unwrap(), "group\n  s not today\n\n");
}

#[test]
fn steps_are_shared_between_suites() {
    let t = TestContext::root("steps_are_shared_between_suites");

    SpecSuite::new(&t)
        .with_output(Buffer::default().output())
        .run(|s| {
            s.describe("group", |s| {
                s.before_each(|| ());
                s.it("a", |_| ());
                s.it("b", |_| ());
            });

            let suites = s.suites();
            assert_eq!(suites.len(), 2);
            assert!(Arc::ptr_eq(&suites[0].steps()[0], &suites[1].steps()[0]));
            assert!(Arc::ptr_eq(&suites[0].steps()[1], &suites[1].steps()[1]));
            assert!(!Arc::ptr_eq(&suites[0].steps()[2], &suites[1].steps()[2]));
        });
    t.conclude();
}

#[test]
fn locations_are_relative_to_the_base_path() {
    let t = TestContext::root("locations_are_relative_to_the_base_path");
    let buffer = Buffer::default();

    SpecSuite::new(&t)
        .with_output(
            buffer
                .output()
                .with_locations(true)
                .with_durations(true)
                .with_indent(Indent::FourSpaces),
        )
        .with_base_path("tests")
        .run(|s| {
            s.describe("group", |s| {
                s.it("leaf", |_| ());
            });
        });

    assert_eq!(
        sanitize(&buffer.try_to_string().unwrap()),
        "group\tbdd/spec_suite.rs:L\n    ✔ leaf (Nms)\tbdd/spec_suite.rs:L\n\n"
    );
    t.conclude();
}

#[test]
fn misplaced_blocks_fail_the_run() {
    let t = TestContext::root("misplaced_blocks_fail_the_run");

    let report = SpecSuite::new(&t)
        .with_output(Buffer::default().output())
        .run(|s| {
            s.it("outside", |_| ());
            s.describe("group", |s| {
                s.background(|s| {
                    s.background(|_| ());
                });
                s.it("inside", |_| ());
            });
        });

    assert_eq!(
        report.declaration_errors,
        vec![
            DeclarationError::OutsideOf {
                block: "it",
                parent: "describe"
            },
            DeclarationError::InsideOf {
                block: "background",
                parent: "background"
            },
        ]
    );
    assert_eq!(report.passed(), 1);
    assert_eq!(report.exit_code(), std::process::ExitCode::FAILURE);
    assert!(t.failed());
}

#[test]
fn groups_without_leaves_run_nothing() {
    let t = TestContext::root("groups_without_leaves_run_nothing");
    let setups = Mutex::new(0);

    let report = SpecSuite::new(&t)
        .with_output(Buffer::default().output())
        .run(|s| {
            s.describe("empty", |_| {});
            s.describe("only setup", |s| {
                s.before_each(|| *setups.lock().unwrap() += 1);
            });
            assert!(s.suites().is_empty());
        });

    assert!(report.outcomes.is_empty());
    assert!(t.sub_test_names().is_empty());
    assert_eq!(*setups.lock().unwrap(), 0);
    t.conclude();
}
