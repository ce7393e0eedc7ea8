use std::collections::BTreeMap;

use kispec::prelude::*;
use pretty_assertions::assert_eq;

use crate::lib::Buffer;

type Cart = Vec<&'static str>;

#[test]
fn world_errors_fail_the_step_they_happen_in() {
    let t = TestContext::root("world_errors_fail_the_step_they_happen_in");
    let buffer = Buffer::default();

    let report = FeatureSuite::new(&t)
        .with_output(buffer.output())
        .parallel(|| ())
        .run(|f| {
            f.feature("world", |f| {
                f.scenario("wrong type", |f| {
                    f.given("a number", |_, world| world.set("n", 1u8));
                    f.when("it is read as text", |_, world| {
                        world.get::<String>("n");
                    });
                    f.then("the number is still there", |t, world| {
                        t.expect_eq(world.get::<u8>("n"), Some(1));
                    });
                });
                f.scenario("fresh world", |f| {
                    f.then("nothing leaked", |t, world| {
                        t.expect_false(world.contains("n"));
                    });
                });
            });
        })
        .join();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.passed(), 1);
    assert_eq!(
        buffer.try_to_string().unwrap(),
        "Feature: world\n\
         \n\
         \x20 Scenario: wrong type\n\
         \x20   Given a number\n\
         \x20   When it is read as text\n\
         \x20   s Then the number is still there\n\
         \n\
         \x20 Scenario: fresh world\n\
         \x20   ✔ Then nothing leaked\n\
         \n"
    );
}

#[test]
fn sequential_steps_can_use_a_world_through_the_context() {
    let t = TestContext::root("sequential_steps_can_use_a_world_through_the_context");
    let world = World::new(t.clone());

    SpecSuite::new(&t)
        .with_output(Buffer::default().output())
        .run(|s| {
            s.describe("borrowed world", |s| {
                s.before_each(|| world.set("greeting", "hello"));
                s.it("reads it", |t| {
                    t.expect_eq(world.get::<&str>("greeting"), Some("hello"));
                });
            });
        });

    assert!(!t.failed());
    t.conclude();
}

#[test]
fn steps_show_tables_built_while_running() {
    let t = TestContext::root("steps_show_tables_built_while_running");
    let buffer = Buffer::default();

    let report = FeatureSuite::new(&t)
        .with_output(buffer.output())
        .parallel(|| ())
        .run(|f| {
            f.feature("cart", |f| {
                f.background(|f| {
                    f.given("a cart with two items", |_, world| {
                        let cart = vec!["apple", "kiwi"];
                        let rows: Vec<_> = cart
                            .iter()
                            .map(|item| BTreeMap::from([("item", item.to_string())]))
                            .collect();
                        world.table(&rows, &["item"]);
                        world.set("cart", cart);
                    });
                });
                f.scenario("first", |f| {
                    f.then("it has two items", |t, world| {
                        world.with("cart", |cart: &Cart| t.expect_len(cart, 2));
                    });
                });
                f.scenario("second", |f| {
                    f.then("an apple is in it", |t, world| {
                        world.with("cart", |cart: &Cart| {
                            t.expect_true(cart.contains(&"apple"))
                        });
                    });
                });
            });
        })
        .join();

    assert!(report.is_good());
    assert_eq!(
        buffer.try_to_string().unwrap(),
        "Feature: cart\n\
         \n\
         \x20 Background:\n\
         \x20   Given a cart with two items\n\
         \x20     | item  |\n\
         \x20     | apple |\n\
         \x20     | kiwi  |\n\
         \n\
         \x20 Scenario: first\n\
         \x20   ✔ Then it has two items\n\
         \n\
         \x20 Scenario: second\n\
         \x20   ✔ Then an apple is in it\n\
         \n"
    );
    t.conclude();
}
