//! Run with `cargo run --example cart`.

use std::{
    collections::BTreeMap,
    process::ExitCode,
    sync::Mutex,
};

use kispec::prelude::*;

fn main() -> ExitCode {
    let t = TestContext::root("cart");
    let cart = Mutex::new(Vec::<&str>::new());
    let prices = [
        BTreeMap::from([("item", "apple"), ("price", "1.20")]),
        BTreeMap::from([("item", "kiwi"), ("price", "0.50")]),
    ];

    let features = FeatureSuite::new(&t)
        .with_output(Output::stdout().with_locations(true))
        .with_base_path("demos")
        .run(|f| {
            f.feature("Cart", |f| {
                f.background(|f| {
                    f.given("a cart with two items", |_| {
                        *cart.lock().unwrap() = vec!["apple", "kiwi"];
                    });
                    f.table(&prices, &["item", "price"]);
                });

                f.scenario("removing an item", |f| {
                    f.when("one item is removed", |_| {
                        cart.lock().unwrap().pop();
                    });
                    f.then("one item is left", |t| {
                        t.expect_len(&*cart.lock().unwrap(), 1);
                    });
                    f.then("the apple stays", |t| {
                        t.expect_eq(cart.lock().unwrap().first().copied(), Some("apple"));
                    });
                });

                f.scenario("emptying the cart", |f| {
                    f.when("everything is removed", |_| cart.lock().unwrap().clear());
                    f.then("nothing is left", |t| {
                        t.expect_len(&*cart.lock().unwrap(), 0);
                    });
                });
            });
        });

    let parallel = SpecSuite::new(&t)
        .parallel(|| println!("parallel run done"))
        .run(|s| {
            s.describe("a cart in the world", |s| {
                s.before_each(|_, world| world.set("cart", vec!["apple"]));
                s.it("can grow", |t, world| {
                    world.swap("cart", |mut cart: Vec<&'static str>| {
                        cart.push("kiwi");
                        cart
                    });
                    world.with("cart", |cart: &Vec<&'static str>| t.expect_len(cart, 2));
                });
                s.it("starts with one item", |t, world| {
                    world.with("cart", |cart: &Vec<&'static str>| t.expect_len(cart, 1));
                });
            });
        })
        .join();

    println!(
        "{} passed, {} failed, {} skipped",
        features.passed() + parallel.passed(),
        features.failed() + parallel.failed(),
        features.skipped() + parallel.skipped(),
    );

    match features.is_good() && parallel.is_good() {
        true => ExitCode::SUCCESS,
        false => ExitCode::FAILURE,
    }
}
