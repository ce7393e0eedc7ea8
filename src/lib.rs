//! Behavior driven tests inside ordinary `#[test]` functions.
//!
//! Tests are declared as nested blocks, either with [`SpecSuite`]
//! (`describe`, `before_each`, `it`) or with [`FeatureSuite`] (`feature`,
//! `background`, `scenario`, `given`, `when`, `then`). Every leaf becomes a
//! suite: the chain of setup steps above it plus the leaf itself, replayed
//! from the start as its own sub-test. The report is rendered as a tree that
//! mirrors the declaration.
//!
//! ```no_run
//! use kispec::prelude::*;
//!
//! let t = TestContext::root("stack");
//! SpecSuite::new(&t).run(|s| {
//!     s.describe("a stack", |s| {
//!         s.it("starts empty", |t| {
//!             t.expect_len(&Vec::<u8>::new(), 0);
//!         });
//!     });
//! });
//! t.conclude();
//! ```

pub mod context;
pub mod error;
pub mod feature;
pub mod formatter;
pub mod location;
pub mod mode;
pub mod node;
pub mod outcome;
pub mod registry;
pub mod report;
pub mod scheduler;
pub mod spec;
pub mod stack;
pub mod step;
pub mod suite;
pub mod world;

mod expect;
pub use expect::HasLength;

pub use context::TestContext;
pub use feature::FeatureSuite;
pub use report::RunReport;
pub use spec::SpecSuite;
pub use world::World;

#[cfg(test)]
mod test_support;

/// Everything needed to declare and run suites.
pub mod prelude {
    pub use crate::{
        context::TestContext,
        feature::FeatureSuite,
        formatter::{Indent, Output, color::ColorSetting, table::TableRow},
        location::BasePath,
        outcome::TestStatus,
        report::RunReport,
        scheduler::ParallelRun,
        spec::SpecSuite,
        world::World,
    };
}
