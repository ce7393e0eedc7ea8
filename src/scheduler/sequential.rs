use std::time::Instant;

use crate::{context::TestContext, report::RunReport, scheduler::run_suite, suite::Suite};

/// Runs suites one after another on the calling thread, in registration order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialScheduler;

impl SequentialScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Run every suite as a child of `root` and block until all are done.
    pub fn run<'a>(
        &self,
        suites: impl IntoIterator<Item = Suite<'a>>,
        root: &TestContext,
    ) -> RunReport {
        let now = Instant::now();
        let outcomes = suites
            .into_iter()
            .map(|suite| run_suite(&suite, root, true))
            .collect();

        RunReport {
            outcomes,
            duration: now.elapsed(),
            declaration_errors: Vec::new(),
            fmt_errors: Vec::new(),
            interrupted: false,
        }
    }
}
