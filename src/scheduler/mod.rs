//! Executing suites.
//!
//! Both schedulers run every suite as one named child of the root
//! [`TestContext`](crate::context::TestContext). The sequential scheduler does so
//! on the caller's thread, the parallel one on a pool of worker threads.

use std::time::Instant;

use tracing::debug;

use crate::{
    context::TestContext,
    outcome::{TestOutcome, TestStatus},
    suite::Suite,
};

pub mod parallel;
pub(crate) mod replay;
pub mod sequential;

pub use parallel::{ParallelRun, ParallelScheduler};
pub use sequential::SequentialScheduler;

/// Where a suite is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteState {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl SuiteState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            SuiteState::Completed | SuiteState::Failed | SuiteState::Skipped
        )
    }
}

impl From<&TestStatus> for SuiteState {
    fn from(value: &TestStatus) -> Self {
        match value {
            TestStatus::Passed => SuiteState::Completed,
            TestStatus::Skipped { .. } => SuiteState::Skipped,
            TestStatus::Failed(_) => SuiteState::Failed,
        }
    }
}

impl From<&TestOutcome> for SuiteState {
    fn from(value: &TestOutcome) -> Self {
        Self::from(&value.status)
    }
}

/// The reason a suite is skipped when the root context gave up before it started.
pub(crate) const SKIPPED_AFTER_FAILURE: &str = "an earlier failure stopped the run";

/// Run `suite` as a child of `root` and record its outcome there.
pub(crate) fn run_suite(suite: &Suite<'_>, root: &TestContext, timed: bool) -> TestOutcome {
    let child = root.child(suite.title());
    let now = Instant::now();

    if root.is_fatal() || root.skipped() {
        child.skip_because(SKIPPED_AFTER_FAILURE);
    } else {
        debug!(suite = child.name(), state = ?SuiteState::Running, "suite started");
        replay::replay(suite, &child, timed);
    }

    let outcome = root.conclude_child(&child, now.elapsed());
    debug!(suite = %outcome.name, state = ?SuiteState::from(&outcome), "suite finished");
    outcome
}
