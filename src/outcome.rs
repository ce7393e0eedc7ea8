use std::{borrow::Cow, time::Duration};

/// The outcome of one sub-test, usually one replayed suite.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestOutcome {
    pub name: String,
    pub status: TestStatus,
    pub duration: Duration,
}

impl TestOutcome {
    pub fn is_good(&self) -> bool {
        self.status.is_good()
    }

    pub fn is_bad(&self) -> bool {
        self.status.is_bad()
    }
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.status.passed()
    }

    pub fn skipped(&self) -> bool {
        self.status.skipped()
    }

    pub fn failed(&self) -> bool {
        self.status.failed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestStatus {
    Passed,
    Skipped { reason: Option<Cow<'static, str>> },
    Failed(TestFailure),
}

impl TestStatus {
    pub fn is_good(&self) -> bool {
        matches!(self, TestStatus::Passed | TestStatus::Skipped { .. })
    }

    pub fn is_bad(&self) -> bool {
        matches!(self, TestStatus::Failed(_))
    }
}

impl TestStatus {
    pub fn passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    pub fn skipped(&self) -> bool {
        matches!(self, TestStatus::Skipped { .. })
    }

    pub fn failed(&self) -> bool {
        matches!(self, TestStatus::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestFailure {
    /// Errors reported through [`TestContext::error`](crate::context::TestContext::error).
    Errors(Vec<String>),

    /// A callback panicked, the message of the first panic is kept.
    Panicked(String),
}

impl TestFailure {
    pub fn message(&self) -> String {
        match self {
            TestFailure::Errors(errors) => errors.join("\n"),
            TestFailure::Panicked(msg) => msg.clone(),
        }
    }
}
