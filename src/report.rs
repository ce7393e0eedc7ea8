use std::{io, process::ExitCode, time::Duration};

use crate::{error::DeclarationError, outcome::TestOutcome};

/// The result of running every suite of a [`SpecSuite`](crate::spec::SpecSuite)
/// or [`FeatureSuite`](crate::feature::FeatureSuite).
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct RunReport {
    /// One outcome per replayed suite, in the order the suites finished.
    pub outcomes: Vec<TestOutcome>,
    pub duration: Duration,
    /// Blocks that were rejected while declaring, their bodies never ran.
    pub declaration_errors: Vec<DeclarationError>,
    pub fmt_errors: Vec<io::Error>,
    /// The run stopped before every suite reported back, outcomes are missing.
    pub interrupted: bool,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| o.skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.failed()).count()
    }

    /// A report that stands in for a run which never reported back.
    pub(crate) fn never_reported() -> Self {
        Self {
            interrupted: true,
            ..Self::default()
        }
    }

    pub fn is_good(&self) -> bool {
        !self.interrupted
            && self.declaration_errors.is_empty()
            && self.fmt_errors.is_empty()
            && self.outcomes.iter().all(TestOutcome::is_good)
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.is_good() {
            true => ExitCode::SUCCESS,
            false => ExitCode::FAILURE,
        }
    }

    pub(crate) fn merge(&mut self, other: RunReport) {
        self.outcomes.extend(other.outcomes);
        self.duration += other.duration;
        self.declaration_errors.extend(other.declaration_errors);
        self.fmt_errors.extend(other.fmt_errors);
        self.interrupted |= other.interrupted;
    }
}
