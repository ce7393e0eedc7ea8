//! Suites: the flat, replayable paths through a declaration.

use std::sync::Arc;

use tracing::debug;

use crate::step::StepRef;

/// An immutable sequence of steps, replayed in order as one sub-test.
///
/// Cloning a suite is cheap, the steps are shared.
#[derive(Debug, Clone)]
pub struct Suite<'a> {
    steps: Arc<[StepRef<'a>]>,
}

impl<'a> Suite<'a> {
    pub fn new(steps: Vec<StepRef<'a>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    pub fn steps(&self) -> &[StepRef<'a>] {
        &self.steps
    }

    pub fn last(&self) -> Option<&StepRef<'a>> {
        self.steps.last()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The name of the sub-test: the titles of the groups and the leaf on the
    /// way, joined with `/`.
    pub fn title(&self) -> String {
        self.steps
            .iter()
            .filter(|step| step.kind().is_named())
            .map(|step| step.title().trim())
            .filter(|title| !title.is_empty())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Whether replaying this suite needs a [`World`](crate::world::World).
    pub fn uses_world(&self) -> bool {
        self.steps.iter().any(|step| step.uses_world())
    }
}

/// Every suite recorded during registration, in registration order.
#[derive(Debug, Default)]
pub struct SuiteRegistry<'a> {
    suites: Vec<Suite<'a>>,
    cursor: usize,
}

impl<'a> SuiteRegistry<'a> {
    pub fn new() -> Self {
        Self {
            suites: Vec::new(),
            cursor: 0,
        }
    }

    /// Record a suite for `chain`.
    ///
    /// Nothing is recorded for an empty chain or for a chain ending in the same
    /// step as the previously recorded suite.
    pub fn record(&mut self, chain: Vec<StepRef<'a>>) -> bool {
        let Some(last) = chain.last() else {
            return false;
        };
        if let Some(previous) = self.suites.last().and_then(Suite::last) {
            if Arc::ptr_eq(previous, last) {
                return false;
            }
        }

        let suite = Suite::new(chain);
        debug!(suite = %suite.title(), steps = suite.len(), "suite registered");
        self.suites.push(suite);
        true
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    pub fn all(&self) -> &[Suite<'a>] {
        &self.suites
    }

    /// Suites recorded since the last call, each handed out once.
    pub fn take_pending(&mut self) -> Vec<Suite<'a>> {
        let pending = self.suites[self.cursor..].to_vec();
        self.cursor = self.suites.len();
        pending
    }
}
