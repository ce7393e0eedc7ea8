//! The sub-test runner the suites report into.
//!
//! A [`TestContext`] is the handle a step callback receives. It collects errors,
//! knows whether it failed or was skipped and runs named child contexts, one per
//! replayed suite. Child failures propagate to the parent, so a single root
//! context created inside a `#[test]` function sees the result of every suite
//! and [`TestContext::conclude`] turns that into a regular test failure.

use std::{
    any::Any,
    borrow::Cow,
    fmt::Display,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use crate::outcome::{TestFailure, TestOutcome, TestStatus};

#[derive(Debug, Clone)]
pub struct TestContext {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    parent: Option<TestContext>,
    state: Mutex<ContextState>,
}

#[derive(Debug, Default)]
struct ContextState {
    errors: Vec<String>,
    panic: Option<String>,
    failed: bool,
    fatal: bool,
    skipped: Option<Option<Cow<'static, str>>>,
    sub_tests: Vec<TestOutcome>,
}

impl TestContext {
    /// Create a context without a parent, typically one per `#[test]` function.
    pub fn root(name: impl Into<String>) -> Self {
        Self::with_parent(name.into(), None)
    }

    fn with_parent(name: String, parent: Option<TestContext>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                parent,
                state: Mutex::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ContextState> {
        // A callback panicking never holds this lock, recover from poison anyway.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&TestContext> {
        self.inner.parent.as_ref()
    }

    /// Report an error and mark this context as failed, execution continues.
    pub fn error(&self, msg: impl Display) {
        let mut state = self.lock();
        state.errors.push(msg.to_string());
        state.failed = true;
    }

    /// Report an error that makes everything scheduled afterwards on this
    /// context pointless. Suites started after this are skipped.
    pub fn fatal(&self, msg: impl Display) {
        let mut state = self.lock();
        state.errors.push(msg.to_string());
        state.failed = true;
        state.fatal = true;
    }

    /// Mark this context as failed without a message.
    pub fn fail(&self) {
        self.lock().failed = true;
    }

    pub fn failed(&self) -> bool {
        self.lock().failed
    }

    pub fn is_fatal(&self) -> bool {
        self.lock().fatal
    }

    /// Skip the rest of this context. Steps after the current one are not run.
    pub fn skip(&self) {
        self.lock().skipped.get_or_insert(None);
    }

    pub fn skip_because(&self, reason: impl Into<Cow<'static, str>>) {
        self.lock().skipped = Some(Some(reason.into()));
    }

    pub fn skipped(&self) -> bool {
        self.lock().skipped.is_some()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock().errors.clone()
    }

    /// Outcomes of the child contexts, in the order they finished.
    pub fn sub_tests(&self) -> Vec<TestOutcome> {
        self.lock().sub_tests.clone()
    }

    pub fn sub_test_names(&self) -> Vec<String> {
        self.lock()
            .sub_tests
            .iter()
            .map(|outcome| outcome.name.clone())
            .collect()
    }

    pub fn status(&self) -> TestStatus {
        let state = self.lock();
        if let Some(panic) = &state.panic {
            return TestStatus::Failed(TestFailure::Panicked(panic.clone()));
        }
        if state.failed {
            return TestStatus::Failed(TestFailure::Errors(state.errors.clone()));
        }
        if let Some(reason) = &state.skipped {
            return TestStatus::Skipped {
                reason: reason.clone(),
            };
        }
        TestStatus::Passed
    }

    /// Create a named child context. It is only recorded on this context once
    /// handed to [`conclude_child`](Self::conclude_child).
    pub fn child(&self, name: impl Into<String>) -> TestContext {
        Self::with_parent(name.into(), Some(self.clone()))
    }

    /// Run `f` as a named child and block until it returns.
    ///
    /// Panics inside `f` are caught and fail the child.
    pub fn run_child(&self, name: impl Into<String>, f: impl FnOnce(&TestContext)) -> TestOutcome {
        let child = self.child(name);
        let now = Instant::now();
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| f(&child))) {
            child.record_panic(payload);
        }
        self.conclude_child(&child, now.elapsed())
    }

    /// Record the outcome of `child` on this context.
    pub fn conclude_child(&self, child: &TestContext, duration: Duration) -> TestOutcome {
        let outcome = TestOutcome {
            name: child.name().to_string(),
            status: child.status(),
            duration,
        };

        let mut state = self.lock();
        if outcome.failed() {
            state.failed = true;
        }
        state.sub_tests.push(outcome.clone());
        outcome
    }

    pub(crate) fn record_panic(&self, payload: Box<dyn Any + Send + 'static>) {
        let msg = payload_as_string(payload);
        let mut state = self.lock();
        state.errors.push(format!("panicked: {msg}"));
        state.panic.get_or_insert(msg);
        state.failed = true;
    }

    /// Turn the collected result into a regular test result.
    ///
    /// # Panics
    ///
    /// Panics with every collected error if this context failed.
    pub fn conclude(&self) {
        let state = self.lock();
        if !state.failed {
            return;
        }

        let mut msg = format!("{} failed", self.name());
        for error in state.errors.iter() {
            msg.push_str("\n  ");
            msg.push_str(error);
        }
        for outcome in state.sub_tests.iter() {
            if let TestStatus::Failed(failure) = &outcome.status {
                msg.push_str(&format!("\n  --- {}: {}", outcome.name, failure.message()));
            }
        }
        drop(state);
        panic!("{msg}");
    }
}

/// Convert a panic payload into a string.
///
/// This matches the common payload types produced by `panic!` (`&'static str` and `String`).
/// Other payload types are formatted as a generic placeholder.
pub(crate) fn payload_as_string(err: Box<dyn Any + Send + 'static>) -> String {
    err.downcast::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|err| err.downcast::<String>().map(|s| *s))
        .unwrap_or_else(|_| String::from("Box<dyn Any>"))
}
