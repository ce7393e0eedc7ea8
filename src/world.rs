//! State shared between the steps of one suite.
//!
//! Parallel suites can not share captured variables, so every replay gets its
//! own [`World`]. Misuse (reading a key that was never set, reading it as the
//! wrong type) is reported on the suite's context and never panics.

use std::{
    any::{Any, type_name},
    collections::HashMap,
    fmt::Debug,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::{debug, warn};

use crate::{
    context::TestContext,
    error::WorldError,
    formatter::table::{Table, TableRow},
    step::SharedStepState,
};

pub struct World {
    t: TestContext,
    values: Mutex<HashMap<String, Box<dyn Any + Send>>>,
    step: Mutex<Option<SharedStepState>>,
}

impl World {
    pub fn new(t: TestContext) -> Self {
        Self {
            t,
            values: Mutex::default(),
            step: Mutex::default(),
        }
    }

    /// Mark the step whose callback runs next.
    pub(crate) fn enter(&self, step: &SharedStepState) {
        *self.step.lock().unwrap_or_else(PoisonError::into_inner) = Some(step.clone());
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Box<dyn Any + Send>>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, err: WorldError) {
        warn!(suite = self.t.name(), "{err}");
        self.t.error(err);
    }

    /// Store `value` under `key`, replacing whatever was there.
    pub fn set(&self, key: impl Into<String>, value: impl Any + Send) {
        self.lock().insert(key.into(), Box::new(value));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Get a clone of the value under `key`.
    pub fn get<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.with(key, T::clone)
    }

    /// Borrow the value under `key` for the duration of `f`.
    ///
    /// `f` runs under the world's lock and must not use this world again.
    pub fn with<T: Any, R>(&self, key: &str, f: impl FnOnce(&T) -> R) -> Option<R> {
        let values = self.lock();
        let err = match values.get(key) {
            None => WorldError::Missing { key: key.into() },
            Some(value) => match value.downcast_ref::<T>() {
                Some(value) => return Some(f(value)),
                None => WorldError::TypeMismatch {
                    key: key.into(),
                    expected: type_name::<T>(),
                },
            },
        };
        drop(values);
        self.report(err);
        None
    }

    /// Show `items` as a table under the step that is running.
    ///
    /// This is [`FeatureSuite::table`](crate::feature::FeatureSuite::table) for
    /// steps that build their data at run time. A step shows at most one table:
    /// one declared with the step wins, otherwise the first replay to call this.
    /// Only feature reports print these tables.
    pub fn table<R: TableRow>(&self, items: &[R], columns: &[&str]) {
        let step = self.step.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let Some(step) = step else {
            self.report(WorldError::NoRunningStep);
            return;
        };
        if !step.show_table(Table::new(items, columns)) {
            debug!(suite = self.t.name(), "step already shows a table");
        }
    }

    /// Replace the value under `key` with `f(value)`, atomically.
    ///
    /// `f` is not called if `key` is not set or holds another type.
    pub fn swap<T: Any + Send>(&self, key: &str, f: impl FnOnce(T) -> T) {
        let mut values = self.lock();
        let err = match values.remove(key) {
            None => WorldError::SwapMissing { key: key.into() },
            Some(value) => match value.downcast::<T>() {
                Ok(value) => {
                    values.insert(key.into(), Box::new(f(*value)));
                    return;
                }
                Err(value) => {
                    values.insert(key.into(), value);
                    WorldError::TypeMismatch {
                        key: key.into(),
                        expected: type_name::<T>(),
                    }
                }
            },
        };
        drop(values);
        self.report(err);
    }
}

impl Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.lock().keys().cloned().collect();
        keys.sort();
        f.debug_struct("World")
            .field("suite", &self.t.name())
            .field("keys", &keys)
            .finish()
    }
}
