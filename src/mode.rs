//! Execution modes of a suite.
//!
//! The mode decides the callback shapes the declaration methods accept:
//! [`Sequential`] suites take closures that may borrow from the test function,
//! [`Parallel`] suites take `'static` closures receiving a [`World`](crate::world::World).

use std::fmt::Debug;

use crate::scheduler::ParallelScheduler;

mod sealed {
    pub trait Sealed {}
}

/// Marker for the execution mode of a suite.
pub trait Mode: sealed::Sealed {
    fn is_parallel(&self) -> bool;
}

/// Suites run one after another, each top-level block right after it was declared.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sequential;

impl sealed::Sealed for Sequential {}

impl Mode for Sequential {
    fn is_parallel(&self) -> bool {
        false
    }
}

/// Suites run concurrently once the whole declaration was registered.
pub struct Parallel {
    pub(crate) scheduler: ParallelScheduler,
    pub(crate) done: Box<dyn FnOnce() + Send + 'static>,
}

impl Parallel {
    pub(crate) fn new(done: impl FnOnce() + Send + 'static) -> Self {
        Self {
            scheduler: ParallelScheduler::default(),
            done: Box::new(done),
        }
    }
}

impl sealed::Sealed for Parallel {}

impl Mode for Parallel {
    fn is_parallel(&self) -> bool {
        true
    }
}

impl Debug for Parallel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parallel")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}
