//! The `describe` / `before_each` / `it` vocabulary.

use std::num::NonZeroUsize;

use crate::{
    context::TestContext,
    error::DeclarationError,
    formatter::{Output, Vocabulary},
    location::{BasePath, SourceLocation},
    mode::{Mode, Parallel, Sequential},
    node::{NodeKind, NodeTree},
    registry::Registry,
    report::RunReport,
    scheduler::ParallelRun,
    stack::ScopeKind,
    step::StepFn,
    suite::Suite,
    world::World,
};

/// Nested `describe` blocks with `before_each` setups and `it` examples.
///
/// ```no_run
/// use kispec::prelude::*;
///
/// let t = TestContext::root("numbers");
/// let report = SpecSuite::new(&t).run(|s| {
///     s.describe("numbers", |s| {
///         s.before_each(|| {});
///         s.it("add up", |t| {
///             t.expect_eq(1 + 1, 2);
///         });
///     });
/// });
/// assert!(report.is_good());
/// t.conclude();
/// ```
#[derive(Debug)]
pub struct SpecSuite<'a, M = Sequential> {
    registry: Registry<'a>,
    mode: M,
}

impl<'a> SpecSuite<'a, Sequential> {
    pub fn new(t: &TestContext) -> Self {
        Self {
            registry: Registry::new(t, Vocabulary::Spec),
            mode: Sequential,
        }
    }

    /// Declare a setup that runs before every `it` after it in this block and
    /// in nested blocks.
    #[track_caller]
    pub fn before_each(&mut self, f: impl Fn() + Send + Sync + 'a) {
        let location = SourceLocation::caller();
        self.declare_setup(location, StepFn::no_arg(f));
    }

    #[track_caller]
    pub fn it(&mut self, title: impl Into<String>, f: impl Fn(&TestContext) + Send + Sync + 'a) {
        let location = SourceLocation::caller();
        self.declare_leaf(title.into(), location, StepFn::context(f));
    }

    /// Declare everything in `body`. Every top-level `describe` runs as soon as
    /// it is closed.
    pub fn run(mut self, body: impl FnOnce(&mut Self)) -> RunReport {
        body(&mut self);
        self.registry.finish()
    }
}

impl SpecSuite<'static, Sequential> {
    /// Switch to parallel execution. `done` is called after every suite
    /// finished and the report was rendered.
    pub fn parallel(self, done: impl FnOnce() + Send + 'static) -> SpecSuite<'static, Parallel> {
        let mut registry = self.registry;
        let mode = Parallel::new(done);
        registry.set_parallel(mode.is_parallel());
        SpecSuite { registry, mode }
    }
}

impl SpecSuite<'static, Parallel> {
    pub fn with_thread_count(mut self, count: NonZeroUsize) -> Self {
        self.mode.scheduler = self.mode.scheduler.with_thread_count(count);
        self
    }

    #[track_caller]
    pub fn before_each(&mut self, f: impl Fn(&TestContext, &World) + Send + Sync + 'static) {
        let location = SourceLocation::caller();
        self.declare_setup(location, StepFn::context_and_world(f));
    }

    #[track_caller]
    pub fn it(
        &mut self,
        title: impl Into<String>,
        f: impl Fn(&TestContext, &World) + Send + Sync + 'static,
    ) {
        let location = SourceLocation::caller();
        self.declare_leaf(title.into(), location, StepFn::context_and_world(f));
    }

    /// Declare everything in `body`, then run all suites concurrently without
    /// blocking.
    pub fn run(mut self, body: impl FnOnce(&mut Self)) -> ParallelRun {
        body(&mut self);
        let SpecSuite { registry, mode } = self;
        registry.dispatch(mode.scheduler, mode.done)
    }
}

impl<'a, M: Mode> SpecSuite<'a, M> {
    /// Add an output. The first one replaces the default stdout output.
    pub fn with_output(mut self, output: Output<'a>) -> Self {
        self.registry.add_output(output);
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<BasePath>) -> Self {
        self.registry.set_base_path(base_path.into());
        self
    }

    pub fn test_context(&self) -> &TestContext {
        self.registry.context()
    }

    /// Every suite recorded so far.
    pub fn suites(&self) -> &[Suite<'a>] {
        self.registry.suites()
    }

    pub fn tree(&self) -> &NodeTree {
        self.registry.tree()
    }

    /// Declare a group. At top level it starts a new tree, nested it is a
    /// subgroup of the enclosing one.
    #[track_caller]
    pub fn describe(&mut self, title: impl Into<String>, body: impl FnOnce(&mut Self)) {
        let location = SourceLocation::caller();
        let scope = match self.registry.innermost() {
            None => ScopeKind::Group,
            Some(ScopeKind::Background) => {
                return self.registry.reject(
                    DeclarationError::InsideOf {
                        block: "describe",
                        parent: "background",
                    },
                    location,
                );
            }
            Some(_) => ScopeKind::Subgroup,
        };
        self.group(scope, title.into(), location, body);
    }

    /// Declare a nested group, reads better than a nested `describe` for a
    /// variation of the enclosing setup.
    #[track_caller]
    pub fn context(&mut self, title: impl Into<String>, body: impl FnOnce(&mut Self)) {
        let location = SourceLocation::caller();
        match self.registry.innermost() {
            Some(scope) if scope.is_group() => {
                self.group(ScopeKind::Subgroup, title.into(), location, body)
            }
            Some(_) => self.registry.reject(
                DeclarationError::InsideOf {
                    block: "context",
                    parent: "background",
                },
                location,
            ),
            None => self.registry.reject(
                DeclarationError::OutsideOf {
                    block: "context",
                    parent: "describe",
                },
                location,
            ),
        }
    }

    /// Declare setups that run before everything else in the enclosing group,
    /// wherever they are declared in it.
    #[track_caller]
    pub fn background(&mut self, body: impl FnOnce(&mut Self)) {
        let location = SourceLocation::caller();
        match self.registry.innermost() {
            Some(scope) if scope.is_group() => (),
            Some(_) => {
                return self.registry.reject(
                    DeclarationError::InsideOf {
                        block: "background",
                        parent: "background",
                    },
                    location,
                );
            }
            None => {
                return self.registry.reject(
                    DeclarationError::OutsideOf {
                        block: "background",
                        parent: "describe",
                    },
                    location,
                );
            }
        }

        let step = self.registry.open_background(location);
        body(self);
        self.registry.close_background(&step, location);
    }

    fn group(
        &mut self,
        scope: ScopeKind,
        title: String,
        location: SourceLocation,
        body: impl FnOnce(&mut Self),
    ) {
        let step = self.registry.open_group(scope, title, location);
        body(self);
        self.registry.close_group(&step, location);
    }

    fn declare_setup(&mut self, location: SourceLocation, f: StepFn<'a>) {
        match self.registry.innermost() {
            Some(_) => self
                .registry
                .declare_setup(NodeKind::Setup, String::new(), location, f),
            None => self.registry.reject(
                DeclarationError::OutsideOf {
                    block: "before_each",
                    parent: "describe",
                },
                location,
            ),
        }
    }

    fn declare_leaf(&mut self, title: String, location: SourceLocation, f: StepFn<'a>) {
        match self.registry.innermost() {
            Some(ScopeKind::Background) => self.registry.reject(
                DeclarationError::InsideOf {
                    block: "it",
                    parent: "background",
                },
                location,
            ),
            Some(_) => self.registry.declare_leaf(title, location, f),
            None => self.registry.reject(
                DeclarationError::OutsideOf {
                    block: "it",
                    parent: "describe",
                },
                location,
            ),
        }
    }
}
