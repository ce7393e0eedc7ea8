//! The `feature` / `background` / `scenario` / `given` / `when` / `then` vocabulary.

use std::num::NonZeroUsize;

use crate::{
    context::TestContext,
    error::DeclarationError,
    formatter::{
        Output, Vocabulary,
        table::{Table, TableRow},
    },
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

/// Gherkin style declarations.
///
/// Every `then` inside a scenario is a leaf: it gets its own suite replaying
/// the background, the `given` and `when` steps declared before it and then
/// itself. A `then` inside a background is an ordinary setup step.
///
/// ```no_run
/// use std::sync::Mutex;
/// use kispec::prelude::*;
///
/// let t = TestContext::root("cart");
/// let cart = Mutex::new(Vec::new());
/// FeatureSuite::new(&t).run(|f| {
///     f.feature("Cart", |f| {
///         f.background(|f| {
///             f.given("a cart with two items", |_| *cart.lock().unwrap() = vec!["A", "B"]);
///         });
///         f.scenario("removing an item", |f| {
///             f.when("one item is removed", |_| {
///                 cart.lock().unwrap().pop();
///             });
///             f.then("one item is left", |t| {
///                 t.expect_len(&*cart.lock().unwrap(), 1);
///             });
///         });
///     });
/// });
/// t.conclude();
/// ```
#[derive(Debug)]
pub struct FeatureSuite<'a, M = Sequential> {
    registry: Registry<'a>,
    mode: M,
}

impl<'a> FeatureSuite<'a, Sequential> {
    pub fn new(t: &TestContext) -> Self {
        Self {
            registry: Registry::new(t, Vocabulary::Feature),
            mode: Sequential,
        }
    }

    #[track_caller]
    pub fn given(&mut self, title: impl Into<String>, f: impl Fn(&TestContext) + Send + Sync + 'a) {
        let location = SourceLocation::caller();
        self.declare_setup("given", NodeKind::Setup, title.into(), location, StepFn::context(f));
    }

    #[track_caller]
    pub fn when(&mut self, title: impl Into<String>, f: impl Fn(&TestContext) + Send + Sync + 'a) {
        let location = SourceLocation::caller();
        self.declare_setup("when", NodeKind::Exercise, title.into(), location, StepFn::context(f));
    }

    #[track_caller]
    pub fn then(&mut self, title: impl Into<String>, f: impl Fn(&TestContext) + Send + Sync + 'a) {
        let location = SourceLocation::caller();
        self.declare_then(title.into(), location, StepFn::context(f));
    }

    /// Declare everything in `body`. Every feature runs as soon as it is closed.
    pub fn run(mut self, body: impl FnOnce(&mut Self)) -> RunReport {
        body(&mut self);
        self.registry.finish()
    }
}

impl FeatureSuite<'static, Sequential> {
    /// Switch to parallel execution. `done` is called after every suite
    /// finished and the report was rendered.
    pub fn parallel(self, done: impl FnOnce() + Send + 'static) -> FeatureSuite<'static, Parallel> {
        let mut registry = self.registry;
        let mode = Parallel::new(done);
        registry.set_parallel(mode.is_parallel());
        FeatureSuite { registry, mode }
    }
}

impl FeatureSuite<'static, Parallel> {
    pub fn with_thread_count(mut self, count: NonZeroUsize) -> Self {
        self.mode.scheduler = self.mode.scheduler.with_thread_count(count);
        self
    }

    #[track_caller]
    pub fn given(
        &mut self,
        title: impl Into<String>,
        f: impl Fn(&TestContext, &World) + Send + Sync + 'static,
    ) {
        let location = SourceLocation::caller();
        let f = StepFn::context_and_world(f);
        self.declare_setup("given", NodeKind::Setup, title.into(), location, f);
    }

    #[track_caller]
    pub fn when(
        &mut self,
        title: impl Into<String>,
        f: impl Fn(&TestContext, &World) + Send + Sync + 'static,
    ) {
        let location = SourceLocation::caller();
        let f = StepFn::context_and_world(f);
        self.declare_setup("when", NodeKind::Exercise, title.into(), location, f);
    }

    #[track_caller]
    pub fn then(
        &mut self,
        title: impl Into<String>,
        f: impl Fn(&TestContext, &World) + Send + Sync + 'static,
    ) {
        let location = SourceLocation::caller();
        self.declare_then(title.into(), location, StepFn::context_and_world(f));
    }

    /// Declare everything in `body`, then run all suites concurrently without
    /// blocking.
    pub fn run(mut self, body: impl FnOnce(&mut Self)) -> ParallelRun {
        body(&mut self);
        let FeatureSuite { registry, mode } = self;
        registry.dispatch(mode.scheduler, mode.done)
    }
}

impl<'a, M: Mode> FeatureSuite<'a, M> {
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

    #[track_caller]
    pub fn feature(&mut self, title: impl Into<String>, body: impl FnOnce(&mut Self)) {
        let location = SourceLocation::caller();
        if self.registry.innermost().is_some() {
            return self
                .registry
                .reject(DeclarationError::NotTopLevel { block: "feature" }, location);
        }

        let step = self.registry.open_group(ScopeKind::Group, title.into(), location);
        body(self);
        self.registry.close_group(&step, location);
    }

    /// Declare steps that run first in every scenario of the enclosing feature.
    #[track_caller]
    pub fn background(&mut self, body: impl FnOnce(&mut Self)) {
        let location = SourceLocation::caller();
        if let Err(err) = self.directly_in_feature("background") {
            return self.registry.reject(err, location);
        }

        let step = self.registry.open_background(location);
        body(self);
        self.registry.close_background(&step, location);
    }

    #[track_caller]
    pub fn scenario(&mut self, title: impl Into<String>, body: impl FnOnce(&mut Self)) {
        let location = SourceLocation::caller();
        if let Err(err) = self.directly_in_feature("scenario") {
            return self.registry.reject(err, location);
        }

        let step = self.registry.open_group(ScopeKind::Subgroup, title.into(), location);
        body(self);
        self.registry.close_group(&step, location);
    }

    /// Show `items` as a table under the step declared right before.
    ///
    /// The table is only printed, steps can not read it.
    #[track_caller]
    pub fn table<R: TableRow>(&mut self, items: &[R], columns: &[&str]) {
        let location = SourceLocation::caller();
        self.registry.attach_table(Table::new(items, columns), location);
    }

    fn directly_in_feature(&self, block: &'static str) -> Result<(), DeclarationError> {
        match self.registry.innermost() {
            Some(ScopeKind::Group) => Ok(()),
            Some(ScopeKind::Subgroup) => Err(DeclarationError::InsideOf {
                block,
                parent: "scenario",
            }),
            Some(ScopeKind::Background) => Err(DeclarationError::InsideOf {
                block,
                parent: "background",
            }),
            None => Err(DeclarationError::OutsideOf {
                block,
                parent: "feature",
            }),
        }
    }

    fn declare_setup(
        &mut self,
        block: &'static str,
        kind: NodeKind,
        title: String,
        location: SourceLocation,
        f: StepFn<'a>,
    ) {
        match self.registry.innermost() {
            Some(_) => self.registry.declare_setup(kind, title, location, f),
            None => self.registry.reject(
                DeclarationError::OutsideOf {
                    block,
                    parent: "feature",
                },
                location,
            ),
        }
    }

    fn declare_then(&mut self, title: String, location: SourceLocation, f: StepFn<'a>) {
        match self.registry.innermost() {
            Some(ScopeKind::Background) => {
                self.registry
                    .declare_setup(NodeKind::Assertion, title, location, f)
            }
            Some(_) => self.registry.declare_leaf(title, location, f),
            None => self.registry.reject(
                DeclarationError::OutsideOf {
                    block: "then",
                    parent: "feature",
                },
                location,
            ),
        }
    }
}
