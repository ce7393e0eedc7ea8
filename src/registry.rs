//! The registration engine behind both vocabularies.
//!
//! Declaring is walking: every block is registered while the caller's closure
//! runs, depth first. Each declaration adds a node to the [`NodeTree`] and a step
//! to the [`DeclarationStack`]. Each leaf records a suite. When a top-level
//! block closes in sequential mode, its suites run and its tree is rendered
//! before the next top-level block is even declared.

use tracing::{debug, warn};

use crate::{
    context::TestContext,
    error::DeclarationError,
    formatter::{Output, Reporter, Vocabulary, table::Table},
    location::{BasePath, SourceLocation},
    node::{NodeKind, NodeTree},
    report::RunReport,
    scheduler::{ParallelRun, ParallelScheduler, SequentialScheduler},
    stack::{DeclarationStack, ScopeKind},
    step::{SharedStepState, Step, StepFn, StepRef},
    suite::{Suite, SuiteRegistry},
};

#[derive(Debug)]
pub struct Registry<'a> {
    t: TestContext,
    tree: NodeTree,
    stack: DeclarationStack<'a>,
    suites: SuiteRegistry<'a>,
    reporter: Reporter<'a>,
    parallel: bool,
    report: RunReport,
}

impl<'a> Registry<'a> {
    pub fn new(t: &TestContext, vocabulary: Vocabulary) -> Self {
        Self {
            t: t.clone(),
            tree: NodeTree::new(),
            stack: DeclarationStack::new(),
            suites: SuiteRegistry::new(),
            reporter: Reporter::new(vocabulary),
            parallel: false,
            report: RunReport::default(),
        }
    }

    pub(crate) fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    pub fn context(&self) -> &TestContext {
        &self.t
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn suites(&self) -> &[Suite<'a>] {
        self.suites.all()
    }

    pub fn innermost(&self) -> Option<ScopeKind> {
        self.stack.innermost()
    }

    pub fn add_output(&mut self, output: Output<'a>) {
        self.reporter.add_output(output);
    }

    pub fn set_base_path(&mut self, base_path: BasePath) {
        self.reporter.set_base_path(base_path);
    }

    /// Report a block that can not be declared where it was.
    pub fn reject(&mut self, err: DeclarationError, location: SourceLocation) {
        warn!(%location, "{err}");
        self.t.error(format_args!("{location}: {err}"));
        self.report.declaration_errors.push(err);
    }

    fn new_step(
        &mut self,
        kind: NodeKind,
        title: String,
        location: SourceLocation,
        callback: Option<StepFn<'a>>,
    ) -> StepRef<'a> {
        let state = SharedStepState::default();
        let node = self.tree.add_with_state(
            self.stack.parent_node(),
            kind,
            title.clone(),
            location,
            state.clone(),
        );
        Step::new(kind, title, node, location, callback, state)
    }

    /// Open a group (at top level) or a subgroup. The caller runs the body and
    /// then calls [`close_group`](Self::close_group) with the returned step.
    pub fn open_group(
        &mut self,
        scope: ScopeKind,
        title: String,
        location: SourceLocation,
    ) -> StepRef<'a> {
        let kind = match scope {
            ScopeKind::Group => NodeKind::Group,
            _ => NodeKind::Subgroup,
        };
        let step = self.new_step(kind, title, location, None);
        self.stack.open_group(scope, step.clone(), self.suites.len());
        step
    }

    /// Close a group opened by [`open_group`](Self::open_group).
    ///
    /// A subgroup whose body recorded no suite records one for itself, a
    /// top-level group without leaves records nothing. Closing the last open
    /// group runs its suites in sequential mode.
    pub fn close_group(&mut self, step: &StepRef<'a>, location: SourceLocation) {
        let chain = self.stack.chain();
        match self.stack.close(step) {
            Ok(closed)
                if closed.kind == ScopeKind::Subgroup
                    && self.suites.len() == closed.suites_at_open =>
            {
                self.suites.record(chain);
            }
            Ok(_) => (),
            Err(err) => self.reject(err, location),
        }

        if self.stack.is_empty() && !self.parallel {
            self.run_pending();
        }
    }

    /// Open a background in the innermost group.
    pub fn open_background(&mut self, location: SourceLocation) -> StepRef<'a> {
        let step = self.new_step(NodeKind::Precondition, String::new(), location, None);
        self.stack.open_background(step.clone(), self.suites.len());
        step
    }

    pub fn close_background(&mut self, step: &StepRef<'a>, location: SourceLocation) {
        if let Err(err) = self.stack.close(step) {
            self.reject(err, location);
        }
    }

    /// Declare a step that runs before every leaf declared after it in its scope.
    pub fn declare_setup(
        &mut self,
        kind: NodeKind,
        title: String,
        location: SourceLocation,
        callback: StepFn<'a>,
    ) {
        let step = self.new_step(kind, title, location, Some(callback));
        self.stack.push(step);
    }

    /// Declare a leaf and record the suite ending in it.
    pub fn declare_leaf(&mut self, title: String, location: SourceLocation, callback: StepFn<'a>) {
        let step = self.new_step(NodeKind::Leaf, title, location, Some(callback));
        self.stack.push(step.clone());
        self.suites.record(self.stack.chain());
        if let Err(err) = self.stack.pop_leaf(&step) {
            self.reject(err, location);
        }
    }

    /// Attach `table` to the most recently declared step of the innermost scope.
    pub fn attach_table(&mut self, table: Table, location: SourceLocation) {
        let target = self.stack.last_node().filter(|node| {
            matches!(
                self.tree.get(*node).kind(),
                NodeKind::Setup | NodeKind::Exercise | NodeKind::Assertion | NodeKind::Leaf
            )
        });
        match target {
            Some(node) => {
                self.tree.add_table(node, table, location);
            }
            None => self.reject(DeclarationError::TableWithoutStep, location),
        }
    }

    fn run_pending(&mut self) {
        let pending = self.suites.take_pending();
        debug!(suites = pending.len(), "running suites");
        let report = SequentialScheduler::new().run(pending, &self.t);
        self.report.merge(report);
        self.render();
    }

    /// Render every root that was not rendered yet.
    pub fn render(&mut self) {
        let errors = self.reporter.render(&mut self.tree);
        for err in errors.iter() {
            warn!("could not write report: {err}");
            self.t.error(format_args!("could not write report: {err}"));
        }
        self.report.fmt_errors.extend(errors);
    }

    /// Run what is left and hand out the collected report.
    pub(crate) fn finish(mut self) -> RunReport {
        self.run_pending();
        self.report
    }
}

impl Registry<'static> {
    /// Queue every recorded suite on `scheduler` and return right away.
    ///
    /// Once all suites finished, the report is rendered and `done` is called,
    /// both on the coordinator thread.
    pub(crate) fn dispatch(
        mut self,
        scheduler: ParallelScheduler,
        done: Box<dyn FnOnce() + Send + 'static>,
    ) -> ParallelRun {
        let pending = self.suites.take_pending();
        debug!(suites = pending.len(), "dispatching suites");

        let (tx, rx) = crossbeam_channel::bounded(1);
        let Registry {
            t,
            mut tree,
            mut reporter,
            report: declared,
            ..
        } = self;

        let root = t.clone();
        let dispatched = scheduler.dispatch(pending, &t, move |report| {
            let mut full = declared;
            full.merge(report);

            let errors = reporter.render(&mut tree);
            for err in errors.iter() {
                warn!("could not write report: {err}");
                root.error(format_args!("could not write report: {err}"));
            }
            full.fmt_errors.extend(errors);

            done();
            // Nobody waiting for the report is fine.
            let _ = tx.send(full);
        });

        if let Err(err) = dispatched {
            warn!("could not start parallel run: {err}");
            t.fatal(format_args!("could not start parallel run: {err}"));
        }

        ParallelRun::new(rx)
    }
}
