//! Steps are what a suite replays.
//!
//! Each declaration creates exactly one [`Step`]. Steps declared above a leaf
//! (groups, backgrounds, setups) are shared by every suite assembled beneath
//! them, so a suite holds [`StepRef`]s and never owns a copy.

use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
    time::Duration,
};

use crate::{
    context::TestContext,
    formatter::table::Table,
    location::SourceLocation,
    node::{NodeId, NodeKind},
    world::World,
};

/// Run state of a step, overwritten by every replay that reaches it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepState {
    pub executed: bool,
    pub failed: bool,
    /// Which failure of its replay this was, starting at 1. Zero if not failed.
    pub failed_at: usize,
    pub skipped: bool,
    /// Only recorded in sequential mode.
    pub elapsed: Option<Duration>,
}

impl StepState {
    pub fn glyph(&self) -> Glyph {
        match (self.executed, self.skipped, self.failed, self.failed_at) {
            (false, _, _, _) | (_, true, _, _) => Glyph::Skip,
            (true, false, true, 1) => Glyph::Fail,
            (true, false, true, _) => Glyph::Skip,
            (true, false, false, _) => Glyph::Pass,
        }
    }
}

/// The status marker printed in front of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Pass,
    Fail,
    Skip,
}

impl Glyph {
    pub fn as_str(&self) -> &'static str {
        match self {
            Glyph::Pass => "✔",
            Glyph::Fail => "⨯",
            Glyph::Skip => "s",
        }
    }
}

/// A step state shared between the step and its node.
#[derive(Debug, Clone, Default)]
pub struct SharedStepState {
    state: Arc<Mutex<StepState>>,
    table: Arc<OnceLock<Table>>,
}

impl SharedStepState {
    pub fn lock(&self) -> MutexGuard<'_, StepState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The table a replay showed under this step, see [`World::table`].
    pub fn table(&self) -> Option<&Table> {
        self.table.get()
    }

    /// Keep `table` unless an earlier replay already showed one.
    pub(crate) fn show_table(&self, table: Table) -> bool {
        self.table.set(table).is_ok()
    }

    pub fn get(&self) -> StepState {
        *self.lock()
    }

    pub(crate) fn reset(&self) {
        *self.lock() = StepState::default();
    }
}

/// The callback of a step, in one of the shapes the vocabularies accept.
pub enum StepFn<'a> {
    NoArg(Box<dyn Fn() + Send + Sync + 'a>),
    Context(Box<dyn Fn(&TestContext) + Send + Sync + 'a>),
    ContextAndWorld(Box<dyn Fn(&TestContext, &World) + Send + Sync + 'a>),
}

impl<'a> StepFn<'a> {
    pub fn no_arg(f: impl Fn() + Send + Sync + 'a) -> Self {
        Self::NoArg(Box::new(f))
    }

    pub fn context(f: impl Fn(&TestContext) + Send + Sync + 'a) -> Self {
        Self::Context(Box::new(f))
    }

    pub fn context_and_world(f: impl Fn(&TestContext, &World) + Send + Sync + 'a) -> Self {
        Self::ContextAndWorld(Box::new(f))
    }

    pub fn uses_world(&self) -> bool {
        matches!(self, StepFn::ContextAndWorld(_))
    }

    pub(crate) fn call(&self, t: &TestContext, world: Option<&World>) {
        match (self, world) {
            (StepFn::NoArg(f), _) => f(),
            (StepFn::Context(f), _) => f(t),
            (StepFn::ContextAndWorld(f), Some(world)) => f(t, world),
            (StepFn::ContextAndWorld(f), None) => f(t, &World::new(t.clone())),
        }
    }
}

impl Debug for StepFn<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepFn::NoArg(_) => f.write_str("StepFn::NoArg(..)"),
            StepFn::Context(_) => f.write_str("StepFn::Context(..)"),
            StepFn::ContextAndWorld(_) => f.write_str("StepFn::ContextAndWorld(..)"),
        }
    }
}

#[derive(Debug)]
pub struct Step<'a> {
    kind: NodeKind,
    title: String,
    node: NodeId,
    location: SourceLocation,
    callback: Option<StepFn<'a>>,
    state: SharedStepState,
}

pub type StepRef<'a> = Arc<Step<'a>>;

impl<'a> Step<'a> {
    pub(crate) fn new(
        kind: NodeKind,
        title: impl Into<String>,
        node: NodeId,
        location: SourceLocation,
        callback: Option<StepFn<'a>>,
        state: SharedStepState,
    ) -> StepRef<'a> {
        Arc::new(Self {
            kind,
            title: title.into(),
            node,
            location,
            callback,
            state,
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    pub fn callback(&self) -> Option<&StepFn<'a>> {
        self.callback.as_ref()
    }

    pub fn state(&self) -> &SharedStepState {
        &self.state
    }

    pub fn uses_world(&self) -> bool {
        self.callback.as_ref().is_some_and(StepFn::uses_world)
    }
}
