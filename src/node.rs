//! The declaration tree the report is rendered from.
//!
//! Nodes live in an arena owned by [`NodeTree`] and are only ever appended. The
//! run state of a node is the [`SharedStepState`] of the step declared with it,
//! so replays never touch the tree itself.

use crate::{
    formatter::table::Table,
    location::SourceLocation,
    step::{SharedStepState, StepState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `describe` at top level, `feature`.
    Group,
    /// Nested `describe`, `context`, `scenario`.
    Subgroup,
    /// `background`.
    Precondition,
    /// `before_each`, `given`.
    Setup,
    /// `when`.
    Exercise,
    /// `then` declared inside a `background`.
    Assertion,
    /// `it`, `then`.
    Leaf,
    Table,
}

impl NodeKind {
    pub fn is_group(&self) -> bool {
        matches!(self, NodeKind::Group | NodeKind::Subgroup)
    }

    /// Whether a step of this kind names the sub-test of its suite.
    pub(crate) fn is_named(&self) -> bool {
        matches!(self, NodeKind::Group | NodeKind::Subgroup | NodeKind::Leaf)
    }
}

#[derive(Debug)]
pub struct Node {
    kind: NodeKind,
    title: String,
    location: Option<SourceLocation>,
    children: Vec<NodeId>,
    state: Option<SharedStepState>,
    table: Option<Table>,
    printed: bool,
}

impl Node {
    fn new(kind: NodeKind, title: String, location: Option<SourceLocation>) -> Self {
        Self {
            kind,
            title,
            location,
            children: Vec::new(),
            state: None,
            table: None,
            printed: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.location
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// A snapshot of the run state, `None` for nodes without a step.
    pub fn state(&self) -> Option<StepState> {
        self.state.as_ref().map(SharedStepState::get)
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// The table a replay of this node's step showed, if any.
    pub fn run_table(&self) -> Option<&Table> {
        self.state.as_ref()?.table()
    }

    pub fn printed(&self) -> bool {
        self.printed
    }
}

#[derive(Debug, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Append a node, as the last child of `parent` or as a new root.
    pub fn add(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        title: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> NodeId {
        let id = self.push(Node::new(kind, title.into(), location));
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Append a node whose run state is `state`.
    pub fn add_with_state(
        &mut self,
        parent: Option<NodeId>,
        kind: NodeKind,
        title: impl Into<String>,
        location: SourceLocation,
        state: SharedStepState,
    ) -> NodeId {
        let id = self.add(parent, kind, title, Some(location));
        self.nodes[id.0].state = Some(state);
        id
    }

    pub fn add_table(&mut self, parent: NodeId, table: Table, location: SourceLocation) -> NodeId {
        let id = self.add(Some(parent), NodeKind::Table, "", Some(location));
        self.nodes[id.0].table = Some(table);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn mark_printed(&mut self, id: NodeId) {
        self.nodes[id.0].printed = true;
        for child in self.nodes[id.0].children.clone() {
            self.mark_printed(child);
        }
    }

    /// Forget what was rendered, so the next render pass prints everything again.
    pub fn clear_printed(&mut self) {
        self.nodes.iter_mut().for_each(|node| node.printed = false);
    }

    /// Roots that have not been rendered yet.
    pub fn unprinted_roots(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .copied()
            .filter(|id| !self.get(*id).printed)
            .collect()
    }
}
