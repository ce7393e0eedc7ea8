//! The declaration stack.
//!
//! While the caller's closures run, the stack holds the steps of every open
//! block plus the setups declared so far. It only exists during registration,
//! which is single threaded.

use std::sync::Arc;

use crate::{error::DeclarationError, node::NodeId, step::StepRef};

/// An open block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Group,
    Subgroup,
    Background,
}

impl ScopeKind {
    pub fn is_group(&self) -> bool {
        matches!(self, ScopeKind::Group | ScopeKind::Subgroup)
    }
}

#[derive(Debug)]
struct Entry<'a> {
    step: StepRef<'a>,
    /// Background steps of a group entry, in declaration order.
    preconditions: Vec<StepRef<'a>>,
}

#[derive(Debug)]
struct Scope<'a> {
    kind: ScopeKind,
    step: StepRef<'a>,
    /// Index of the entry that receives steps declared in this scope: the
    /// scope's own entry for groups, the enclosing group's for backgrounds.
    entry: usize,
    suites_at_open: usize,
    last_node: Option<NodeId>,
}

/// A block that was closed by [`DeclarationStack::close`].
#[derive(Debug)]
pub struct Closed<'a> {
    pub kind: ScopeKind,
    pub step: StepRef<'a>,
    pub suites_at_open: usize,
}

#[derive(Debug, Default)]
pub struct DeclarationStack<'a> {
    entries: Vec<Entry<'a>>,
    scopes: Vec<Scope<'a>>,
}

impl<'a> DeclarationStack<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn innermost(&self) -> Option<ScopeKind> {
        self.scopes.last().map(|scope| scope.kind)
    }

    /// The node new declarations are attached to, `None` at top level.
    pub fn parent_node(&self) -> Option<NodeId> {
        self.scopes.last().map(|scope| scope.step.node())
    }

    /// The most recently declared step node of the innermost scope.
    pub fn last_node(&self) -> Option<NodeId> {
        self.scopes.last().and_then(|scope| scope.last_node)
    }

    fn note_node(&mut self, node: NodeId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.last_node = Some(node);
        }
    }

    /// Open a group or subgroup whose step is `step`.
    pub fn open_group(&mut self, kind: ScopeKind, step: StepRef<'a>, suites: usize) {
        debug_assert!(kind.is_group());
        self.note_node(step.node());
        self.entries.push(Entry {
            step: step.clone(),
            preconditions: Vec::new(),
        });
        self.scopes.push(Scope {
            kind,
            step,
            entry: self.entries.len() - 1,
            suites_at_open: suites,
            last_node: None,
        });
    }

    /// Open a background inside the innermost group.
    ///
    /// The caller checks that the innermost scope is a group.
    pub fn open_background(&mut self, step: StepRef<'a>, suites: usize) {
        let Some(entry) = self.scopes.last().map(|scope| scope.entry) else {
            return;
        };
        self.note_node(step.node());
        self.entries[entry].preconditions.push(step.clone());
        self.scopes.push(Scope {
            kind: ScopeKind::Background,
            step,
            entry,
            suites_at_open: suites,
            last_node: None,
        });
    }

    /// Declare a step in the innermost scope.
    ///
    /// Inside a background the step becomes a precondition of the enclosing
    /// group, otherwise it is pushed onto the main stack.
    pub fn push(&mut self, step: StepRef<'a>) {
        self.note_node(step.node());
        match self.scopes.last() {
            Some(Scope {
                kind: ScopeKind::Background,
                entry,
                ..
            }) => self.entries[*entry].preconditions.push(step),
            _ => self.entries.push(Entry {
                step,
                preconditions: Vec::new(),
            }),
        }
    }

    /// Remove a leaf pushed by [`push`](Self::push).
    pub fn pop_leaf(&mut self, leaf: &StepRef<'a>) -> Result<(), DeclarationError> {
        match self.entries.last() {
            Some(top) if Arc::ptr_eq(&top.step, leaf) => {
                self.entries.pop();
                Ok(())
            }
            top => Err(DeclarationError::UnbalancedStack {
                expected: leaf.title().to_string(),
                found: top.map(|e| e.step.title().to_string()).unwrap_or_default(),
            }),
        }
    }

    /// Close the innermost scope, which must be the one opened with `step`.
    ///
    /// Closing a group drops its setups and preconditions. Closing a background
    /// keeps the preconditions it collected until its group closes.
    pub fn close(&mut self, step: &StepRef<'a>) -> Result<Closed<'a>, DeclarationError> {
        let Some(scope) = self.scopes.pop() else {
            return Err(DeclarationError::UnbalancedStack {
                expected: step.title().to_string(),
                found: String::new(),
            });
        };

        if !Arc::ptr_eq(&scope.step, step) {
            let found = scope.step.title().to_string();
            self.scopes.push(scope);
            return Err(DeclarationError::UnbalancedStack {
                expected: step.title().to_string(),
                found,
            });
        }

        if scope.kind.is_group() {
            self.entries.truncate(scope.entry);
        }

        Ok(Closed {
            kind: scope.kind,
            step: scope.step,
            suites_at_open: scope.suites_at_open,
        })
    }

    /// The steps a suite assembled right now would replay: each entry followed
    /// by its preconditions.
    pub fn chain(&self) -> Vec<StepRef<'a>> {
        self.entries
            .iter()
            .flat_map(|entry| std::iter::once(&entry.step).chain(entry.preconditions.iter()))
            .cloned()
            .collect()
    }
}
