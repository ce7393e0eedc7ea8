//! Errors reported by kispec.
//!
//! None of these abort a run. They are reported on the [`TestContext`](crate::context::TestContext)
//! of the declaration or replay that caused them, which fails that context, and
//! everything else keeps going.

use thiserror::Error;

/// A block was declared in a position its vocabulary does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    #[error("invalid position for `{block}`, it must be at top level")]
    NotTopLevel { block: &'static str },

    #[error("invalid position for `{block}`, it must be inside a `{parent}` call")]
    OutsideOf {
        block: &'static str,
        parent: &'static str,
    },

    #[error("invalid position for `{block}`, it can not be used inside a `{parent}` block")]
    InsideOf {
        block: &'static str,
        parent: &'static str,
    },

    #[error("unexpected `{found}` on the declaration stack, expected `{expected}`")]
    UnbalancedStack { expected: String, found: String },

    #[error("`table` must follow a step declaration")]
    TableWithoutStep,
}

/// A [`World`](crate::world::World) was used in a way that can not work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("world does not have value set for '{key}'")]
    Missing { key: String },

    #[error(
        "can not swap value, since world does not have value set for '{key}', \
         try setting it first"
    )]
    SwapMissing { key: String },

    #[error("world value '{key}' is not of type `{expected}`")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("`table` can only be shown while a step is running")]
    NoRunningStep,
}

/// An indentation string that is neither two spaces, four spaces nor one tab.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported indentation: {0:?}")]
pub struct UnsupportedIndent(pub String);
