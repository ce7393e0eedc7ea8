//! Source locations of declarations.
//!
//! Every declaration method is `#[track_caller]`, so the location recorded for a
//! node is the line in the caller's test file, not a line inside this crate.

use std::{
    borrow::Cow,
    fmt::Display,
    panic::Location,
    path::{Path, PathBuf},
};

/// The file and line a block was declared at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    /// The location of the caller of the current `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }

    /// Format the location with `base_path` stripped from the file path.
    pub fn display_relative<'p>(&self, base_path: Option<&'p Path>) -> RelativeLocation<'p> {
        RelativeLocation {
            location: *self,
            base_path,
        }
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(value: &'static Location<'static>) -> Self {
        Self {
            file: value.file(),
            line: value.line(),
        }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A [`SourceLocation`] rendered relative to a base path.
#[derive(Debug, Clone, Copy)]
pub struct RelativeLocation<'p> {
    location: SourceLocation,
    base_path: Option<&'p Path>,
}

impl Display for RelativeLocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = Path::new(self.location.file);
        let file = self
            .base_path
            .and_then(|base| file.strip_prefix(base).ok())
            .unwrap_or(file);
        write!(f, "{}:{}", file.display(), self.location.line)
    }
}

/// The prefix stripped from printed file paths.
///
/// Computed once by whoever builds the suite and handed to the reporter, there
/// is no process wide cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasePath(Option<PathBuf>);

impl BasePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(Some(path.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn as_path(&self) -> Option<&Path> {
        self.0.as_deref()
    }
}

impl From<&str> for BasePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Cow<'_, str>> for BasePath {
    fn from(value: Cow<'_, str>) -> Self {
        Self::new(value.into_owned())
    }
}

impl From<PathBuf> for BasePath {
    fn from(value: PathBuf) -> Self {
        Self::new(value)
    }
}
