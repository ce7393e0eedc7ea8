//! Small assertion helpers on [`TestContext`].
//!
//! They report a failure through [`TestContext::error`] instead of panicking, so
//! the remaining steps of a suite still run and can be rendered.

use std::{
    any::{Any, type_name},
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    fmt::Debug,
};

use crate::{context::TestContext, location::SourceLocation};

/// Things [`TestContext::expect_len`] can measure.
pub trait HasLength {
    fn length(&self) -> usize;
}

impl HasLength for str {
    fn length(&self) -> usize {
        self.chars().count()
    }
}

impl HasLength for String {
    fn length(&self) -> usize {
        self.as_str().length()
    }
}

impl<T> HasLength for [T] {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T, const N: usize> HasLength for [T; N] {
    fn length(&self) -> usize {
        N
    }
}

impl<T> HasLength for Vec<T> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T> HasLength for VecDeque<T> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, V, S> HasLength for HashMap<K, V, S> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T, S> HasLength for HashSet<T, S> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, V> HasLength for BTreeMap<K, V> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T> HasLength for BTreeSet<T> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T: HasLength + ?Sized> HasLength for &T {
    fn length(&self) -> usize {
        (**self).length()
    }
}

impl TestContext {
    #[track_caller]
    pub fn expect_eq<T, U>(&self, actual: T, expected: U) -> bool
    where
        T: Debug + PartialEq<U>,
        U: Debug,
    {
        if actual == expected {
            return true;
        }

        let location = SourceLocation::caller();
        let (expected_type, actual_type) = (type_name::<U>(), type_name::<T>());
        match expected_type == actual_type {
            true => self.error(format_args!(
                "{location}: equality check failed\n\
                 \texpected: {expected:?}\n\
                 \t  actual: {actual:?}"
            )),
            false => self.error(format_args!(
                "{location}: equality check failed\n\
                 \texpected: {expected:?} (type: {expected_type})\n\
                 \t  actual: {actual:?} (type: {actual_type})"
            )),
        }
        false
    }

    #[track_caller]
    pub fn expect_ne<T, U>(&self, actual: T, unexpected: U) -> bool
    where
        T: Debug + PartialEq<U>,
        U: Debug,
    {
        if actual != unexpected {
            return true;
        }

        let location = SourceLocation::caller();
        self.error(format_args!(
            "{location}: inequality check failed\n\tboth are: {actual:?}"
        ));
        false
    }

    #[track_caller]
    pub fn expect_true(&self, value: bool) -> bool {
        if !value {
            let location = SourceLocation::caller();
            self.error(format_args!("{location}: expected true but got false"));
        }
        value
    }

    #[track_caller]
    pub fn expect_false(&self, value: bool) -> bool {
        if value {
            let location = SourceLocation::caller();
            self.error(format_args!("{location}: expected false but got true"));
        }
        !value
    }

    #[track_caller]
    pub fn expect_len<T>(&self, value: &T, length: usize) -> bool
    where
        T: HasLength + Debug + ?Sized,
    {
        let actual = value.length();
        if actual == length {
            return true;
        }

        let location = SourceLocation::caller();
        self.error(format_args!(
            "{location}: expected {value:?} to have length {length} but it has {actual}"
        ));
        false
    }

    /// Check that `value` is a `T`.
    #[track_caller]
    pub fn expect_type<T: Any>(&self, value: &dyn Any) -> bool {
        if value.is::<T>() {
            return true;
        }

        let location = SourceLocation::caller();
        self.error(format_args!(
            "{location}: expected value to be of type `{}`",
            type_name::<T>()
        ));
        false
    }
}
