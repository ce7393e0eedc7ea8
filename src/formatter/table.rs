//! Tabular example data shown under a feature step.
//!
//! Tables are display only, nothing in a suite reads them.

use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    fmt::Display,
    hash::{BuildHasher, Hash},
};

/// A row of a [`Table`], looked up by column name.
pub trait TableRow {
    fn cell(&self, column: &str) -> Option<String>;
}

impl<K, V, S> TableRow for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: Display,
    S: BuildHasher,
{
    fn cell(&self, column: &str) -> Option<String> {
        self.get(column).map(ToString::to_string)
    }
}

impl<K, V> TableRow for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: Display,
{
    fn cell(&self, column: &str) -> Option<String> {
        self.get(column).map(ToString::to_string)
    }
}

impl<R: TableRow + ?Sized> TableRow for &R {
    fn cell(&self, column: &str) -> Option<String> {
        (**self).cell(column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Collect the `columns` of every item. Missing cells stay blank.
    pub fn new<R: TableRow>(items: &[R], columns: &[&str]) -> Self {
        let rows = items
            .iter()
            .map(|item| {
                columns
                    .iter()
                    .map(|column| item.cell(column).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self {
            columns: columns.iter().map(ToString::to_string).collect(),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(Some(column.chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect()
    }

    /// The header line followed by one line per row, without indentation.
    pub fn lines(&self) -> Vec<String> {
        let widths = self.widths();
        let line = |cells: &[String]| {
            let mut line = String::from("|");
            for (cell, width) in cells.iter().zip(widths.iter().copied()) {
                line.push_str(&format!(" {cell:<width$} |"));
            }
            line
        };

        std::iter::once(line(&self.columns))
            .chain(self.rows.iter().map(|row| line(row)))
            .collect()
    }
}
