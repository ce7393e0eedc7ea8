use std::io::{self, Write};

use crate::{
    formatter::{
        Style, TreeFormat,
        color::{Paint, colors::*},
        spec::leaf_colors,
        table::Table,
    },
    node::{Node, NodeKind},
};

/// Prints Gherkin style reports.
///
/// ```text
/// Feature: Cart
///
///   Background:
///     Given a cart with two items
///
///   Scenario: removing an item
///     When one item is removed
///     ✔ Then one item is left
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureFormat;

impl TreeFormat for FeatureFormat {
    fn write_node(
        &self,
        w: &mut dyn Write,
        node: &Node,
        depth: usize,
        style: &Style<'_>,
    ) -> io::Result<bool> {
        let indent = style.indent(depth);
        let title = node.title();
        let location = style.location(node);
        let bold = |text| Paint::bold(style.color, text);

        match node.kind() {
            NodeKind::Group => writeln!(w, "{indent}{} {title}{location}", bold("Feature:"))?,
            NodeKind::Precondition => writeln!(w, "\n{indent}{}{location}", bold("Background:"))?,
            NodeKind::Subgroup => writeln!(w, "\n{indent}{} {title}{location}", bold("Scenario:"))?,
            NodeKind::Setup => writeln!(
                w,
                "{indent}{} {title}{location}",
                Paint::new(style.color, CYAN, "Given")
            )?,
            NodeKind::Exercise => writeln!(
                w,
                "{indent}{} {title}{location}",
                Paint::new(style.color, GREEN, "When")
            )?,
            NodeKind::Assertion => writeln!(
                w,
                "{indent}{} {title}{location}",
                Paint::new(style.color, YELLOW, "Then")
            )?,
            NodeKind::Leaf => {
                let glyph = node.state().unwrap_or_default().glyph();
                let (glyph_color, _) = leaf_colors(glyph);
                let marker = format!("{} ", glyph.as_str());
                writeln!(
                    w,
                    "{indent}{}{} {title}{}{location}",
                    Paint::new(style.color, glyph_color, &marker),
                    Paint::new(style.color, YELLOW, "Then"),
                    style.duration(node),
                )?
            }
            NodeKind::Table => {
                write_table(w, node.table(), &indent)?;
                return Ok(false);
            }
        }

        // A table declared with the step is its only child.
        if node.children().is_empty() {
            write_table(w, node.run_table(), &style.indent(depth + 1))?;
        }
        Ok(true)
    }
}

fn write_table(w: &mut dyn Write, table: Option<&Table>, indent: &str) -> io::Result<()> {
    for line in table.map(Table::lines).unwrap_or_default() {
        writeln!(w, "{indent}{line}")?;
    }
    Ok(())
}
