use std::io::{self, Write};

use crate::{
    formatter::{
        Style, TreeFormat,
        color::{Paint, colors::*},
    },
    node::{Node, NodeKind},
    step::Glyph,
};

/// Prints `describe`/`it` trees: group titles and one glyph line per leaf.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpecFormat;

pub(crate) fn leaf_colors(glyph: Glyph) -> (&'static str, &'static str) {
    match glyph {
        Glyph::Pass => (GREEN, GRAY),
        Glyph::Fail => (RED, RED),
        Glyph::Skip => (CYAN, CYAN),
    }
}

impl TreeFormat for SpecFormat {
    fn write_node(
        &self,
        w: &mut dyn Write,
        node: &Node,
        depth: usize,
        style: &Style<'_>,
    ) -> io::Result<bool> {
        let indent = style.indent(depth);
        match node.kind() {
            NodeKind::Group | NodeKind::Subgroup => {
                writeln!(
                    w,
                    "{indent}{}{}",
                    Paint::bold(style.color, node.title()),
                    style.location(node)
                )?;
                Ok(true)
            }
            NodeKind::Leaf => {
                let glyph = node.state().unwrap_or_default().glyph();
                let (glyph_color, title_color) = leaf_colors(glyph);
                let marker = format!("{} ", glyph.as_str());
                writeln!(
                    w,
                    "{indent}{}{}{}{}",
                    Paint::new(style.color, glyph_color, &marker),
                    Paint::new(style.color, title_color, node.title()),
                    style.duration(node),
                    style.location(node)
                )?;
                Ok(false)
            }
            NodeKind::Precondition
            | NodeKind::Setup
            | NodeKind::Exercise
            | NodeKind::Assertion
            | NodeKind::Table => Ok(false),
        }
    }
}
