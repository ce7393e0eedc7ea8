//! Rendering the node tree.
//!
//! The report mirrors the declaration, not the flat list of suites. Every root
//! is rendered once to every [`Output`], each output with its own decorations,
//! and then marked as printed.

use std::{
    fmt::Debug,
    io::{self, Write},
    path::Path,
    str::FromStr,
};

use crate::{
    error::UnsupportedIndent,
    location::BasePath,
    node::{Node, NodeId, NodeTree},
};

pub mod color;
pub mod feature;
pub mod spec;
pub mod table;

use color::{ColorSetting, SupportsColor};

/// The unit one level of nesting is indented by.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    #[default]
    TwoSpaces,
    FourSpaces,
    Tab,
}

impl Indent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Indent::TwoSpaces => "  ",
            Indent::FourSpaces => "    ",
            Indent::Tab => "\t",
        }
    }
}

impl FromStr for Indent {
    type Err = UnsupportedIndent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "  " => Ok(Indent::TwoSpaces),
            "    " => Ok(Indent::FourSpaces),
            "\t" => Ok(Indent::Tab),
            other => Err(UnsupportedIndent(other.to_string())),
        }
    }
}

/// A place the report is written to.
pub struct Output<'o> {
    target: Box<dyn Write + Send + 'o>,
    supports_color: bool,
    color: ColorSetting,
    durations: bool,
    locations: bool,
    indent: Indent,
}

impl<'o> Output<'o> {
    /// A plain output: no color, no durations, no locations, two-space indent.
    pub fn new(target: impl Write + Send + 'o) -> Self {
        Self {
            target: Box::new(target),
            supports_color: false,
            color: ColorSetting::Automatic,
            durations: false,
            locations: false,
            indent: Indent::default(),
        }
    }

    /// Like [`new`](Self::new), but colored automatically if `target` is a terminal.
    pub fn terminal(target: impl Write + SupportsColor + Send + 'o) -> Self {
        let supports_color = target.supports_color();
        Self {
            supports_color,
            ..Self::new(target)
        }
    }

    pub fn with_color(self, color: impl Into<ColorSetting>) -> Self {
        Self {
            color: color.into(),
            ..self
        }
    }

    pub fn with_durations(self, durations: bool) -> Self {
        Self { durations, ..self }
    }

    pub fn with_locations(self, locations: bool) -> Self {
        Self { locations, ..self }
    }

    pub fn with_indent(self, indent: Indent) -> Self {
        Self { indent, ..self }
    }

    /// Return whether this output will currently emit colored output.
    pub fn use_color(&self) -> bool {
        self.color.use_color(self.supports_color)
    }
}

impl Output<'static> {
    /// The output used when none is configured: stdout with durations.
    pub fn stdout() -> Self {
        Self::terminal(io::stdout()).with_durations(true)
    }
}

impl Debug for Output<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("color", &self.use_color())
            .field("durations", &self.durations)
            .field("locations", &self.locations)
            .field("indent", &self.indent)
            .finish_non_exhaustive()
    }
}

/// The decorations of one output, handed to a [`TreeFormat`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Style<'p> {
    pub color: bool,
    pub durations: bool,
    pub locations: bool,
    pub indent: Indent,
    pub base_path: Option<&'p Path>,
}

impl Style<'_> {
    pub fn indent(&self, depth: usize) -> String {
        self.indent.as_str().repeat(depth)
    }

    /// The `\tfile:line` suffix, if locations are enabled.
    pub fn location(&self, node: &Node) -> String {
        match (self.locations, node.location()) {
            (true, Some(location)) => format!("\t{}", location.display_relative(self.base_path)),
            _ => String::new(),
        }
    }

    /// The ` (Nms)` suffix, if durations are enabled and were recorded.
    pub fn duration(&self, node: &Node) -> String {
        match (self.durations, node.state().and_then(|state| state.elapsed)) {
            (true, Some(elapsed)) => format!(" ({}ms)", elapsed.as_millis()),
            _ => String::new(),
        }
    }
}

/// How one vocabulary prints its nodes.
pub(crate) trait TreeFormat: Sync {
    /// Write the lines of `node`, return whether its children should be written.
    fn write_node(
        &self,
        w: &mut dyn Write,
        node: &Node,
        depth: usize,
        style: &Style<'_>,
    ) -> io::Result<bool>;
}

/// Which of the two vocabularies a report is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    Spec,
    Feature,
}

impl Vocabulary {
    fn format(&self) -> &'static dyn TreeFormat {
        match self {
            Vocabulary::Spec => &spec::SpecFormat,
            Vocabulary::Feature => &feature::FeatureFormat,
        }
    }
}

fn write_tree(
    format: &dyn TreeFormat,
    w: &mut dyn Write,
    tree: &NodeTree,
    id: NodeId,
    depth: usize,
    style: &Style<'_>,
) -> io::Result<()> {
    let node = tree.get(id);
    if node.printed() {
        return Ok(());
    }

    if format.write_node(w, node, depth, style)? {
        for child in node.children() {
            write_tree(format, w, tree, *child, depth + 1, style)?;
        }
    }
    Ok(())
}

/// Renders unprinted roots of a [`NodeTree`] to every configured output.
#[derive(Debug)]
pub struct Reporter<'o> {
    vocabulary: Vocabulary,
    outputs: Vec<Output<'o>>,
    configured: bool,
    base_path: BasePath,
}

impl<'o> Reporter<'o> {
    /// A reporter writing to [`Output::stdout`] until an output is added.
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            outputs: vec![Output::stdout()],
            configured: false,
            base_path: BasePath::none(),
        }
    }

    /// Add an output. The first one added replaces the default stdout output.
    pub fn add_output(&mut self, output: Output<'o>) {
        if !self.configured {
            self.outputs.clear();
            self.configured = true;
        }
        self.outputs.push(output);
    }

    pub fn set_base_path(&mut self, base_path: BasePath) {
        self.base_path = base_path;
    }

    pub fn outputs(&self) -> &[Output<'o>] {
        &self.outputs
    }

    /// Render every root that was not rendered yet and mark it printed.
    ///
    /// Rendering always covers every output, write errors are returned.
    pub fn render(&mut self, tree: &mut NodeTree) -> Vec<io::Error> {
        let format = self.vocabulary.format();
        let mut errors = Vec::new();

        for root in tree.unprinted_roots() {
            for output in self.outputs.iter_mut() {
                let style = Style {
                    color: output.use_color(),
                    durations: output.durations,
                    locations: output.locations,
                    indent: output.indent,
                    base_path: self.base_path.as_path(),
                };
                let res = write_tree(format, &mut output.target, tree, root, 0, &style)
                    .and_then(|_| writeln!(output.target))
                    .and_then(|_| output.target.flush());
                if let Err(err) = res {
                    errors.push(err);
                }
            }
            tree.mark_printed(root);
        }

        errors
    }
}
