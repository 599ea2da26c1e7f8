//! Textual renderings of trees.
//!
//! Role
//! - [`TreeFormatter`] selects one of four layouts for any [`Tree`]:
//!   - `Parentheses`: the round-trippable notation of [`crate::parentheses`],
//!     `mul(div(cos(1.0),cos(π)),sin(mul(1.0,z)))`;
//!   - `Tree`: an indented outline drawn with box characters;
//!   - `Lisp`: `(mul (div (cos 1.0) (cos π)) (sin (mul 1.0 z)))`, broken over several
//!     lines when it does not fit the configured width;
//!   - `Dot`: a Graphviz digraph with one vertex per node.
//! - The Lisp layout is an RcDoc annotated with [`Style`]s so it can also be printed
//!   with colors on a `termcolor` sink, parentheses colored by nesting depth.
//!
//! Performance
//! - Every layout is built iteratively in O(n) in the size of the tree; the Lisp
//!   layout then renders in linear time in the size of the document.

use std::fmt;
use std::io::{self, Write};

use pretty::{RcDoc, RenderAnnotated};
use strum::EnumIs;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::parentheses;
use crate::tree::Tree;

/// Width used by [`TreeFormatter::lisp`].
pub const DEFAULT_WIDTH: usize = 80;

/// Layout used to render a tree as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, EnumIs)]
pub enum TreeFormatter {
    #[default]
    Parentheses,
    /// Outline with `├──`, `│` and `└──` connectors, one node per line.
    Tree,
    /// S-expression layout fitting in `width` columns when possible.
    Lisp { width: usize },
    /// Graphviz digraph called `name`.
    Dot { name: String },
}

impl TreeFormatter {
    /// Lisp layout at [`DEFAULT_WIDTH`] columns.
    pub fn lisp() -> Self {
        TreeFormatter::Lisp {
            width: DEFAULT_WIDTH,
        }
    }

    /// Graphviz layout for a digraph called `name`.
    pub fn dot(name: impl Into<String>) -> Self {
        TreeFormatter::Dot { name: name.into() }
    }

    /// Renders `tree`, values formatted with [`Display`](fmt::Display).
    pub fn format<T>(&self, tree: &T) -> String
    where
        T: Tree,
        T::Value: fmt::Display,
    {
        self.format_with(tree, |value| value.to_string())
    }

    /// Renders `tree`, values formatted with `format`.
    pub fn format_with<T, F>(&self, tree: &T, format: F) -> String
    where
        T: Tree,
        F: FnMut(&T::Value) -> String,
    {
        match self {
            TreeFormatter::Parentheses => parentheses::to_parentheses_string_with(tree, format),
            TreeFormatter::Tree => outline(tree, format),
            TreeFormatter::Lisp { width } => {
                let mut out = String::new();
                let _ = lisp_doc(tree, format).render_fmt(*width, &mut out);
                out
            }
            TreeFormatter::Dot { name } => dot(tree, name, format),
        }
    }
}

// ======================== Outline ========================

fn outline<T, F>(tree: &T, mut format: F) -> String
where
    T: Tree,
    F: FnMut(&T::Value) -> String,
{
    let mut lines = Vec::new();
    // (node, prefix of its line, whether it is the last child; `None` for the top)
    let mut stack = vec![(tree.clone(), String::new(), None)];

    while let Some((node, prefix, last)) = stack.pop() {
        let label = format(node.value());
        let child_prefix = match last {
            None => {
                lines.push(label);
                String::new()
            }
            Some(last) => {
                let (connector, indent) = if last {
                    ("└── ", "    ")
                } else {
                    ("├── ", "│   ")
                };
                lines.push(format!("{prefix}{connector}{label}"));
                format!("{prefix}{indent}")
            }
        };

        let count = node.child_count();
        for (index, child) in node.children().enumerate().rev() {
            stack.push((child, child_prefix.clone(), Some(index + 1 == count)));
        }
    }
    lines.join("\n")
}

// ======================== Dot ========================

fn dot<T, F>(tree: &T, name: &str, mut format: F) -> String
where
    T: Tree,
    F: FnMut(&T::Value) -> String,
{
    let mut labels = String::new();
    let mut edges = String::new();
    // Nodes are numbered in pre-order.
    let mut stack: Vec<(T, Option<usize>)> = vec![(tree.clone(), None)];
    let mut next = 0usize;

    while let Some((node, parent)) = stack.pop() {
        let index = next;
        next += 1;

        let label = format(node.value())
            .replace('\\', "\\\\")
            .replace('"', "\\\"");
        labels.push_str(&format!("    node_{index:03} [label=\"{label}\"];\n"));
        if let Some(parent) = parent {
            edges.push_str(&format!("    node_{parent:03} -> node_{index:03};\n"));
        }
        for child in node.children().rev() {
            stack.push((child, Some(index)));
        }
    }
    format!("digraph {name} {{\n{labels}{edges}}}\n")
}

// ======================== Lisp ========================

/// Styles used to annotate the Lisp layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Parentheses are colored by nesting depth so matching pairs share a color.
    Paren(u8),
    /// Value of an inner node, written right after its `(`.
    Operator,
    /// Value of a leaf.
    Leaf,
}

impl Style {
    fn to_color_spec(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Style::Paren(depth) => {
                let fg = match depth % 6 {
                    0 => Color::Blue,
                    1 => Color::Green,
                    2 => Color::White,
                    3 => Color::Yellow,
                    4 => Color::Red,
                    _ => Color::Magenta,
                };
                spec.set_fg(Some(fg)).set_dimmed(true);
            }
            Style::Operator => {
                spec.set_fg(Some(Color::Cyan)).set_bold(true);
            }
            Style::Leaf => {
                spec.set_fg(Some(Color::Green));
            }
        }
        spec
    }
}

enum Frame<T> {
    Enter(T, u8),
    Exit(String, usize, u8),
}

/// Builds the annotated Lisp document of `tree`.
pub fn lisp_doc<T, F>(tree: &T, mut format: F) -> RcDoc<'static, Style>
where
    T: Tree,
    F: FnMut(&T::Value) -> String,
{
    let mut docs: Vec<RcDoc<'static, Style>> = Vec::new();
    let mut stack = vec![Frame::Enter(tree.clone(), 0)];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(node, depth) => {
                let label = format(node.value());
                if node.is_leaf() {
                    docs.push(RcDoc::text(label).annotate(Style::Leaf));
                    continue;
                }
                stack.push(Frame::Exit(label, node.child_count(), depth));
                for child in node.children().rev() {
                    stack.push(Frame::Enter(child, depth.wrapping_add(1)));
                }
            }
            Frame::Exit(label, count, depth) => {
                let children = docs.split_off(docs.len() - count);
                let doc = RcDoc::as_string("(")
                    .annotate(Style::Paren(depth))
                    .append(RcDoc::text(label).annotate(Style::Operator))
                    .append(
                        RcDoc::line()
                            .append(RcDoc::intersperse(children, RcDoc::line()))
                            .nest(2),
                    )
                    .append(RcDoc::as_string(")").annotate(Style::Paren(depth)))
                    .group();
                docs.push(doc);
            }
        }
    }
    docs.pop().unwrap_or_else(RcDoc::nil)
}

// A writer that maps Style annotations to termcolor ColorSpec on a WriteColor sink.
struct ColorWriter<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorWriter<'_, W> {
    fn push_annotation(&mut self, ann: &'a Style) -> io::Result<()> {
        self.out.set_color(&ann.to_color_spec())
    }

    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<W: WriteColor + Write> pretty::Render for ColorWriter<'_, W> {
    type Error = io::Error;

    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.out.write_all(s.as_bytes())?;
        Ok(s.len())
    }

    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    fn fail_doc(&self) -> Self::Error {
        io::Error::other("render failed")
    }
}

/// Writes the Lisp layout of `tree` to a `termcolor` sink, colored, at `width`
/// columns.
pub fn write_lisp<T, W>(tree: &T, width: usize, out: &mut W) -> io::Result<()>
where
    T: Tree,
    T::Value: fmt::Display,
    W: WriteColor + Write,
{
    let doc = lisp_doc(tree, |value| value.to_string());
    let mut writer = ColorWriter { out };
    doc.render_raw(width, &mut writer)
}
