// Tree rendering of search results and network catalogs.
//
// A response body is first turned into a `Node` tree, then drawn with
// box-drawing guides. Building never fails: anything that is not a mapping
// or a list ends up as a leaf holding its string form.

use crossterm::style::{style, Color, Stylize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Printed instead of a tree when the body holds nothing.
pub const NO_RESULTS: &str = "No results found.";

/// Field naming the network a record came from; redundant with the group label.
const PLATFORM: &str = "platform";
/// Fallback for the group label when `platform` is missing.
const SOURCE: &str = "source";
/// Free-text field always rendered last in its branch.
const DESCRIPTION: &str = "description";
/// Group label for records that name no network.
const UNKNOWN_LABEL: &str = "NaN";

/// One line of the rendered tree and the branches hanging below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub label: String,
    pub children: Vec<Node>,
}

impl Node {
    /// A node with no children.
    pub fn new(label: impl Into<String>) -> Node {
        Node {
            label: label.into(),
            children: vec![],
        }
    }

    fn push(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Labels of the direct children, in order.
    pub fn child_labels(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.label.as_str()).collect()
    }

    /// First direct child with the given label.
    pub fn child(&self, label: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.label == label)
    }

    /// Draw this node and everything below it with `style`.
    pub fn display<'a>(&'a self, style: &'a Style) -> Display<'a> {
        Display { node: self, style }
    }
}

/// Build the tree for `body` under `root_label`.
///
/// A mapping groups by key, a list groups by each record's `platform`
/// (falling back to `source`). Returns `None` when there is nothing to show.
pub fn build(root_label: &str, body: &Value) -> Option<Node> {
    if is_empty(body) {
        return None;
    }

    let mut root = Node::new(root_label);
    match body {
        Value::Object(entries) => {
            for (name, value) in entries {
                let node = root.push(Node::new(name.as_str()));
                expand_value(value, node, &[PLATFORM]);
            }
        }
        Value::Array(records) => {
            for record in records {
                match record {
                    Value::Object(record) => {
                        let node = root.push(Node::new(group_label(record)));
                        expand_record(record, node, &[PLATFORM]);
                    }
                    other => {
                        root.push(Node::new(scalar_string(other)));
                    }
                }
            }
        }
        other => {
            root.push(Node::new(scalar_string(other)));
        }
    }

    Some(root)
}

/// Render `body` to text: the drawn tree, or the "no results" notice.
pub fn render(root_label: &str, body: &Value, style: &Style) -> String {
    match build(root_label, body) {
        Some(tree) => tree.display(style).to_string(),
        None => format!("{}\n", NO_RESULTS),
    }
}

fn expand_value(value: &Value, parent: &mut Node, exclude: &[&str]) {
    match value {
        Value::Object(record) => expand_record(record, parent, exclude),
        Value::Array(items) => expand_items(items, parent),
        other => {
            parent.push(Node::new(scalar_string(other)));
        }
    }
}

fn expand_record(record: &Map<String, Value>, parent: &mut Node, exclude: &[&str]) {
    for (key, value) in record {
        if key == DESCRIPTION || exclude.contains(&key.as_str()) {
            continue;
        }

        match value {
            Value::Object(nested) => {
                let branch = parent.push(Node::new(key.as_str()));
                expand_record(nested, branch, &[]);
            }
            Value::Array(items) => {
                let branch = parent.push(Node::new(key.as_str()));
                expand_items(items, branch);
            }
            other => {
                parent.push(Node::new(format!("{}: {}", key, scalar_string(other))));
            }
        }
    }

    if let Some(description) = record.get(DESCRIPTION).filter(|d| is_present(d)) {
        parent.push(Node::new(scalar_string(description)));
    }
}

fn expand_items(items: &[Value], parent: &mut Node) {
    for item in items {
        match item {
            Value::Object(record) => expand_record(record, parent, &[]),
            other => {
                parent.push(Node::new(scalar_string(other)));
            }
        }
    }
}

/// `platform` if present and non-empty, else `source`, else "NaN";
/// capitalized.
fn group_label(record: &Map<String, Value>) -> String {
    let label = [PLATFORM, SOURCE]
        .iter()
        .filter_map(|field| record.get(*field))
        .find(|value| is_present(value))
        .map(scalar_string)
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
    capitalize(&label)
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a value counts as set: not null, false, zero or empty.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn is_empty(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Glyph set for the tree guides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Ascii,
}

impl FromStr for Charset {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Charset, &'static str> {
        match s {
            "utf8" => Ok(Charset::Utf8),
            "ascii" => Ok(Charset::Ascii),
            _ => Err("invalid charset"),
        }
    }
}

struct Symbols {
    down: &'static str,
    tee: &'static str,
    ell: &'static str,
    right: &'static str,
}

static UTF8_SYMBOLS: Symbols = Symbols {
    down: "│",
    tee: "├",
    ell: "└",
    right: "─",
};

static ASCII_SYMBOLS: Symbols = Symbols {
    down: "|",
    tee: "|",
    ell: "`",
    right: "-",
};

/// Guide glyphs and whether to color them.
pub struct Style {
    symbols: &'static Symbols,
    color: bool,
}

impl Style {
    /// Guides drawn from `charset`, colored when `color` is set.
    pub fn new(charset: Charset, color: bool) -> Style {
        let symbols = match charset {
            Charset::Utf8 => &UTF8_SYMBOLS,
            Charset::Ascii => &ASCII_SYMBOLS,
        };
        Style { symbols, color }
    }

    fn guide(&self, f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
        if self.color {
            write!(f, "{}", style(s).with(Color::Blue))
        } else {
            f.write_str(s)
        }
    }

    fn indent(&self, f: &mut fmt::Formatter<'_>, levels_continue: &[bool]) -> fmt::Result {
        for continues in levels_continue {
            let c = if *continues { self.symbols.down } else { " " };
            self.guide(f, c)?;
            f.write_str("   ")?;
        }
        Ok(())
    }
}

impl Default for Style {
    fn default() -> Style {
        Style::new(Charset::Utf8, false)
    }
}

/// `fmt::Display` adapter returned by [`Node::display`].
pub struct Display<'a> {
    node: &'a Node,
    style: &'a Style,
}

impl<'a> fmt::Display for Display<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut levels_continue = vec![];
        write_node(f, self.node, self.style, &mut levels_continue)
    }
}

fn write_node(
    f: &mut fmt::Formatter<'_>,
    node: &Node,
    style: &Style,
    levels_continue: &mut Vec<bool>,
) -> fmt::Result {
    let mut lines = node.label.split('\n');
    let first = lines.next().unwrap_or_default();

    if let Some((last_continues, rest)) = levels_continue.split_last() {
        style.indent(f, rest)?;
        let c = if *last_continues {
            style.symbols.tee
        } else {
            style.symbols.ell
        };
        style.guide(f, &format!("{0}{1}{1}", c, style.symbols.right))?;
        f.write_str(" ")?;
    }
    writeln!(f, "{}", first)?;

    // continuation lines of a multi-line label stay inside the guides
    for line in lines {
        style.indent(f, levels_continue)?;
        writeln!(f, "{}", line)?;
    }

    let mut it = node.children.iter().peekable();
    while let Some(child) = it.next() {
        levels_continue.push(it.peek().is_some());
        write_node(f, child, style, levels_continue)?;
        levels_continue.pop();
    }

    Ok(())
}
