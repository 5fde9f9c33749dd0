//! Display trees for trace steps.
//!
//! [`render_step`] converts a step's snapshot into a [`StepView`] the widget
//! (or the CLI, through `Display`) can show directly. Pointers are resolved
//! against the step first: a resolvable pointer becomes a reference to its
//! target's location, an unresolvable one becomes a visible
//! [`ValueView::Dangling`] placeholder and its error is returned alongside
//! the view.

use std::fmt;

use lens_ir::{ensure_sufficient_stack, CharRange};
use lens_value::{resolve, Abbreviated, DanglingReason, Path, ResolveError, Value};

use crate::Step;

/// Display form of one value.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueView {
    Bool(bool),
    Char(char),
    /// An integer in decimal.
    Integer(String),
    Float(f64),
    /// A pointer whose target exists.
    Reference(Path),
    /// A pointer whose target does not exist in this step.
    Dangling { path: Path, reason: DanglingReason },
    Struct {
        name: String,
        fields: Vec<(String, ValueView)>,
    },
    Enum {
        name: String,
        variant: String,
        fields: Vec<(String, ValueView)>,
    },
    /// Included text; `len` is the true length in code units.
    Text { text: String, elided: usize, len: usize },
    /// Included items with their original indices; `len` is the true length.
    Sequence { items: Vec<(usize, ValueView)>, len: usize },
    Unallocated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameView {
    pub name: String,
    pub location: CharRange,
    pub locals: Vec<(String, ValueView)>,
}

/// Display form of one step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepView {
    pub index: usize,
    pub range: CharRange,
    pub frames: Vec<FrameView>,
    pub heap: Vec<ValueView>,
}

/// Build the view of `step`, collecting every dangling pointer on the way.
pub fn render_step(step: &Step) -> (StepView, Vec<ResolveError>) {
    let mut renderer = Renderer {
        step,
        errors: Vec::new(),
    };
    let frames = step
        .frames
        .iter()
        .map(|frame| FrameView {
            name: frame.name.clone(),
            location: frame.location,
            locals: frame
                .locals
                .iter()
                .map(|local| (local.name.clone(), renderer.value(&local.value)))
                .collect(),
        })
        .collect();
    let heap = step.heap.iter().map(|v| renderer.value(v)).collect();
    let view = StepView {
        index: step.index,
        range: step.range,
        frames,
        heap,
    };
    (view, renderer.errors)
}

struct Renderer<'a> {
    step: &'a Step,
    errors: Vec<ResolveError>,
}

impl Renderer<'_> {
    fn value(&mut self, value: &Value) -> ValueView {
        ensure_sufficient_stack(|| match value {
            Value::Bool(b) => ValueView::Bool(*b),
            Value::Char(c) => ValueView::Char(*c),
            Value::Uint(n) => ValueView::Integer(n.to_string()),
            Value::Int(n) => ValueView::Integer(n.to_string()),
            Value::Float(x) => ValueView::Float(*x),
            Value::Pointer(path) => match resolve(self.step, path) {
                Ok(_) => ValueView::Reference(path.clone()),
                Err(error) => {
                    let view = ValueView::Dangling {
                        path: path.clone(),
                        reason: error.reason(),
                    };
                    self.errors.push(error);
                    view
                }
            },
            Value::Struct { name, fields } => ValueView::Struct {
                name: name.clone(),
                fields: self.fields(fields),
            },
            Value::Enum {
                name,
                variant,
                fields,
            } => ValueView::Enum {
                name: name.clone(),
                variant: variant.clone(),
                fields: self.fields(fields),
            },
            Value::String(units) => text(units),
            Value::Array(items) => ValueView::Sequence {
                items: items
                    .iter_included()
                    .map(|(i, item)| (i, self.value(item)))
                    .collect(),
                len: items.len(),
            },
            Value::Unallocated => ValueView::Unallocated,
        })
    }

    fn fields(&mut self, fields: &[(String, Value)]) -> Vec<(String, ValueView)> {
        fields
            .iter()
            .map(|(name, value)| (name.clone(), self.value(value)))
            .collect()
    }
}

/// Code units to text, substituting U+FFFD for invalid scalar values.
fn text(units: &Abbreviated<u32>) -> ValueView {
    let decode = |u: &u32| char::from_u32(*u).unwrap_or(char::REPLACEMENT_CHARACTER);
    let mut text: String = units.prefix().iter().map(decode).collect();
    if let Some(last) = units.last() {
        text.push('…');
        text.push(decode(last));
    }
    ValueView::Text {
        text,
        elided: units.elided_len(),
        len: units.len(),
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, open: &str, fields: &[(String, ValueView)], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, (name, value)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}: {value}")?;
    }
    f.write_str(close)
}

impl fmt::Display for ValueView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| match self {
            ValueView::Bool(b) => write!(f, "{b}"),
            ValueView::Char(c) => write!(f, "'{c}'"),
            ValueView::Integer(n) => f.write_str(n),
            ValueView::Float(x) => write!(f, "{x}"),
            ValueView::Reference(path) => write!(f, "&{path}"),
            ValueView::Dangling { path, reason } => write!(f, "<dangling {path}: {reason}>"),
            ValueView::Struct { name, fields } => {
                f.write_str(name)?;
                write_fields(f, " { ", fields, " }")
            }
            ValueView::Enum {
                name,
                variant,
                fields,
            } => {
                write!(f, "{name}::{variant}")?;
                if fields.is_empty() {
                    return Ok(());
                }
                write_fields(f, "(", fields, ")")
            }
            ValueView::Text { text, elided, len } => {
                write!(f, "{text:?}")?;
                if *elided > 0 {
                    write!(f, " ({len} chars)")?;
                }
                Ok(())
            }
            ValueView::Sequence { items, len } => {
                f.write_str("[")?;
                let mut expected = 0;
                for (n, (index, item)) in items.iter().enumerate() {
                    if n > 0 {
                        f.write_str(", ")?;
                    }
                    if *index > expected {
                        write!(f, "…{} more, ", index - expected)?;
                    }
                    write!(f, "{item}")?;
                    expected = index + 1;
                }
                if expected < *len {
                    let sep = if items.is_empty() { "" } else { ", " };
                    write!(f, "{sep}…{} more", len - expected)?;
                }
                f.write_str("]")?;
                if items.len() < *len {
                    write!(f, " (len {len})")?;
                }
                Ok(())
            }
            ValueView::Unallocated => f.write_str("<unallocated>"),
        })
    }
}

impl fmt::Display for StepView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "step {} at {}", self.index, self.range)?;
        for frame in &self.frames {
            writeln!(f, "  {} @ {}", frame.name, frame.location)?;
            for (name, value) in &frame.locals {
                writeln!(f, "    {name} = {value}")?;
            }
        }
        for (i, value) in self.heap.iter().enumerate() {
            writeln!(f, "  heap#{i} = {value}")?;
        }
        Ok(())
    }
}
