//! Pointer resolution against a snapshot.
//!
//! Resolution walks a [`Path`] from its root through each projection. A path
//! that names something the snapshot does not hold is a dangling reference:
//! the backend promised the target was emitted and it was not.

use std::fmt;

use crate::path::{PathPart, PathRoot};
use crate::{Abbreviated, Path, Value};

/// Read access to the values of one execution step.
pub trait Snapshot {
    /// Number of stack frames.
    fn frame_count(&self) -> usize;

    /// Value of local `name` in frame `frame`.
    fn local(&self, frame: usize, name: &str) -> Option<&Value>;

    /// Heap allocation at `index`.
    fn heap(&self, index: usize) -> Option<&Value>;
}

/// What a path resolves to.
#[derive(Clone, Debug, PartialEq)]
pub enum Target<'a> {
    Value(&'a Value),
    /// One code unit of a string.
    CodeUnit(u32),
    /// A window `start..end` into a string or array value.
    Slice {
        of: &'a Value,
        start: usize,
        end: usize,
    },
}

/// Why a path failed to resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DanglingReason {
    UnknownFrame,
    UnknownLocal,
    UnknownHeap,
    FieldOutOfRange,
    IndexOutOfRange,
    /// The element exists but was elided in transport.
    Elided,
    /// The projection does not apply to this kind of value.
    NotIndexable,
}

impl fmt::Display for DanglingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DanglingReason::UnknownFrame => "no such stack frame",
            DanglingReason::UnknownLocal => "no such local",
            DanglingReason::UnknownHeap => "no such heap allocation",
            DanglingReason::FieldOutOfRange => "field out of range",
            DanglingReason::IndexOutOfRange => "index out of range",
            DanglingReason::Elided => "element was elided",
            DanglingReason::NotIndexable => "value cannot be projected",
        })
    }
}

/// Resolution failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("dangling reference {path}: {reason}")]
    Dangling { path: Path, reason: DanglingReason },
}

impl ResolveError {
    pub fn path(&self) -> &Path {
        match self {
            ResolveError::Dangling { path, .. } => path,
        }
    }

    pub fn reason(&self) -> DanglingReason {
        match self {
            ResolveError::Dangling { reason, .. } => *reason,
        }
    }
}

/// Resolve `path` inside `snapshot`.
pub fn resolve<'a, S: Snapshot + ?Sized>(snapshot: &'a S, path: &Path) -> Result<Target<'a>, ResolveError> {
    let dangling = |reason| ResolveError::Dangling {
        path: path.clone(),
        reason,
    };

    let root = match &path.segment {
        PathRoot::Stack { frame, local } => {
            if *frame >= snapshot.frame_count() {
                return Err(dangling(DanglingReason::UnknownFrame));
            }
            snapshot
                .local(*frame, local)
                .ok_or_else(|| dangling(DanglingReason::UnknownLocal))?
        }
        PathRoot::Heap { index } => snapshot
            .heap(*index)
            .ok_or_else(|| dangling(DanglingReason::UnknownHeap))?,
    };

    let mut target = Target::Value(root);
    for part in &path.parts {
        target = project(target, *part).map_err(dangling)?;
    }
    Ok(target)
}

fn project(target: Target<'_>, part: PathPart) -> Result<Target<'_>, DanglingReason> {
    match (target, part) {
        (Target::Value(value), PathPart::Field(n)) => {
            let fields = value.fields().ok_or(DanglingReason::NotIndexable)?;
            fields
                .get(n)
                .map(|(_, field)| Target::Value(field))
                .ok_or(DanglingReason::FieldOutOfRange)
        }
        (Target::Value(value), PathPart::Index(n)) => index_into(value, n, 0, None),
        (Target::Slice { of, start, end }, PathPart::Index(n)) => index_into(of, n, start, Some(end)),
        (Target::Value(value), PathPart::Subslice(lo, hi)) => subslice(value, lo, hi, 0, None),
        (Target::Slice { of, start, end }, PathPart::Subslice(lo, hi)) => {
            subslice(of, lo, hi, start, Some(end))
        }
        (Target::Slice { .. } | Target::CodeUnit(_), PathPart::Field(_))
        | (Target::CodeUnit(_), PathPart::Index(_) | PathPart::Subslice(..)) => {
            Err(DanglingReason::NotIndexable)
        }
    }
}

/// Length of a string or array value.
fn sequence_len(value: &Value) -> Option<usize> {
    match value {
        Value::String(units) => Some(units.len()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Element `n` of the window `offset..end` (or `offset..` when `end` is `None`).
fn index_into(value: &Value, n: usize, offset: usize, end: Option<usize>) -> Result<Target<'_>, DanglingReason> {
    let len = sequence_len(value).ok_or(DanglingReason::NotIndexable)?;
    let index = offset.checked_add(n).ok_or(DanglingReason::IndexOutOfRange)?;
    if index >= end.unwrap_or(len).min(len) {
        return Err(DanglingReason::IndexOutOfRange);
    }
    match value {
        Value::String(units) => included(units, index).map(|unit| Target::CodeUnit(*unit)),
        Value::Array(items) => included(items, index).map(Target::Value),
        _ => Err(DanglingReason::NotIndexable),
    }
}

fn subslice(
    value: &Value,
    lo: usize,
    hi: usize,
    offset: usize,
    end: Option<usize>,
) -> Result<Target<'_>, DanglingReason> {
    let len = sequence_len(value).ok_or(DanglingReason::NotIndexable)?;
    let limit = end.unwrap_or(len).min(len);
    let start = offset.checked_add(lo).ok_or(DanglingReason::IndexOutOfRange)?;
    let stop = offset.checked_add(hi).ok_or(DanglingReason::IndexOutOfRange)?;
    if start > stop || stop > limit {
        return Err(DanglingReason::IndexOutOfRange);
    }
    Ok(Target::Slice {
        of: value,
        start,
        end: stop,
    })
}

fn included<T>(seq: &Abbreviated<T>, index: usize) -> Result<&T, DanglingReason> {
    seq.get(index).ok_or(DanglingReason::Elided)
}

#[cfg(test)]
mod tests;
