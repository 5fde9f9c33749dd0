//! Paths into a snapshot.
//!
//! A [`Path`] names a location inside one snapshot: a root (a local in some
//! stack frame, or a heap allocation) followed by projections into fields,
//! indices or subslices. Paths are compared structurally, so two pointers
//! holding equal paths alias the same memory.
//!
//! Outside this crate a path is opaque: it can be built, compared, hashed,
//! displayed and handed to [`crate::resolve`], but its parts are not exposed.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Where a path starts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub(crate) enum PathRoot {
    Stack { frame: usize, local: String },
    Heap { index: usize },
}

/// One projection step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub(crate) enum PathPart {
    /// The n-th field of a struct or enum variant.
    Field(usize),
    /// The n-th element of an array or code unit of a string.
    Index(usize),
    /// Elements `start..end` of an array or string.
    Subslice(usize, usize),
}

/// Opaque route to a value inside a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    pub(crate) segment: PathRoot,
    pub(crate) parts: SmallVec<[PathPart; 4]>,
}

impl Path {
    /// Path to local `local` in stack frame `frame` (0 = outermost).
    pub fn stack(frame: usize, local: impl Into<String>) -> Self {
        Path {
            segment: PathRoot::Stack {
                frame,
                local: local.into(),
            },
            parts: SmallVec::new(),
        }
    }

    /// Path to heap allocation `index`.
    pub fn heap(index: usize) -> Self {
        Path {
            segment: PathRoot::Heap { index },
            parts: SmallVec::new(),
        }
    }

    /// Project into the `n`-th field.
    #[must_use]
    pub fn field(mut self, n: usize) -> Self {
        self.parts.push(PathPart::Field(n));
        self
    }

    /// Project into element `n`.
    #[must_use]
    pub fn index(mut self, n: usize) -> Self {
        self.parts.push(PathPart::Index(n));
        self
    }

    /// Project into elements `start..end`.
    #[must_use]
    pub fn subslice(mut self, start: usize, end: usize) -> Self {
        self.parts.push(PathPart::Subslice(start, end));
        self
    }

    /// Whether the path starts at a heap allocation.
    pub fn is_heap(&self) -> bool {
        matches!(self.segment, PathRoot::Heap { .. })
    }

    /// Whether `self` is `other` or a projection of it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.segment == other.segment && self.parts.starts_with(&other.parts)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.segment {
            PathRoot::Stack { frame, local } => write!(f, "{local}@{frame}")?,
            PathRoot::Heap { index } => write!(f, "heap#{index}")?,
        }
        for part in &self.parts {
            match part {
                PathPart::Field(n) => write!(f, ".{n}")?,
                PathPart::Index(n) => write!(f, "[{n}]")?,
                PathPart::Subslice(start, end) => write!(f, "[{start}..{end}]")?,
            }
        }
        Ok(())
    }
}
