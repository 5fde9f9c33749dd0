//! Runtime values reported by the interpreter.
//!
//! A [`Value`] describes one piece of program state at one step. Values form
//! a tree; sharing and cycles are expressed only through [`Value::Pointer`],
//! whose [`Path`] is resolved against the owning snapshot (see
//! [`crate::resolve`]) instead of being followed as a native reference.
//!
//! # Construction
//!
//! Tests and tools build values with the factory methods:
//!
//! ```text
//! let s = Value::string("hi");
//! let v = Value::list(vec![Value::uint(1u32), Value::uint(2u32)]);
//! let p = Value::pointer(Path::heap(0));
//! ```

use lens_ir::ensure_sufficient_stack;
use num_bigint::{BigInt, BigUint};
use serde::{Deserialize, Serialize};

use crate::{Abbreviated, Path};

/// One runtime value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Bool(bool),
    Char(char),
    /// Unsigned integer of any width.
    Uint(#[serde(with = "crate::wire::unsigned")] BigUint),
    /// Signed integer of any width.
    Int(#[serde(with = "crate::wire::signed")] BigInt),
    Float(#[serde(with = "crate::wire::float")] f64),
    /// Reference to another value in the same snapshot.
    Pointer(Path),
    /// Struct with fields in declaration order.
    Struct {
        name: String,
        fields: Vec<(String, Value)>,
    },
    /// Enum value; only the active variant's fields are present.
    Enum {
        name: String,
        variant: String,
        fields: Vec<(String, Value)>,
    },
    /// Text as code units.
    String(Abbreviated<u32>),
    Array(Abbreviated<Value>),
    /// Memory that exists but holds nothing meaningful (freed, uninitialized).
    Unallocated,
}

impl Value {
    #[inline]
    pub fn uint(n: impl Into<BigUint>) -> Self {
        Value::Uint(n.into())
    }

    #[inline]
    pub fn int(n: impl Into<BigInt>) -> Self {
        Value::Int(n.into())
    }

    #[inline]
    pub fn pointer(path: Path) -> Self {
        Value::Pointer(path)
    }

    /// A complete string, one code unit per character.
    pub fn string(s: &str) -> Self {
        Value::String(Abbreviated::all(s.chars().map(u32::from).collect()))
    }

    /// A complete array.
    pub fn list(items: Vec<Value>) -> Self {
        Value::Array(Abbreviated::all(items))
    }

    /// A struct from `(field, value)` pairs, order preserved.
    pub fn record<N: Into<String>>(name: impl Into<String>, fields: Vec<(N, Value)>) -> Self {
        Value::Struct {
            name: name.into(),
            fields: fields.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// An enum value of `variant` with the given fields.
    pub fn variant<N: Into<String>>(
        name: impl Into<String>,
        variant: impl Into<String>,
        fields: Vec<(N, Value)>,
    ) -> Self {
        Value::Enum {
            name: name.into(),
            variant: variant.into(),
            fields: fields.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Char(_) => "Char",
            Value::Uint(_) => "Uint",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Pointer(_) => "Pointer",
            Value::Struct { .. } => "Struct",
            Value::Enum { .. } => "Enum",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Unallocated => "Unallocated",
        }
    }

    /// Ordered fields of a struct or enum value.
    pub fn fields(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Struct { fields, .. } | Value::Enum { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Every pointer path reachable inside this value, in pre-order.
    pub fn pointers(&self) -> Vec<&Path> {
        let mut out = Vec::new();
        collect_pointers(self, &mut out);
        out
    }
}

fn collect_pointers<'a>(value: &'a Value, out: &mut Vec<&'a Path>) {
    ensure_sufficient_stack(|| match value {
        Value::Pointer(path) => out.push(path),
        Value::Struct { fields, .. } | Value::Enum { fields, .. } => {
            for (_, field) in fields {
                collect_pointers(field, out);
            }
        }
        Value::Array(items) => {
            for (_, item) in items.iter_included() {
                collect_pointers(item, out);
            }
        }
        Value::Bool(_)
        | Value::Char(_)
        | Value::Uint(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::String(_)
        | Value::Unallocated => {}
    });
}
