//! Abbreviated sequences.
//!
//! Large strings and arrays are truncated by the backend before transport.
//! An [`Abbreviated`] keeps the included prefix, optionally the final element,
//! and the true length of the original sequence.
//!
//! # Invariants
//!
//! - `included_len() <= len()` always holds
//! - `included_len() == len()` implies `!is_elided()` and `last()` is `None`
//!   (a complete sequence is stored entirely in the prefix)
//!
//! # Wire Format
//!
//! ```text
//! {"type": "All",  "value": [a, b, c]}
//! {"type": "Only", "value": {"prefix": [a, b], "last": z, "len": 26}}
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error when abbreviation parts describe an impossible sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("abbreviated sequence claims length {len} but includes {included} elements")]
pub struct AbbreviatedError {
    pub included: usize,
    pub len: usize,
}

/// A possibly-truncated ordered sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Abbreviated<T> {
    prefix: Vec<T>,
    last: Option<Box<T>>,
    len: usize,
}

impl<T> Abbreviated<T> {
    /// A complete, non-elided sequence.
    pub fn all(items: Vec<T>) -> Self {
        let len = items.len();
        Abbreviated {
            prefix: items,
            last: None,
            len,
        }
    }

    /// Keep the first `limit` items and the final item of `items`.
    ///
    /// Sequences short enough to be kept whole are not elided.
    pub fn truncate(mut items: Vec<T>, limit: usize) -> Self {
        if items.len() <= limit.saturating_add(1) {
            return Abbreviated::all(items);
        }
        let len = items.len();
        let last = items.pop().map(Box::new);
        items.truncate(limit);
        Abbreviated {
            prefix: items,
            last,
            len,
        }
    }

    /// Build from raw parts, normalizing a complete sequence to [`Abbreviated::all`].
    pub fn from_parts(mut prefix: Vec<T>, last: Option<T>, len: usize) -> Result<Self, AbbreviatedError> {
        let included = prefix.len() + usize::from(last.is_some());
        if included > len {
            return Err(AbbreviatedError { included, len });
        }
        if included == len {
            prefix.extend(last);
            return Ok(Abbreviated::all(prefix));
        }
        Ok(Abbreviated {
            prefix,
            last: last.map(Box::new),
            len,
        })
    }

    /// True length of the original sequence.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements actually present.
    #[inline]
    pub fn included_len(&self) -> usize {
        self.prefix.len() + usize::from(self.last.is_some())
    }

    /// Whether some elements were dropped in transport.
    #[inline]
    pub fn is_elided(&self) -> bool {
        self.included_len() < self.len
    }

    /// Number of elements that were dropped.
    #[inline]
    pub fn elided_len(&self) -> usize {
        self.len - self.included_len()
    }

    /// The leading included elements.
    pub fn prefix(&self) -> &[T] {
        &self.prefix
    }

    /// The final element, when the sequence is elided and the backend kept it.
    pub fn last(&self) -> Option<&T> {
        self.last.as_deref()
    }

    /// Element at `index` of the original sequence, if it was included.
    pub fn get(&self, index: usize) -> Option<&T> {
        if let Some(item) = self.prefix.get(index) {
            return Some(item);
        }
        match self.last.as_deref() {
            Some(last) if index.checked_add(1) == Some(self.len) => Some(last),
            _ => None,
        }
    }

    /// Included elements paired with their index in the original sequence.
    pub fn iter_included(&self) -> impl Iterator<Item = (usize, &T)> {
        let last_index = self.len.saturating_sub(1);
        self.prefix
            .iter()
            .enumerate()
            .chain(self.last.as_deref().map(move |last| (last_index, last)))
    }

    /// Convert every included element, keeping the shape.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Abbreviated<U> {
        Abbreviated {
            prefix: self.prefix.iter().map(&mut f).collect(),
            last: self.last.as_deref().map(f).map(Box::new),
            len: self.len,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", content = "value")]
enum WireRef<'a, T> {
    All(&'a [T]),
    Only {
        prefix: &'a [T],
        last: Option<&'a T>,
        len: usize,
    },
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "value")]
enum Wire<T> {
    All(Vec<T>),
    Only {
        prefix: Vec<T>,
        last: Option<T>,
        len: usize,
    },
}

impl<T: Serialize> Serialize for Abbreviated<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = if self.is_elided() {
            WireRef::Only {
                prefix: &self.prefix,
                last: self.last.as_deref(),
                len: self.len,
            }
        } else {
            WireRef::All(&self.prefix)
        };
        wire.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Abbreviated<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Wire::<T>::deserialize(deserializer)? {
            Wire::All(items) => Ok(Abbreviated::all(items)),
            Wire::Only { prefix, last, len } => {
                Abbreviated::from_parts(prefix, last, len).map_err(serde::de::Error::custom)
            }
        }
    }
}

#[cfg(test)]
mod tests;
