//! Document identity.
//!
//! A [`Fingerprint`] is taken when an analysis is requested and compared
//! against the live document before the result is applied. Either a revision
//! bump or a content change makes the result stale.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Monotonic document revision. Every applied edit bumps it by one.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Revision(u64);

impl Revision {
    /// The revision of a freshly created document.
    pub const INITIAL: Revision = Revision(0);

    #[inline]
    pub const fn new(raw: u64) -> Self {
        Revision(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The revision following this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Revision {
        Revision(self.0 + 1)
    }
}

impl fmt::Debug for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Revision plus content hash of a document at one point in time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Fingerprint {
    pub revision: Revision,
    pub hash: u64,
}

impl Fingerprint {
    /// Fingerprint `text` as it exists at `revision`.
    pub fn of(revision: Revision, text: &str) -> Self {
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        Fingerprint {
            revision,
            hash: hasher.finish(),
        }
    }

    /// Check whether `self` (taken at request time) still describes `current`.
    #[inline]
    pub fn matches(&self, current: &Fingerprint) -> bool {
        self == current
    }
}

#[cfg(test)]
mod tests;
