//! In-memory document with an edit log.
//!
//! # Design
//!
//! Every edit bumps the revision and is appended to a bounded log. The log is
//! what lets [`TextDocument`] act as a [`PositionMap`]: a range taken at an
//! older revision is replayed through every later edit, shifting past edits
//! that happened before it and failing on edits that touched it.
//!
//! Offsets are character offsets throughout.

use std::collections::VecDeque;
use std::sync::Arc;

use lens_ir::{CharRange, Fingerprint, Revision};
use lens_overlay::PositionMap;
use parking_lot::Mutex;

use crate::DocumentHost;

/// Edits older than this many revisions can no longer be mapped.
const MAX_LOGGED_EDITS: usize = 1024;

/// A text edit in character offsets.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TextEdit {
    /// The range to replace (empty range for insert).
    pub range: CharRange,
    /// The new text.
    pub new_text: String,
}

impl TextEdit {
    pub fn replace(range: CharRange, new_text: impl Into<String>) -> Self {
        TextEdit {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        TextEdit {
            range: CharRange::point(at),
            new_text: text.into(),
        }
    }

    pub fn delete(range: CharRange) -> Self {
        TextEdit {
            range,
            new_text: String::new(),
        }
    }

    /// Check if this edit is an insertion.
    pub fn is_insert(&self) -> bool {
        self.range.is_empty() && !self.new_text.is_empty()
    }

    /// Characters added minus characters removed.
    pub fn length_delta(&self) -> isize {
        let removed = isize::try_from(self.range.len()).unwrap_or(isize::MAX);
        let added = isize::try_from(self.new_text.chars().count()).unwrap_or(isize::MAX);
        added - removed
    }

    /// Where `range` lies after this edit, or `None` if the edit touched it.
    fn map(&self, range: CharRange) -> Option<CharRange> {
        if range.overlaps(self.range) {
            return None;
        }
        if self.range.char_end <= range.char_start {
            return Some(range.shifted(self.length_delta()));
        }
        Some(range)
    }
}

/// Error from applying an edit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("edit {range} is outside a document of {len} characters")]
    OutOfBounds { range: CharRange, len: usize },
}

/// A document owned by the editor widget.
#[derive(Clone, Debug)]
pub struct TextDocument {
    text: String,
    char_len: usize,
    revision: Revision,
    /// `(revision produced, edit)`, oldest first.
    log: VecDeque<(Revision, TextEdit)>,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        TextDocument {
            char_len: text.chars().count(),
            text,
            revision: Revision::INITIAL,
            log: VecDeque::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_len(&self) -> usize {
        self.char_len
    }

    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self.revision, &self.text)
    }

    /// Apply `edit`, returning the new revision.
    pub fn apply(&mut self, edit: TextEdit) -> Result<Revision, DocumentError> {
        if !edit.range.fits_within(self.char_len) {
            return Err(DocumentError::OutOfBounds {
                range: edit.range,
                len: self.char_len,
            });
        }
        let start = self.byte_offset(edit.range.char_start);
        let end = self.byte_offset(edit.range.char_end);
        self.text.replace_range(start..end, &edit.new_text);
        self.char_len = self.char_len - edit.range.len() + edit.new_text.chars().count();

        self.revision = self.revision.next();
        if self.log.len() == MAX_LOGGED_EDITS {
            self.log.pop_front();
        }
        self.log.push_back((self.revision, edit));
        Ok(self.revision)
    }

    pub fn replace(&mut self, range: CharRange, text: impl Into<String>) -> Result<Revision, DocumentError> {
        self.apply(TextEdit::replace(range, text))
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) -> Result<Revision, DocumentError> {
        self.apply(TextEdit::insert(at, text))
    }

    pub fn delete(&mut self, range: CharRange) -> Result<Revision, DocumentError> {
        self.apply(TextEdit::delete(range))
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(byte, _)| byte)
    }
}

impl PositionMap for TextDocument {
    fn revision(&self) -> Revision {
        self.revision
    }

    fn map_range(&self, range: CharRange, since: Revision) -> Option<CharRange> {
        if since > self.revision {
            return None;
        }
        // The first edit after `since` must still be in the log.
        if since < self.revision {
            let oldest = self.log.front()?.0;
            if since.next() < oldest {
                return None;
            }
        }
        self.log
            .iter()
            .filter(|(rev, _)| *rev > since)
            .try_fold(range, |range, (_, edit)| edit.map(range))
    }
}

/// A [`TextDocument`] shared between the widget and the orchestrator.
#[derive(Clone, Debug)]
pub struct SharedDocument {
    inner: Arc<Mutex<TextDocument>>,
}

impl SharedDocument {
    pub fn new(document: TextDocument) -> Self {
        SharedDocument {
            inner: Arc::new(Mutex::new(document)),
        }
    }

    /// Run `f` with the document locked for editing.
    pub fn edit<R>(&self, f: impl FnOnce(&mut TextDocument) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl PositionMap for SharedDocument {
    fn revision(&self) -> Revision {
        self.inner.lock().revision()
    }

    fn map_range(&self, range: CharRange, since: Revision) -> Option<CharRange> {
        self.inner.lock().map_range(range, since)
    }
}

impl DocumentHost for SharedDocument {
    fn text(&self) -> String {
        self.inner.lock().text().to_string()
    }

    fn fingerprint(&self) -> Fingerprint {
        self.inner.lock().fingerprint()
    }

    fn char_len(&self) -> usize {
        self.inner.lock().char_len()
    }
}
