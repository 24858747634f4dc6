//! The boundary towards the document host.
//!
//! The core never touches document storage directly. Everything it needs
//! from a host is expressed by the [`Document`] trait: reading the full body
//! text, reading and writing the formatting of a range, and replacing a range
//! with new text.

use std::{borrow::Cow, fmt, ops::Range};

use serde::{Deserialize, Serialize};

mod styled;
pub use styled::StyledDocument;

/// A byte range in the body of a document.
///
/// A caret is an empty selection (`start == end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    start: usize,
    end: usize,
}

impl Selection {
    /// Creates a selection spanning `start..end`.
    ///
    /// The bounds are swapped if `start > end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Creates an empty selection at `offset`.
    #[must_use]
    pub const fn caret(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns the start offset.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Returns the end offset (exclusive).
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Returns the length of the selection in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if this is a caret.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the selection as a `Range`.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Checks that the selection lies within `text` and on character
    /// boundaries.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidSelection`] otherwise.
    pub fn validate(&self, text: &str) -> Result<(), HostError> {
        if self.end > text.len()
            || !text.is_char_boundary(self.start)
            || !text.is_char_boundary(self.end)
        {
            return Err(HostError::InvalidSelection {
                selection: *self,
                len: text.len(),
            });
        }
        Ok(())
    }
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Text formatting attributes of a range.
///
/// Each attribute is optional: `None` means the host does not track it, or
/// the range carries mixed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formatting {
    /// Font family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,

    /// Font size in points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,

    /// Font color, e.g. `#1F1F1F`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Formatting {
    /// Returns `true` if no attribute is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.font_name.is_none() && self.size.is_none() && self.color.is_none()
    }
}

/// Errors reported by a document host.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The document body could not be read.
    #[error("failed to read document: {0}")]
    Read(#[source] std::io::Error),

    /// The document could not be written back.
    #[error("failed to write document: {0}")]
    Write(#[source] std::io::Error),

    /// The selection does not address a valid range of the body.
    #[error("invalid selection {selection} for a document of {len} bytes")]
    InvalidSelection {
        /// The rejected selection.
        selection: Selection,
        /// The length of the document body.
        len: usize,
    },

    /// The host does not support the requested formatting.
    #[error("formatting not supported: {0}")]
    Unsupported(String),
}

/// A host document the core can search and edit.
pub trait Document {
    /// Returns the full body text.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Read`] if the body cannot be read.
    fn body_text(&self) -> Result<Cow<'_, str>, HostError>;

    /// Returns the formatting at `selection`.
    ///
    /// For a caret this is the formatting new text would inherit.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is invalid.
    fn formatting_at(&self, selection: Selection) -> Result<Formatting, HostError>;

    /// Replaces the content of `selection` with `text`, returning the range
    /// of the inserted text.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is invalid or the host rejects the
    /// mutation.
    fn replace(&mut self, selection: Selection, text: &str) -> Result<Selection, HostError>;

    /// Applies `formatting` to exactly the given range.
    ///
    /// # Errors
    ///
    /// Returns an error if the selection is invalid or the host cannot apply
    /// the formatting.
    fn set_formatting(
        &mut self,
        selection: Selection,
        formatting: &Formatting,
    ) -> Result<(), HostError>;
}
