//! A plain-text file acting as a document host.

use std::{
    borrow::Cow,
    fs, io,
    path::{Path, PathBuf},
};

use crate::host::{Document, Formatting, HostError, Selection};

/// A UTF-8 text file loaded into memory.
///
/// Edits are applied to the in-memory copy; [`TextFile::save`] writes them
/// back. Plain text carries no formatting, so reads return
/// [`Formatting::default`] and only empty formatting can be applied.
#[derive(Debug, Clone)]
pub struct TextFile {
    path: PathBuf,
    text: String,
    dirty: bool,
}

impl TextFile {
    /// Reads the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Read`] if the file cannot be read or is not valid
    /// UTF-8.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HostError> {
        let path = path.into();
        let text = fs::read_to_string(&path).map_err(HostError::Read)?;
        Ok(Self {
            path,
            text,
            dirty: false,
        })
    }

    /// Returns the path the file was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current text, including unsaved edits.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` if there are unsaved edits.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Writes unsaved edits back to disk.
    ///
    /// Does nothing if the file is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Write`] if the file cannot be written.
    pub fn save(&mut self) -> Result<(), HostError> {
        if !self.dirty {
            return Ok(());
        }
        fs::write(&self.path, &self.text).map_err(HostError::Write)?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "saved document");
        Ok(())
    }
}

impl Document for TextFile {
    fn body_text(&self) -> Result<Cow<'_, str>, HostError> {
        Ok(Cow::Borrowed(&self.text))
    }

    fn formatting_at(&self, selection: Selection) -> Result<Formatting, HostError> {
        selection.validate(&self.text)?;
        Ok(Formatting::default())
    }

    fn replace(&mut self, selection: Selection, text: &str) -> Result<Selection, HostError> {
        selection.validate(&self.text)?;
        self.text.replace_range(selection.range(), text);
        self.dirty = true;
        Ok(Selection::new(
            selection.start(),
            selection.start() + text.len(),
        ))
    }

    fn set_formatting(
        &mut self,
        selection: Selection,
        formatting: &Formatting,
    ) -> Result<(), HostError> {
        selection.validate(&self.text)?;
        if formatting.is_empty() {
            Ok(())
        } else {
            Err(HostError::Unsupported(
                "plain-text documents carry no formatting".to_string(),
            ))
        }
    }
}

/// Returns `true` if the error means the file does not exist.
#[must_use]
pub fn is_not_found(error: &HostError) -> bool {
    matches!(error, HostError::Read(e) if e.kind() == io::ErrorKind::NotFound)
}
