//! Metadata records attached to spans of a document.
//!
//! Records live in document-level [`Settings`] keyed by the id of the
//! content control that marks their span in the body.

use std::{collections::BTreeMap, fmt, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::content_control::{close_marker, find_controls, open_marker, ContentControl};
use crate::host::{Document, HostError, Selection};

/// The kind of content a record describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// A span of text.
    #[default]
    Text,
    /// An inline image.
    Image,
    /// A table cell.
    TableCell,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::TableCell => "table cell",
        };
        f.write_str(name)
    }
}

/// A small metadata record for one span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// The kind of content the record is attached to.
    #[serde(default)]
    pub target: Target,

    /// A link associated with the span.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Free-form references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,

    /// Alternative tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_tags: Vec<String>,

    /// Notes on the functionality the span describes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functionality: Option<String>,

    /// When the record was last written.
    pub updated: DateTime<Utc>,
}

impl MetadataRecord {
    /// Creates an empty record for the given target.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            link: None,
            references: Vec::new(),
            alt_tags: Vec::new(),
            functionality: None,
            updated: Utc::now(),
        }
    }

    /// Returns `true` if the record carries no information besides its
    /// target.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.link.is_none()
            && self.references.is_empty()
            && self.alt_tags.is_empty()
            && self.functionality.is_none()
    }
}

/// Document-level settings holding metadata records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Settings {
    records: BTreeMap<Uuid, MetadataRecord>,
}

impl Settings {
    /// Loads settings from a JSON file.
    ///
    /// A missing file yields empty settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file: {e}"))?;
        serde_json::from_str(&content).map_err(|e| format!("Failed to parse settings file: {e}"))
    }

    /// Saves settings to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write settings file: {e}"))
    }

    /// Returns the record with the given id.
    #[must_use]
    pub fn get(&self, id: &Uuid) -> Option<&MetadataRecord> {
        self.records.get(id)
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over stored records by id.
    pub fn iter(&self) -> impl Iterator<Item = (&Uuid, &MetadataRecord)> {
        self.records.iter()
    }
}

/// Errors from metadata operations.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// Metadata can only be attached to a non-empty span.
    #[error("select some content before attaching metadata")]
    EmptySelection,

    /// The selection overlaps a span that already carries metadata.
    #[error("selection {selection} overlaps existing content control {id}")]
    Overlap {
        /// The rejected selection.
        selection: Selection,
        /// The control it overlaps.
        id: Uuid,
    },

    /// No content control with this id exists in the document.
    #[error("no content control with id {0}")]
    NotFound(Uuid),

    /// The host failed to read or edit the document.
    #[error(transparent)]
    Host(#[from] HostError),
}

/// A content control together with its record, if the settings have one.
#[derive(Debug, Clone, Copy)]
pub struct Attached<'a> {
    /// The control in the document body.
    pub control: ContentControl,
    /// The stored record; `None` for an orphaned control.
    pub record: Option<&'a MetadataRecord>,
}

/// Wraps `selection` in a new content control and stores `record` for it.
///
/// # Errors
///
/// Fails if the selection is empty, overlaps an existing control, or the
/// host rejects the edit.
#[instrument(level = "debug", skip(document, settings, record))]
pub fn attach<D: Document + ?Sized>(
    document: &mut D,
    settings: &mut Settings,
    selection: Selection,
    mut record: MetadataRecord,
) -> Result<Uuid, MetadataError> {
    if selection.is_empty() {
        return Err(MetadataError::EmptySelection);
    }

    {
        let text = document.body_text()?;
        selection.validate(&text)?;
        if let Some(existing) = find_controls(&text)
            .into_iter()
            .find(|control| control.intersects(selection))
        {
            return Err(MetadataError::Overlap {
                selection,
                id: existing.id,
            });
        }
    }

    let id = Uuid::new_v4();
    // Close first so the start offset stays valid
    document.replace(Selection::caret(selection.end()), &close_marker(id))?;
    document.replace(Selection::caret(selection.start()), &open_marker(id))?;

    record.updated = Utc::now();
    settings.records.insert(id, record);
    tracing::debug!(%id, "attached metadata");
    Ok(id)
}

/// Finds the content control at `offset` and its record.
///
/// # Errors
///
/// Fails if the document cannot be read.
pub fn load<'s, D: Document + ?Sized>(
    document: &D,
    settings: &'s Settings,
    offset: usize,
) -> Result<Option<Attached<'s>>, MetadataError> {
    let text = document.body_text()?;
    Ok(find_controls(&text)
        .into_iter()
        .find(|control| control.contains(offset))
        .map(|control| Attached {
            control,
            record: settings.get(&control.id),
        }))
}

/// Lists every content control in the document with its record.
///
/// # Errors
///
/// Fails if the document cannot be read.
pub fn list<'s, D: Document + ?Sized>(
    document: &D,
    settings: &'s Settings,
) -> Result<Vec<Attached<'s>>, MetadataError> {
    let text = document.body_text()?;
    Ok(find_controls(&text)
        .into_iter()
        .map(|control| Attached {
            control,
            record: settings.get(&control.id),
        })
        .collect())
}

/// Removes the content control `id`, keeping the span it wrapped, and
/// deletes its record.
///
/// # Errors
///
/// Fails with [`MetadataError::NotFound`] if the document has no such
/// control, or if the host rejects the edit.
#[instrument(level = "debug", skip(document, settings))]
pub fn clear<D: Document + ?Sized>(
    document: &mut D,
    settings: &mut Settings,
    id: Uuid,
) -> Result<Option<MetadataRecord>, MetadataError> {
    let control = find_controls(&document.body_text()?)
        .into_iter()
        .find(|control| control.id == id)
        .ok_or(MetadataError::NotFound(id))?;

    document.replace(Selection::new(control.inner.end(), control.outer.end()), "")?;
    document.replace(Selection::new(control.outer.start(), control.inner.start()), "")?;

    let record = settings.records.remove(&id);
    if record.is_none() {
        tracing::warn!(%id, "cleared content control had no stored record");
    }
    Ok(record)
}

/// The serialized versions of the settings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        records: BTreeMap<Uuid, MetadataRecord>,
    },
}

impl From<Versions> for Settings {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { records } => Self { records },
        }
    }
}

impl From<Settings> for Versions {
    fn from(settings: Settings) -> Self {
        Self::V1 {
            records: settings.records,
        }
    }
}
