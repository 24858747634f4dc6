//! Extraction of existing codes from a document body.

use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::instrument;

use super::content_control::strip_markers;
use crate::host::{Document, HostError};

/// The search pattern for code-shaped text.
///
/// This is looser than [`Code`](super::Code): any three digits,
/// a dash, and three digits. No word boundaries are required, so `1234-5678`
/// contains the match `234-567`.
pub const PATTERN: &str = "[0-9]{3}-[0-9]{3}";

static CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PATTERN).expect("pattern is a valid regex"));

/// The document body could not be read, so no codes were extracted.
#[derive(Debug, thiserror::Error)]
#[error("could not read the document corpus")]
pub struct CorpusReadError(#[from] pub HostError);

/// The set of code-shaped strings found in a document.
pub type ExistingCodes = BTreeSet<String>;

/// Collects every non-overlapping match of [`PATTERN`] in `text`.
///
/// Content-control markers are removed first, so the ids they carry never
/// count as codes.
#[must_use]
pub fn scan_text(text: &str) -> ExistingCodes {
    let content = strip_markers(text);
    CODE_PATTERN
        .find_iter(&content)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Scans the full body of `document` for existing codes.
///
/// The result is a snapshot: codes added after this call returns are not
/// reflected.
///
/// # Errors
///
/// Returns a [`CorpusReadError`] if the host cannot provide the body text.
#[instrument(level = "debug", skip(document))]
pub fn scan_corpus<D: Document + ?Sized>(document: &D) -> Result<ExistingCodes, CorpusReadError> {
    let text = document.body_text()?;
    let codes = scan_text(&text);
    tracing::debug!(found = codes.len(), "scanned corpus");
    Ok(codes)
}

/// Calculates the fingerprint of a set of existing codes.
///
/// The fingerprint is a SHA256 hash over the sorted codes. It is used to
/// notice when the corpus changed between generating and inserting a code.
#[must_use]
pub fn fingerprint(codes: &ExistingCodes) -> String {
    let mut hasher = Sha256::new();
    for code in codes {
        hasher.update(code.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
