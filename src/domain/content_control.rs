//! Content controls: tagged spans of a document body.
//!
//! A control wraps a span in a pair of markers carrying the same id:
//!
//! ```text
//! <!--cc:1b4e28ba-2fa1-11d2-883f-0016d3cca427-->tagged text<!--/cc:1b4e28ba-2fa1-11d2-883f-0016d3cca427-->
//! ```
//!
//! The markers are HTML comments so they stay invisible in rendered
//! markdown.

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;
use uuid::Uuid;

use crate::host::Selection;

static OPEN_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--cc:([0-9a-fA-F]{8}(?:-[0-9a-fA-F]{4}){3}-[0-9a-fA-F]{12})-->")
        .expect("marker pattern is a valid regex")
});

static ANY_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--/?cc:[0-9a-fA-F]{8}(?:-[0-9a-fA-F]{4}){3}-[0-9a-fA-F]{12}-->")
        .expect("marker pattern is a valid regex")
});

/// Returns the opening marker for `id`.
#[must_use]
pub fn open_marker(id: Uuid) -> String {
    format!("<!--cc:{}-->", id.hyphenated())
}

/// Returns the closing marker for `id`.
#[must_use]
pub fn close_marker(id: Uuid) -> String {
    format!("<!--/cc:{}-->", id.hyphenated())
}

/// Returns `text` with every opening and closing marker removed.
///
/// Markers are not document content; the result is the text a reader sees.
#[must_use]
pub fn strip_markers(text: &str) -> Cow<'_, str> {
    ANY_MARKER.replace_all(text, "")
}

/// A content control located in a document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentControl {
    /// The control's identifier.
    pub id: Uuid,
    /// The span including both markers.
    pub outer: Selection,
    /// The tagged span between the markers.
    pub inner: Selection,
}

impl ContentControl {
    /// Returns `true` if `selection` shares any byte with this control.
    #[must_use]
    pub const fn intersects(&self, selection: Selection) -> bool {
        selection.start() < self.outer.end() && selection.end() > self.outer.start()
    }

    /// Returns `true` if `offset` lies inside the control.
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        offset >= self.outer.start() && offset < self.outer.end()
    }
}

/// Finds every well-formed content control in `text`, in document order.
///
/// An opening marker without a matching closing marker is skipped.
#[must_use]
pub fn find_controls(text: &str) -> Vec<ContentControl> {
    let mut controls = Vec::new();
    let mut search_from = 0;

    while let Some(captures) = OPEN_MARKER.captures_at(text, search_from) {
        let open = captures.get(0).expect("group 0 always matches");
        search_from = open.end();

        let Ok(id) = Uuid::parse_str(&captures[1]) else {
            continue;
        };
        let close = close_marker(id);
        let Some(close_start) = text[open.end()..].find(&close).map(|i| i + open.end()) else {
            tracing::debug!(%id, "content control has no closing marker");
            continue;
        };
        let close_end = close_start + close.len();

        controls.push(ContentControl {
            id,
            outer: Selection::new(open.start(), close_end),
            inner: Selection::new(open.end(), close_start),
        });
        search_from = close_end;
    }

    controls
}
