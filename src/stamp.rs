//! The caller-facing code workflow.
//!
//! A [`Stamper`] ties the generator to a host [`Document`] and a caller-owned
//! [`Session`]:
//!
//! 1. [`Stamper::request_unique_code`] scans the document and leaves a fresh
//!    code pending in the session.
//! 2. [`Stamper::insert_pending_code`] writes the pending code into the
//!    document at a location, keeping the formatting found there.
//!
//! The corpus is only scanned at request time. Codes that appear in the
//! document between the two steps are not detected; a change is logged as a
//! warning when `warn_on_stale_corpus` is set.

use std::num::NonZeroUsize;

use tracing::instrument;

use crate::{
    domain::{
        corpus::{fingerprint, scan_corpus},
        generator::{generate, RandomSource, ThreadRandom},
        Code, Config, CorpusReadError, ExhaustionError, NoCodeAvailableError, Session,
    },
    host::{Document, HostError, Selection},
};

/// Writing a code into the document failed.
///
/// If the failure happened after the text was replaced, the document holds
/// the code without its formatting.
#[derive(Debug, thiserror::Error)]
pub enum InsertionError {
    /// The formatting at the location could not be read. Nothing was changed.
    #[error("failed to read formatting at the insertion point")]
    ReadFormatting(#[source] HostError),

    /// The host rejected the text replacement. Nothing was changed.
    #[error("failed to insert the code")]
    Replace(#[source] HostError),

    /// The code was inserted but its formatting could not be restored.
    #[error("inserted the code at {inserted} but failed to restore its formatting")]
    Reformat {
        /// The range now holding the code.
        inserted: Selection,
        /// The host error.
        #[source]
        source: HostError,
    },
}

/// Errors from the code workflow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document could not be scanned.
    #[error(transparent)]
    CorpusRead(#[from] CorpusReadError),

    /// No unused code was found.
    #[error(transparent)]
    Exhausted(#[from] ExhaustionError),

    /// There is no pending code to insert.
    #[error(transparent)]
    NoCodeAvailable(#[from] NoCodeAvailableError),

    /// The pending code could not be inserted.
    #[error(transparent)]
    Insertion(#[from] InsertionError),
}

/// Generates codes against a document and inserts them.
#[derive(Debug)]
pub struct Stamper<R = ThreadRandom> {
    source: R,
    max_attempts: NonZeroUsize,
    warn_on_stale_corpus: bool,
}

impl Stamper {
    /// Creates a stamper drawing from the thread-local random generator.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_source(config, ThreadRandom::new())
    }
}

impl<R: RandomSource> Stamper<R> {
    /// Creates a stamper drawing from `source`.
    #[must_use]
    pub const fn with_source(config: &Config, source: R) -> Self {
        Self {
            source,
            max_attempts: config.max_attempts(),
            warn_on_stale_corpus: config.warn_on_stale_corpus,
        }
    }

    /// Returns the random source.
    pub const fn source(&self) -> &R {
        &self.source
    }

    /// Scans `document` and generates a code not yet used in it.
    ///
    /// On success the code is left pending in `session`, replacing any code
    /// already pending. On failure the session is unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::CorpusRead`] if the document cannot be read
    /// - [`Error::Exhausted`] if no unused code was found within the
    ///   configured number of attempts
    #[instrument(level = "debug", skip_all)]
    pub fn request_unique_code<D: Document + ?Sized>(
        &mut self,
        document: &D,
        session: &mut Session,
    ) -> Result<Code, Error> {
        let existing = scan_corpus(document)?;
        let code = generate(&existing, &mut self.source, self.max_attempts)?;
        session.accept(code, fingerprint(&existing));
        tracing::info!(%code, existing = existing.len(), "generated unique code");
        Ok(code)
    }

    /// Inserts the pending code at `location` and clears it from `session`.
    ///
    /// The code replaces the content of `location` and takes the formatting
    /// that was there before the edit.
    ///
    /// # Errors
    ///
    /// - [`Error::NoCodeAvailable`] if nothing is pending; the document is
    ///   not touched
    /// - [`Error::Insertion`] if the host rejects the edit; the code stays
    ///   pending
    #[instrument(level = "debug", skip(self, document, session))]
    pub fn insert_pending_code<D: Document + ?Sized>(
        &self,
        document: &mut D,
        session: &mut Session,
        location: Selection,
    ) -> Result<Code, Error> {
        let pending = session.require_pending()?;
        let code = pending.code;

        if self.warn_on_stale_corpus {
            match scan_corpus(&*document) {
                Ok(existing) if fingerprint(&existing) != pending.corpus_fingerprint => {
                    tracing::warn!(
                        "document codes changed since {code} was generated; it may no longer be unique"
                    );
                }
                Ok(_) => {}
                Err(error) => tracing::debug!(%error, "could not re-scan document before insert"),
            }
        }

        insert_at(document, location, code)?;
        session.complete();
        tracing::info!(%code, %location, "inserted code");
        Ok(code)
    }

    /// Discards the pending code, if any.
    ///
    /// Returns `true` if a code was pending.
    pub fn reset(&self, session: &mut Session) -> bool {
        session.reset()
    }
}

/// Counts the distinct codes already present in `document`.
///
/// # Errors
///
/// Returns [`Error::CorpusRead`] if the document cannot be read.
pub fn count_existing_codes<D: Document + ?Sized>(document: &D) -> Result<usize, Error> {
    Ok(scan_corpus(document)?.len())
}

/// Replaces `location` with `code`, restoring the formatting found there.
///
/// The formatting is read in full before the document is changed, and is
/// applied to the inserted range only.
///
/// # Errors
///
/// See [`InsertionError`].
pub fn insert_at<D: Document + ?Sized>(
    document: &mut D,
    location: Selection,
    code: Code,
) -> Result<Selection, InsertionError> {
    let formatting = document
        .formatting_at(location)
        .map_err(InsertionError::ReadFormatting)?;

    let inserted = document
        .replace(location, &code.to_string())
        .map_err(InsertionError::Replace)?;

    document
        .set_formatting(inserted, &formatting)
        .map_err(|source| InsertionError::Reformat { inserted, source })?;

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::{
        domain::generator::ScriptedRandom,
        host::{Formatting, StyledDocument},
    };

    fn font(name: &str, size: f32, color: &str) -> Formatting {
        Formatting {
            font_name: Some(name.to_string()),
            size: Some(size),
            color: Some(color.to_string()),
        }
    }

    fn stamper(script: &[(u16, u16)]) -> Stamper<ScriptedRandom> {
        Stamper::with_source(&Config::default(), ScriptedRandom::new(script))
    }

    #[test]
    fn request_avoids_codes_in_document() {
        let doc = StyledDocument::new().with_run("ref 100-100 here", Formatting::default());
        let mut session = Session::default();
        let mut stamper = stamper(&[(100, 100), (100, 101)]);

        let code = stamper.request_unique_code(&doc, &mut session).unwrap();

        assert_eq!(code.to_string(), "100-101");
        assert_eq!(session.pending().unwrap().code, code);
        assert_eq!(session.generated(), 1);
    }

    #[test]
    fn exhaustion_leaves_session_untouched() {
        let doc = StyledDocument::new().with_run("100-100", Formatting::default());
        let mut session = Session::default();
        let mut stamper = stamper(&[(100, 100)]);

        let err = stamper.request_unique_code(&doc, &mut session).unwrap_err();

        assert!(matches!(err, Error::Exhausted(ExhaustionError { attempts: 1000 })));
        assert_eq!(stamper.source().draws(), 2000);
        assert_eq!(session, Session::default());
    }

    #[test]
    fn insert_without_pending_code_does_not_mutate() {
        let mut doc = StyledDocument::new().with_run("untouched", Formatting::default());
        let mut session = Session::default();
        let stamper = stamper(&[(555, 555)]);

        let err = stamper
            .insert_pending_code(&mut doc, &mut session, Selection::caret(0))
            .unwrap_err();

        assert!(matches!(err, Error::NoCodeAvailable(_)));
        assert_eq!(doc.text(), "untouched");
    }

    #[test]
    fn insert_keeps_surrounding_formatting() {
        let body = font("Georgia", 12.0, "#333333");
        let heading = font("Arial", 18.0, "#000080");
        let mut doc = StyledDocument::new()
            .with_run("Code: ", body.clone())
            .with_run("TBD", heading.clone())
            .with_run(" end", body.clone());
        let mut session = Session::default();
        let mut stamper = stamper(&[(482, 107)]);

        stamper.request_unique_code(&doc, &mut session).unwrap();
        let code = stamper
            .insert_pending_code(&mut doc, &mut session, Selection::new(6, 9))
            .unwrap();

        assert_eq!(code.to_string(), "482-107");
        assert_eq!(doc.text(), "Code: 482-107 end");
        let runs: Vec<_> = doc.runs().map(|(t, f)| (t.to_string(), f.clone())).collect();
        assert_eq!(
            runs,
            vec![
                ("Code: ".to_string(), body.clone()),
                ("482-107".to_string(), heading),
                (" end".to_string(), body),
            ]
        );
        assert!(session.pending().is_none());
    }

    #[test]
    fn insert_at_caret_takes_preceding_formatting() {
        let body = font("Georgia", 12.0, "#333333");
        let mut doc = StyledDocument::new()
            .with_run("Ref ", body.clone())
            .with_run("!", font("Arial", 8.0, "#FF0000"));

        insert_at(&mut doc, Selection::caret(4), "123-456".parse().unwrap()).unwrap();

        let runs: Vec<_> = doc.runs().map(|(t, f)| (t.to_string(), f.clone())).collect();
        assert_eq!(runs[0], ("Ref 123-456".to_string(), body));
        assert_eq!(runs[1].0, "!");
    }

    #[test]
    fn code_is_cleared_only_after_successful_insert() {
        let mut doc = StyledDocument::new().with_run("short", Formatting::default());
        let mut session = Session::default();
        let mut stamper = stamper(&[(321, 654)]);
        stamper.request_unique_code(&doc, &mut session).unwrap();

        let err = stamper
            .insert_pending_code(&mut doc, &mut session, Selection::caret(99))
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Insertion(InsertionError::ReadFormatting(_))
        ));
        assert_eq!(session.pending().unwrap().code.to_string(), "321-654");
        assert_eq!(doc.text(), "short");
    }

    #[test]
    fn reset_discards_pending_code() {
        let doc = StyledDocument::new();
        let mut session = Session::default();
        let mut stamper = stamper(&[(111, 222)]);
        stamper.request_unique_code(&doc, &mut session).unwrap();

        assert!(stamper.reset(&mut session));
        assert!(!stamper.reset(&mut session));
        assert!(session.pending().is_none());
    }

    #[test]
    fn counts_distinct_codes() {
        let doc = StyledDocument::new()
            .with_run("111-222 333-444 111-222 12-345", Formatting::default());
        assert_eq!(count_existing_codes(&doc).unwrap(), 2);
    }

    /// A host whose body cannot be read.
    struct Unreadable;

    impl Document for Unreadable {
        fn body_text(&self) -> Result<Cow<'_, str>, HostError> {
            Err(HostError::Read(std::io::Error::other("document closed")))
        }

        fn formatting_at(&self, _: Selection) -> Result<Formatting, HostError> {
            unreachable!()
        }

        fn replace(&mut self, _: Selection, _: &str) -> Result<Selection, HostError> {
            unreachable!()
        }

        fn set_formatting(&mut self, _: Selection, _: &Formatting) -> Result<(), HostError> {
            unreachable!()
        }
    }

    #[test]
    fn unreadable_document_produces_no_code() {
        let mut session = Session::default();
        let mut stamper = stamper(&[(123, 456)]);

        let err = stamper
            .request_unique_code(&Unreadable, &mut session)
            .unwrap_err();

        assert!(matches!(err, Error::CorpusRead(CorpusReadError(HostError::Read(_)))));
        assert_eq!(stamper.source().draws(), 0);
        assert_eq!(session, Session::default());
    }

    #[test]
    fn unreadable_document_has_no_count() {
        let err = count_existing_codes(&Unreadable).unwrap_err();
        assert!(matches!(err, Error::CorpusRead(_)));
    }

    #[test]
    fn attaching_metadata_keeps_corpus_fingerprint() {
        let mut doc = StyledDocument::new().with_run("pump 100-100 valve", Formatting::default());
        let mut session = Session::default();
        let mut stamper = stamper(&[(200, 300)]);
        stamper.request_unique_code(&doc, &mut session).unwrap();

        let mut settings = crate::domain::Settings::default();
        crate::domain::metadata::attach(
            &mut doc,
            &mut settings,
            Selection::new(0, 4),
            crate::domain::MetadataRecord::new(crate::domain::Target::Text),
        )
        .unwrap();

        let rescanned = fingerprint(&scan_corpus(&doc).unwrap());
        assert_eq!(session.pending().unwrap().corpus_fingerprint, rescanned);
    }

    /// A host whose formatting writes always fail.
    struct ReadOnlyFormatting(StyledDocument);

    impl Document for ReadOnlyFormatting {
        fn body_text(&self) -> Result<Cow<'_, str>, HostError> {
            self.0.body_text()
        }

        fn formatting_at(&self, selection: Selection) -> Result<Formatting, HostError> {
            self.0.formatting_at(selection)
        }

        fn replace(&mut self, selection: Selection, text: &str) -> Result<Selection, HostError> {
            self.0.replace(selection, text)
        }

        fn set_formatting(&mut self, _: Selection, _: &Formatting) -> Result<(), HostError> {
            Err(HostError::Unsupported("read-only".to_string()))
        }
    }

    #[test]
    fn reformat_failure_leaves_text_inserted() {
        let mut doc = ReadOnlyFormatting(StyledDocument::new().with_run("x", Formatting::default()));

        let err = insert_at(&mut doc, Selection::caret(1), "777-888".parse().unwrap()).unwrap_err();

        assert!(matches!(
            err,
            InsertionError::Reformat { inserted, .. } if inserted == Selection::new(1, 8)
        ));
        assert_eq!(doc.0.text(), "x777-888");
    }
}
