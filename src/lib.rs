//! Unique Document Codes
//!
//! Generates `DDD-DDD` codes that do not yet occur in a document, inserts
//! them at a location, and attaches metadata records to tagged spans.

pub mod domain;
pub use domain::{Code, Config, MetadataRecord, Session, Settings};

/// The boundary towards the document host.
pub mod host;
pub use host::{Document, Formatting, Selection};

/// The generate-then-insert workflow.
pub mod stamp;
pub use stamp::{count_existing_codes, Stamper};

/// Plain-text documents and the sidecar workspace.
pub mod storage;
pub use storage::{TextFile, Workspace};
