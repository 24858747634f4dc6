//! Domain models for document codes.
//!
//! This module contains the code format, corpus scanning, the bounded
//! generator, the per-document session, configuration, and the metadata
//! records attached to content controls.

/// The `DDD-DDD` code type.
pub mod code;
pub use code::{Code, ParseError as CodeParseError};

mod config;
pub use config::Config;

pub mod content_control;
pub use content_control::ContentControl;

pub mod corpus;
pub use corpus::{CorpusReadError, ExistingCodes};

pub mod generator;
pub use generator::ExhaustionError;

pub mod metadata;
pub use metadata::{MetadataError, MetadataRecord, Settings, Target};

mod session;
pub use session::{NoCodeAvailableError, Pending, Session};
