use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Code;

/// Per-document state of the generate/insert cycle.
///
/// A session is either idle or holds one code pending insertion. It is owned
/// by the caller and passed into each operation, so nothing is kept in global
/// state between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Session {
    pending: Option<Pending>,
    generated: u64,
}

/// A generated code waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pending {
    /// The code itself.
    pub code: Code,
    /// When the code was generated.
    pub generated_at: DateTime<Utc>,
    /// Fingerprint of the corpus the code was checked against.
    pub corpus_fingerprint: String,
}

/// An insertion was requested while no code was pending.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("No code available: generate a code first")]
pub struct NoCodeAvailableError;

impl Session {
    /// Loads a session from a TOML file.
    ///
    /// A missing file is an idle session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read session file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse session file: {e}"))
    }

    /// Saves the session to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized or the file
    /// cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize session: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write session file: {e}"))
    }

    /// Returns the pending code, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    /// Returns how many codes have been generated in this session.
    #[must_use]
    pub const fn generated(&self) -> u64 {
        self.generated
    }

    /// Records a freshly generated code as pending.
    ///
    /// Any previously pending code is discarded.
    pub fn accept(&mut self, code: Code, corpus_fingerprint: String) {
        if let Some(previous) = &self.pending {
            tracing::debug!(previous = %previous.code, "replacing pending code");
        }
        self.pending = Some(Pending {
            code,
            generated_at: Utc::now(),
            corpus_fingerprint,
        });
        self.generated += 1;
    }

    /// Returns the pending code without clearing it.
    ///
    /// # Errors
    ///
    /// Returns [`NoCodeAvailableError`] if nothing is pending.
    pub fn require_pending(&self) -> Result<&Pending, NoCodeAvailableError> {
        self.pending.as_ref().ok_or(NoCodeAvailableError)
    }

    /// Marks the pending code as inserted.
    pub fn complete(&mut self) -> Option<Pending> {
        self.pending.take()
    }

    /// Discards the pending code. Returns `true` if one was pending.
    pub fn reset(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

/// The serialized versions of the session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        generated: u64,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        pending: Option<Pending>,
    },
}

impl From<Versions> for Session {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { generated, pending } => Self { pending, generated },
        }
    }
}

impl From<Session> for Versions {
    fn from(session: Session) -> Self {
        Self::V1 {
            generated: session.generated,
            pending: session.pending,
        }
    }
}
