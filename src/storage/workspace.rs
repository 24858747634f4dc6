//! The sidecar directory next to a set of documents.
//!
//! A workspace root holds a `.codestamp` directory:
//!
//! ```text
//! .codestamp/
//!   config.toml
//!   sessions/<document path>.toml
//!   settings/<document path>.json
//! ```
//!
//! Documents are keyed by their path relative to the root. A document outside
//! the root is keyed by its file name.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::domain::{Config, Session, Settings};

/// The name of the sidecar directory.
pub const SIDECAR_DIR: &str = ".codestamp";

/// Errors from loading or saving workspace state.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// `init` was run on a root that already has a sidecar directory.
    #[error("workspace already initialized (found existing {})", .0.display())]
    AlreadyInitialized(PathBuf),

    /// A sidecar directory could not be created.
    #[error("failed to create {}: {source}", path.display())]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        source: io::Error,
    },

    /// The configuration file is unreadable or invalid.
    #[error("{0}")]
    Config(String),

    /// A session file is unreadable or invalid.
    #[error("{0}")]
    Session(String),

    /// A settings file is unreadable or invalid.
    #[error("{0}")]
    Settings(String),
}

/// A root directory with its sidecar state.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens the workspace at `root`.
    ///
    /// A root without a configuration file uses [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file exists but cannot be loaded.
    pub fn open(root: PathBuf) -> Result<Self, WorkspaceError> {
        let config_path = config_path(&root);
        let config = if config_path.exists() {
            Config::load(&config_path).map_err(WorkspaceError::Config)?
        } else {
            tracing::debug!(root = %root.display(), "no config file, using defaults");
            Config::default()
        };
        Ok(Self { root, config })
    }

    /// Creates the sidecar directory and a default configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the sidecar directory already exists or cannot be
    /// created.
    pub fn init(root: PathBuf) -> Result<Self, WorkspaceError> {
        let dir = root.join(SIDECAR_DIR);
        if dir.exists() {
            return Err(WorkspaceError::AlreadyInitialized(dir));
        }
        create_dir(&dir)?;

        let config = Config::default();
        config
            .save(&config_path(&root))
            .map_err(WorkspaceError::Config)?;
        Ok(Self { root, config })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves a document path given on the command line against the root.
    #[must_use]
    pub fn document_path(&self, document: &Path) -> PathBuf {
        if document.is_absolute() {
            document.to_path_buf()
        } else {
            self.root.join(document)
        }
    }

    /// Returns the session file for `document`.
    #[must_use]
    pub fn session_path(&self, document: &Path) -> PathBuf {
        self.state_path("sessions", document, "toml")
    }

    /// Returns the settings file for `document`.
    #[must_use]
    pub fn settings_path(&self, document: &Path) -> PathBuf {
        self.state_path("settings", document, "json")
    }

    /// Loads the session for `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file exists but is invalid.
    pub fn load_session(&self, document: &Path) -> Result<Session, WorkspaceError> {
        Session::load(&self.session_path(document)).map_err(WorkspaceError::Session)
    }

    /// Saves the session for `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn save_session(&self, document: &Path, session: &Session) -> Result<(), WorkspaceError> {
        let path = self.session_path(document);
        create_parent(&path)?;
        session.save(&path).map_err(WorkspaceError::Session)
    }

    /// Loads the metadata settings for `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but is invalid.
    pub fn load_settings(&self, document: &Path) -> Result<Settings, WorkspaceError> {
        Settings::load(&self.settings_path(document)).map_err(WorkspaceError::Settings)
    }

    /// Saves the metadata settings for `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be written.
    pub fn save_settings(
        &self,
        document: &Path,
        settings: &Settings,
    ) -> Result<(), WorkspaceError> {
        let path = self.settings_path(document);
        create_parent(&path)?;
        settings.save(&path).map_err(WorkspaceError::Settings)
    }

    fn state_path(&self, kind: &str, document: &Path, extension: &str) -> PathBuf {
        let document = self.document_path(document);
        let key = document
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .ok()
            .or_else(|| document.file_name().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("document"));

        let mut file_name = key.into_os_string();
        file_name.push(".");
        file_name.push(extension);
        self.root.join(SIDECAR_DIR).join(kind).join(file_name)
    }
}

fn config_path(root: &Path) -> PathBuf {
    root.join(SIDECAR_DIR).join("config.toml")
}

fn create_dir(path: &Path) -> Result<(), WorkspaceError> {
    fs::create_dir_all(path).map_err(|source| WorkspaceError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn create_parent(path: &Path) -> Result<(), WorkspaceError> {
    match path.parent() {
        Some(parent) => create_dir(parent),
        None => Ok(()),
    }
}
