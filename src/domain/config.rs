use std::{num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};

use super::generator::DEFAULT_MAX_ATTEMPTS;

/// Configuration for code generation.
///
/// Loaded from `.codestamp/config.toml` in the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The number of candidate codes drawn before generation gives up.
    max_attempts: NonZeroUsize,

    /// Whether to warn when the document's codes changed between generating
    /// a code and inserting it.
    ///
    /// The insertion goes ahead either way.
    pub warn_on_stale_corpus: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            warn_on_stale_corpus: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the generation attempt bound.
    #[must_use]
    pub const fn max_attempts(&self) -> NonZeroUsize {
        self.max_attempts
    }

    /// Sets the generation attempt bound.
    pub const fn set_max_attempts(&mut self, value: NonZeroUsize) {
        self.max_attempts = value;
    }
}

const fn default_max_attempts() -> NonZeroUsize {
    DEFAULT_MAX_ATTEMPTS
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        /// The number of candidate codes drawn before generation gives up.
        #[serde(default = "default_max_attempts")]
        max_attempts: NonZeroUsize,

        #[serde(default = "default_true")]
        warn_on_stale_corpus: bool,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                max_attempts,
                warn_on_stale_corpus,
            } => Self {
                max_attempts,
                warn_on_stale_corpus,
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            max_attempts: config.max_attempts,
            warn_on_stale_corpus: config.warn_on_stale_corpus,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nmax_attempts = 50\nwarn_on_stale_corpus = false\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.max_attempts().get(), 50);
        assert!(!config.warn_on_stale_corpus);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nmax_attempts = \"many\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let result = toml::from_str::<Config>("_version = \"1\"\nmax_attempts = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn empty_file_returns_default() {
        // Tests that deserialising an empty file returns the default configuration.
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.max_attempts().get(), 1000);
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.set_max_attempts(NonZeroUsize::new(25).unwrap());
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
