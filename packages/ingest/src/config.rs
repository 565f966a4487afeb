//! Run configuration for the ingest loop.

use std::path::{Path, PathBuf};

use dividend_ledger_models::AmbiguityPolicy;

use crate::IngestError;

/// Where statements are read from and where the ledger is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Directory scanned for `.pdf` statements.
    pub source_dir: PathBuf,
    /// Ledger workbook to create or append to.
    pub dest_file: PathBuf,
    /// How pages with several candidates for a field are handled.
    pub ambiguity: AmbiguityPolicy,
}

impl IngestConfig {
    /// Creates a config with the default [`AmbiguityPolicy`].
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, dest_file: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_file: dest_file.into(),
            ambiguity: AmbiguityPolicy::default(),
        }
    }

    /// Sets the ambiguity policy.
    #[must_use]
    pub const fn with_ambiguity(mut self, ambiguity: AmbiguityPolicy) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    /// Checks both paths before any document is touched.
    ///
    /// The destination itself may be absent, but its parent directory must
    /// exist and an existing destination must be a regular file.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), IngestError> {
        if !self.source_dir.is_dir() {
            return Err(IngestError::Config(format!(
                "source directory {} does not exist or is not a directory",
                self.source_dir.display()
            )));
        }

        let parent = self
            .dest_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if !parent.is_dir() {
            return Err(IngestError::Config(format!(
                "destination directory {} does not exist",
                parent.display()
            )));
        }

        if self.dest_file.exists() && !self.dest_file.is_file() {
            return Err(IngestError::Config(format!(
                "destination {} is not a file",
                self.dest_file.display()
            )));
        }

        Ok(())
    }
}
