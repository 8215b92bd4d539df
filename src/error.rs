//! Error taxonomy for the provisioning pipeline.
//!
//! This module provides the typed [`ProvisionError`] using [`thiserror`].
//! Internal modules return it directly while the command handler at the CLI
//! boundary converts it to [`anyhow::Error`] via the standard `?` operator.
//!
//! Advisory conditions — a pattern with zero matches, a missing optional
//! source, a failed optional fetch — are *not* errors. They are modeled as
//! outcome values (e.g. [`PatchOutcome::NotFound`](crate::patch::PatchOutcome))
//! and reported through the logger, so only genuinely fatal conditions travel
//! this enum.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal error raised by a provisioning run.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Required configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A network fetch failed.
    ///
    /// Fatal for the mandatory archive download; callers performing optional
    /// fetches (salts, licenses) catch this variant and downgrade it to an
    /// advisory.
    #[error("fetch failed for {url}")]
    Fetch {
        /// The URL that could not be fetched.
        url: String,
        /// Underlying transport or HTTP-status error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Archive decompression or unpacking failed.
    #[error("failed to extract archive {archive}")]
    Extract {
        /// Path of the archive being extracted.
        archive: PathBuf,
        /// Underlying I/O error from the decompress or unpack stage.
        #[source]
        source: std::io::Error,
    },

    /// A filesystem read, write, copy, or mkdir failed.
    ///
    /// Every write the pipeline performs is assumed necessary for a correct
    /// result, so this is fatal wherever it occurs. Deletion failures during
    /// best-effort cleanup sweeps are swallowed before reaching this type.
    #[error("{action} {path}")]
    Io {
        /// What was being attempted (e.g. `"reading"`, `"copying"`).
        action: &'static str,
        /// The path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ProvisionError {
    /// Shorthand for wrapping an I/O error with its path and action.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;
