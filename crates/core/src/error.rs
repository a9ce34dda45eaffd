//! Error types for bore-core.
//!
//! A flat enum so callers can match on the failure kind directly. Mirrors the
//! failure modes a solution-aware indexer actually hits: bad input paths, a
//! manifest that can't be opened, and (in pathological cases) an arena that
//! can't grow any further.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoreError {
    /// Path canonicalization failed: the raw path couldn't be resolved to an
    /// absolute, native form.
    #[error("bad path: {0}")]
    BadPath(PathBuf),

    /// Canonicalization succeeded but the resolved target does not exist.
    #[error("not found: {0}")]
    NotFound(PathBuf),

    /// The solution/manifest file itself could not be opened or read.
    #[error("manifest not openable: {path}")]
    ManifestNotOpenable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest parser produced output that violated its own grammar
    /// (mismatched section markers, truncated GUID, ...).
    #[error("malformed manifest {path}: {details}")]
    MalformedManifest { path: PathBuf, details: String },

    /// An arena could not grow to satisfy a request (out of memory, or the
    /// requested size overflows `usize`).
    #[error("allocator exhausted: requested {requested} bytes")]
    AllocatorExhausted { requested: usize },

    /// Config file exists but failed to parse as TOML.
    #[error("invalid config at {path}: {source}")]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type BoreResult<T> = Result<T, BoreError>;
