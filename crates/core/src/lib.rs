//! Solution-aware source indexing and parallel substring search.
//!
//! Loading a solution (see [`manifest`]) produces an [`index::Index`]: a
//! deduplicated, project-grouped file list backed by a single string arena.
//! [`query::find`] runs a parallel Quick-Search scan over that index;
//! [`toggle`] answers "what's the companion header/source for this file".

pub mod arena;
pub mod config;
pub mod error;
pub mod hashing;
pub mod index;
pub mod manifest;
pub mod pathutil;
pub mod query;
pub mod search;
pub mod strtab;
pub mod toggle;

pub use config::BoreConfig;
pub use error::{BoreError, BoreResult};
pub use index::Index;
pub use manifest::{ManifestLoader, ProjectFileParser, SolutionParser};
pub use search::{Match, SearchOptions, SearchResult, Truncation};
