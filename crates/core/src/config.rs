//! Runtime configuration, loaded from an optional `bore.toml` and layered
//! over compiled-in defaults.

use std::path::Path;

use serde::Deserialize;

use crate::error::BoreError;

/// The fixed companion-file extension preference list, most to least
/// preferred. Index into this list is a toggle entry's `extension_rank`.
pub const TOGGLE_EXTENSIONS: [&str; 10] =
    ["cpp", "cxx", "c", "inl", "hpp", "hxx", "h", "asm", "s", "ddf"];

/// Extra extensions beyond a query's explicit filter are silently dropped
/// past this count.
pub const MAX_SEARCH_EXTENSIONS: usize = 12;

#[derive(Debug, Clone)]
pub struct BoreConfig {
    /// File extensions (without the leading dot, lowercase) excluded from
    /// the index regardless of which project references them.
    pub excluded_extensions: Vec<String>,
    /// Default worker count for `find`, clamped to `[1, 32]` at use time.
    pub thread_count: usize,
    /// Global match cap `M`.
    pub match_cap: usize,
    /// Per-file match cap `F`.
    pub per_file_cap: usize,
    /// Max bytes of a matched line kept in a result, `L`.
    pub line_cap: usize,
}

impl Default for BoreConfig {
    fn default() -> Self {
        BoreConfig {
            excluded_extensions: default_excluded_extensions(),
            thread_count: 4,
            match_cap: 1000,
            per_file_cap: 100,
            line_cap: 1012,
        }
    }
}

fn default_excluded_extensions() -> Vec<String> {
    vec![
        "obj".into(),
        "pdb".into(),
        "exe".into(),
        "dll".into(),
        "lib".into(),
        "ilk".into(),
        "vcxproj".into(),
    ]
}

/// Mirrors `BoreConfig` but every field is optional, so a `bore.toml` only
/// needs to mention the settings it wants to override.
#[derive(Debug, Deserialize, Default)]
struct BoreConfigFile {
    excluded_extensions: Option<Vec<String>>,
    thread_count: Option<usize>,
    match_cap: Option<usize>,
    per_file_cap: Option<usize>,
    line_cap: Option<usize>,
}

impl BoreConfig {
    /// Load `bore.toml` from `dir` if present, overlaying it onto
    /// [`BoreConfig::default`]. Returns the defaults unchanged if no config
    /// file exists.
    pub fn load(dir: &Path) -> Result<Self, BoreError> {
        let path = dir.join("bore.toml");
        let mut config = BoreConfig::default();
        if !path.exists() {
            return Ok(config);
        }
        let content = std::fs::read_to_string(&path).map_err(|source| BoreError::ManifestNotOpenable {
            path: path.clone(),
            source,
        })?;
        let overlay: BoreConfigFile = toml::from_str(&content).map_err(|source| BoreError::InvalidConfig {
            path: path.clone(),
            source,
        })?;
        if let Some(v) = overlay.excluded_extensions {
            config.excluded_extensions = v;
        }
        if let Some(v) = overlay.thread_count {
            config.thread_count = v;
        }
        if let Some(v) = overlay.match_cap {
            config.match_cap = v;
        }
        if let Some(v) = overlay.per_file_cap {
            config.per_file_cap = v;
        }
        if let Some(v) = overlay.line_cap {
            config.line_cap = v;
        }
        Ok(config)
    }

    pub fn is_excluded(&self, extension: &str) -> bool {
        self.excluded_extensions.iter().any(|e| e.eq_ignore_ascii_case(extension))
    }
}
