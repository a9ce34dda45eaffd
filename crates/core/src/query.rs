//! The public find API: turn a needle plus an optional extension filter
//! into a [`SearchResult`], and parse the CLI-like `[-e ext1,ext2] needle`
//! grammar used by the `bore find` command.

use std::collections::HashSet;

use crate::config::MAX_SEARCH_EXTENSIONS;
use crate::hashing;
use crate::index::Index;
use crate::search::{self, SearchOptions, SearchResult};

/// Run a search. `extensions` is a list of bare extensions (no leading dot);
/// only the first [`MAX_SEARCH_EXTENSIONS`] are honored, matching the
/// query-side cap — extras are silently dropped rather than rejected.
pub fn find(index: &Index, needle: &str, extensions: &[String], opts: &SearchOptions) -> SearchResult {
    let filter = ext_filter(extensions);
    search::search(index, needle.as_bytes(), filter.as_ref(), opts)
}

fn ext_filter(extensions: &[String]) -> Option<HashSet<u32>> {
    if extensions.is_empty() {
        return None;
    }
    Some(extensions.iter().take(MAX_SEARCH_EXTENSIONS).map(|e| hashing::hash_str(e)).collect())
}

/// Parsed form of a `bore find` argument string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFind {
    pub needle: String,
    pub extensions: Vec<String>,
}

/// Parse `[-e ext1,ext2,...] needle`. An `-e` flag with no following
/// whitespace-separated argument, or input that doesn't start with `-e `,
/// is not treated as a flag at all: the whole input becomes the literal
/// needle.
pub fn parse_find_args(input: &str) -> ParsedFind {
    let trimmed = input.trim_start();
    if let Some(rest) = trimmed.strip_prefix("-e ") {
        let rest = rest.trim_start();
        if let Some(sp) = rest.find(char::is_whitespace) {
            let ext_field = &rest[..sp];
            let needle = rest[sp..].trim_start();
            let extensions: Vec<String> = ext_field
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(MAX_SEARCH_EXTENSIONS)
                .collect();
            return ParsedFind { needle: needle.to_string(), extensions };
        }
    }
    ParsedFind { needle: trimmed.to_string(), extensions: Vec::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_needle_has_no_filter() {
        let parsed = parse_find_args("TODO");
        assert_eq!(parsed.needle, "TODO");
        assert!(parsed.extensions.is_empty());
    }

    #[test]
    fn extension_filter_is_parsed() {
        let parsed = parse_find_args("-e cpp,h needle_text");
        assert_eq!(parsed.needle, "needle_text");
        assert_eq!(parsed.extensions, vec!["cpp", "h"]);
    }

    #[test]
    fn malformed_flag_falls_back_to_literal_needle() {
        let parsed = parse_find_args("-e");
        assert_eq!(parsed.needle, "-e");
        assert!(parsed.extensions.is_empty());
    }

    #[test]
    fn unrecognized_flag_is_literal() {
        let parsed = parse_find_args("-x something");
        assert_eq!(parsed.needle, "-x something");
    }

    #[test]
    fn needle_may_itself_contain_spaces() {
        let parsed = parse_find_args("-e cpp hello world");
        assert_eq!(parsed.needle, "hello world");
    }

    #[test]
    fn extension_list_caps_at_max() {
        let exts: Vec<String> = (0..20).map(|i| format!("e{i}")).collect();
        let joined = exts.join(",");
        let parsed = parse_find_args(&format!("-e {joined} needle"));
        assert_eq!(parsed.extensions.len(), MAX_SEARCH_EXTENSIONS);
    }
}
