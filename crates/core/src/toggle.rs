//! Companion-file ("toggle") lookup: given the file currently open, find the
//! best header/source/inline counterpart sharing its basename.
//!
//! Entries are sorted by `(basename_hash, extension_rank)`, where
//! `extension_rank` is position in [`TOGGLE_EXTENSIONS`] (lower is more
//! preferred). A query locates its own entry, then walks forward through the
//! same basename-hash group to the *next distinct rank* and collects every
//! entry at that rank as candidates, picking the one with the longest shared
//! path prefix. This deliberately does not replicate the original's
//! `begin != end` early-exit, which could skip a real candidate group that
//! happened to start at `end`; here the bounds come from a proper
//! lower/upper-bound search.

use crate::config::TOGGLE_EXTENSIONS;
use crate::hashing;
use crate::index::{self, FileIndex, FileRecord};
use crate::strtab::StringTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleEntry {
    pub basename_hash: u32,
    pub extension_rank: u8,
    pub file: FileIndex,
}

/// Build the sorted toggle table for every file whose extension appears in
/// [`TOGGLE_EXTENSIONS`].
pub fn build(files: &[FileRecord], ext_hashes: &[u32], strings: &StringTable) -> Vec<ToggleEntry> {
    let ext_hash_list: Vec<u32> = TOGGLE_EXTENSIONS.iter().map(|e| hashing::hash_str(e)).collect();

    let mut entries: Vec<ToggleEntry> = Vec::new();
    for (i, file) in files.iter().enumerate() {
        let Some(rank) = ext_hash_list.iter().position(|&h| h == ext_hashes[i]) else {
            continue;
        };
        let path = strings.get(file.path);
        let basename_hash = hashing::hash_str(index::basename_no_ext(path));
        entries.push(ToggleEntry { basename_hash, extension_rank: rank as u8, file: i as u32 });
    }
    entries.sort_by_key(|e| (e.basename_hash, e.extension_rank));
    entries
}

/// Find the best companion file for `current`, returning its [`FileIndex`].
pub fn query(toggle: &[ToggleEntry], files: &[FileRecord], strings: &StringTable, current: FileIndex) -> Option<FileIndex> {
    let current_path = strings.get(files[current as usize].path);
    let basename_hash = hashing::hash_str(index::basename_no_ext(current_path));

    let lo = toggle.partition_point(|e| e.basename_hash < basename_hash);
    let hi = toggle.partition_point(|e| e.basename_hash <= basename_hash);
    let group = &toggle[lo..hi];
    if group.len() < 2 {
        return None;
    }

    let start = group.iter().position(|e| e.file == current)?;
    let start_rank = group[start].extension_rank;

    // Walk forward circularly within the group, skipping same-rank entries
    // (other files that share our own extension), to find the first
    // differing rank.
    let n = group.len();
    let mut i = (start + 1) % n;
    let mut steps = 0;
    let mut target_rank = None;
    while steps < n {
        if group[i].extension_rank != start_rank {
            target_rank = Some(group[i].extension_rank);
            break;
        }
        i = (i + 1) % n;
        steps += 1;
    }
    let target_rank = target_rank?;

    // Collect every entry at target_rank, continuing circularly until the
    // rank changes again or we've wrapped the whole group.
    let mut candidates = Vec::new();
    steps = 0;
    while steps < n && group[i].extension_rank == target_rank {
        candidates.push(group[i].file);
        i = (i + 1) % n;
        steps += 1;
    }

    // `Iterator::max_by_key` keeps the *last* maximal element on ties; the
    // spec requires the earliest occurrence, so fold with a strict `>`
    // instead of using `max_by_key` directly.
    let mut best: Option<(FileIndex, usize)> = None;
    for f in candidates {
        let path = strings.get(files[f as usize].path);
        let score = common_prefix_len_ignore_case(current_path, path);
        let is_new_best = match best {
            Some((_, best_score)) => score > best_score,
            None => true,
        };
        if is_new_best {
            best = Some((f, score));
        }
    }
    best.map(|(f, _)| f)
}

fn common_prefix_len_ignore_case(a: &str, b: &str) -> usize {
    a.bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x.to_ascii_lowercase() == y.to_ascii_lowercase())
        .count()
}
