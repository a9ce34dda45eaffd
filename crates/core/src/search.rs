//! Parallel substring search over an [`Index`].
//!
//! A work-stealing dispenser hands each of `N` worker threads the next
//! unclaimed file index. Each worker reads its file into a thread-local
//! scratch [`Arena`] (grown as needed, never shrunk mid-query), runs a
//! Quick-Search scan, and reserves a disjoint slice of the shared result
//! buffer via a single atomic fetch-and-add before writing its matches —
//! no locks on the hot path.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::path::Path;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::arena::Arena;
use crate::index::{FileIndex, Index};

/// One located occurrence, with enough context to print `path:row:col:line`.
#[derive(Debug, Clone)]
pub struct Match {
    pub file: FileIndex,
    /// 1-indexed line number.
    pub row: u32,
    /// 1-indexed byte column within the line.
    pub column: u32,
    /// The matched line's text, truncated to the configured line cap.
    pub line: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// Every match that exists was returned.
    None,
    /// A per-file or global cap was hit; some matches were dropped but every
    /// claimed file was at least opened and scanned.
    Soft,
    /// The global cap was hit early enough that some files were never
    /// opened at all.
    Hard,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub thread_count: usize,
    pub match_cap: usize,
    pub per_file_cap: usize,
    pub line_cap: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions { thread_count: 4, match_cap: 1000, per_file_cap: 100, line_cap: 1012 }
    }
}

pub struct SearchResult {
    pub matches: Vec<Match>,
    pub truncated: Truncation,
}

/// Sunday's "Quick Search" variant of Boyer-Moore-Horspool: a 256-entry
/// bad-character shift table keyed on the byte *after* the current window,
/// shared read-only across every worker thread.
pub struct QuickSearch {
    needle: Vec<u8>,
    shift: [usize; 256],
}

impl QuickSearch {
    pub fn new(needle: &[u8]) -> Self {
        let m = needle.len();
        let mut shift = [m + 1; 256];
        for (i, &b) in needle.iter().enumerate() {
            shift[b as usize] = m - i;
        }
        QuickSearch { needle: needle.to_vec(), shift }
    }

    /// Every starting offset of `needle` in `haystack`, stopping once `cap`
    /// matches have been found.
    pub fn find_all(&self, haystack: &[u8], cap: usize) -> Vec<usize> {
        let mut out = Vec::new();
        if cap == 0 {
            return out;
        }
        let m = self.needle.len();
        if m == 0 {
            return out;
        }
        let n = haystack.len();
        if m > n {
            return out;
        }
        let mut j = 0usize;
        loop {
            if haystack[j..j + m] == self.needle[..] {
                out.push(j);
                if out.len() == cap {
                    break;
                }
            }
            let next = j + m;
            if next >= n {
                break;
            }
            j += self.shift[haystack[next] as usize];
            if j + m > n {
                break;
            }
        }
        out
    }
}

/// Maintains a running line counter and line-start offset so each match only
/// needs a short forward scan to find the end of its own line.
fn resolve_matches(file: FileIndex, haystack: &[u8], offsets: &[usize], line_cap: usize) -> Vec<Match> {
    let mut matches = Vec::with_capacity(offsets.len());
    let mut row = 1u32;
    let mut line_start = 0usize;
    let mut p = 0usize;
    for &off in offsets {
        while p < off {
            if haystack[p] == b'\n' {
                row += 1;
                line_start = p + 1;
            }
            p += 1;
        }
        let mut line_end = line_start;
        while line_end < haystack.len() && haystack[line_end] != b'\n' && haystack[line_end] != b'\r' {
            line_end += 1;
        }
        let full_len = line_end - line_start;
        let capped_len = full_len.min(line_cap);
        let line_bytes = &haystack[line_start..line_start + capped_len];
        let column = (off - line_start + 1) as u32;
        matches.push(Match { file, row, column, line: String::from_utf8_lossy(line_bytes).into_owned() });
    }
    matches
}

/// A fixed-size slot array written into via disjoint, atomically-reserved
/// ranges. Safety: every write targets an index reserved exclusively to the
/// calling thread via the CAS loop in [`search`]; no two threads ever write
/// the same index, and the buffer is only read back after every worker
/// thread has joined (see the `thread::scope` call below), which provides
/// the necessary happens-before edge.
struct ResultSlots {
    slots: Box<[UnsafeCell<MaybeUninit<Match>>]>,
}

unsafe impl Sync for ResultSlots {}

impl ResultSlots {
    fn new(cap: usize) -> Self {
        let slots = (0..cap).map(|_| UnsafeCell::new(MaybeUninit::uninit())).collect();
        ResultSlots { slots }
    }

    /// # Safety
    /// `index` must be part of a range this thread exclusively reserved, and
    /// must not have been written already.
    unsafe fn write(&self, index: usize, value: Match) {
        (*self.slots[index].get()).write(value);
    }

    /// # Safety
    /// Every index in `0..written` must have been written exactly once, and
    /// all writers must have completed-before this call (e.g. joined).
    unsafe fn into_vec(self, written: usize) -> Vec<Match> {
        let mut out = Vec::with_capacity(written);
        for slot in self.slots.into_vec().into_iter().take(written) {
            out.push(slot.into_inner().assume_init());
        }
        out
    }
}

fn read_whole_file<'a>(path: &Path, scratch: &'a mut Arena) -> Option<&'a [u8]> {
    let bytes = std::fs::read(path).ok()?;
    scratch.reset();
    let offset = scratch.alloc(bytes.len()).ok()?;
    scratch.write(offset, &bytes);
    Some(scratch.get(offset, bytes.len()))
}

pub fn search(index: &Index, needle: &[u8], ext_filter: Option<&std::collections::HashSet<u32>>, opts: &SearchOptions) -> SearchResult {
    if needle.is_empty() {
        return SearchResult { matches: Vec::new(), truncated: Truncation::None };
    }
    let thread_count = opts.thread_count.clamp(1, 32);
    let qs = QuickSearch::new(needle);

    let next_file = AtomicUsize::new(0);
    let reserved = AtomicUsize::new(0);
    // 0 = none, 1 = soft, 2 = hard.
    let truncation = AtomicU8::new(0);
    let slots = ResultSlots::new(opts.match_cap);
    let file_count = index.file_count();

    std::thread::scope(|scope| {
        for _ in 0..thread_count {
            scope.spawn(|| {
                let mut scratch = Arena::new();
                loop {
                    if truncation.load(Ordering::Acquire) == 2 {
                        break;
                    }
                    let i = next_file.fetch_add(1, Ordering::Relaxed);
                    if i >= file_count {
                        break;
                    }
                    if let Some(filter) = ext_filter {
                        if !filter.contains(&index.ext_hashes[i]) {
                            continue;
                        }
                    }
                    let path_text = index.path(i as FileIndex);
                    let path = Path::new(path_text);
                    let Some(bytes) = read_whole_file(path, &mut scratch) else {
                        continue;
                    };
                    let offsets = qs.find_all(bytes, opts.per_file_cap);
                    if offsets.is_empty() {
                        continue;
                    }
                    let file_truncated = offsets.len() == opts.per_file_cap;
                    let local = resolve_matches(i as FileIndex, bytes, &offsets, opts.line_cap);
                    if file_truncated {
                        truncation.fetch_max(1, Ordering::Relaxed);
                    }

                    let want = local.len();
                    loop {
                        let current = reserved.load(Ordering::Relaxed);
                        if current >= opts.match_cap {
                            truncation.store(2, Ordering::Release);
                            break;
                        }
                        let got = (opts.match_cap - current).min(want);
                        if reserved.compare_exchange(current, current + got, Ordering::AcqRel, Ordering::Relaxed).is_ok() {
                            for (j, m) in local.into_iter().take(got).enumerate() {
                                unsafe { slots.write(current + j, m) };
                            }
                            if got < want {
                                truncation.fetch_max(1, Ordering::Relaxed);
                            }
                            break;
                        }
                    }
                }
            });
        }
    });

    let written = reserved.load(Ordering::Acquire).min(opts.match_cap);
    let matches = unsafe { slots.into_vec(written) };
    let truncated = match truncation.load(Ordering::Acquire) {
        2 => Truncation::Hard,
        1 => Truncation::Soft,
        _ => Truncation::None,
    };
    SearchResult { matches, truncated }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_search_finds_all_occurrences() {
        let qs = QuickSearch::new(b"int");
        let offsets = qs.find_all(b"int x; int y;", 100);
        assert_eq!(offsets, vec![0, 7]);
    }

    #[test]
    fn quick_search_respects_cap() {
        let qs = QuickSearch::new(b"a");
        let offsets = qs.find_all(b"aaaaa", 2);
        assert_eq!(offsets, vec![0, 1]);
    }

    #[test]
    fn quick_search_no_match() {
        let qs = QuickSearch::new(b"xyz");
        assert!(qs.find_all(b"hello world", 10).is_empty());
    }

    #[test]
    fn resolve_matches_reports_1_indexed_row_and_col() {
        let haystack = b"int x; int y;";
        let offsets = vec![0, 7];
        let matches = resolve_matches(0, haystack, &offsets, 1012);
        assert_eq!(matches[0].row, 1);
        assert_eq!(matches[0].column, 1);
        assert_eq!(matches[1].row, 1);
        assert_eq!(matches[1].column, 8);
    }

    #[test]
    fn resolve_matches_tracks_rows_across_newlines() {
        let haystack = b"foo\nbar int\nbaz";
        let offsets = vec![8];
        let matches = resolve_matches(0, haystack, &offsets, 1012);
        assert_eq!(matches[0].row, 2);
        assert_eq!(matches[0].column, 5);
        assert_eq!(matches[0].line, "bar int");
    }

    #[test]
    fn resolve_matches_truncates_long_lines() {
        let long_line = "x".repeat(2000) + "int";
        let haystack = long_line.as_bytes();
        let offsets = vec![2000];
        let matches = resolve_matches(0, haystack, &offsets, 10);
        assert_eq!(matches[0].line.len(), 10);
    }
}
