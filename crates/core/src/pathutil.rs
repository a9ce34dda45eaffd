//! Path canonicalization.
//!
//! On the original host this was a Win32 `GetFullPathNameW` /
//! `GetFileAttributesW` pair; here it's a lexical absolute-path resolver plus
//! (optionally) a filesystem metadata lookup. Resolution itself never touches
//! the filesystem and so succeeds even for paths that don't exist yet;
//! attribute queries do touch the filesystem and fail with `NotFound` when
//! the target is absent.

use std::path::{Component, Path, PathBuf};

use crate::error::BoreError;

/// Resolve `raw` to an absolute, lexically-normalized path, relative to
/// `base` if `raw` isn't already absolute. Never touches the filesystem.
///
/// Fails with [`BoreError::BadPath`] only for inputs that can't denote a path
/// at all (currently: empty strings or embedded NUL bytes).
pub fn canonicalize(base: &Path, raw: &str) -> Result<PathBuf, BoreError> {
    if raw.is_empty() || raw.contains('\0') {
        return Err(BoreError::BadPath(PathBuf::from(raw)));
    }
    let raw_path = Path::new(raw);
    let joined = if raw_path.is_absolute() {
        raw_path.to_path_buf()
    } else {
        base.join(raw_path)
    };
    Ok(normalize_lexically(&joined))
}

/// Like [`canonicalize`], but also resolves the filesystem metadata for the
/// target so the caller can tell a file apart from a directory. Fails with
/// [`BoreError::NotFound`] if nothing exists at the resolved path.
pub fn canonicalize_with_attrs(base: &Path, raw: &str) -> Result<(PathBuf, bool), BoreError> {
    let resolved = canonicalize(base, raw)?;
    let metadata = std::fs::symlink_metadata(&resolved).map_err(|_| BoreError::NotFound(resolved.clone()))?;
    Ok((resolved, metadata.is_dir()))
}

/// Collapse `.` and `..` components without consulting the filesystem
/// (so it works for non-existent paths too). Idempotent: normalizing an
/// already-normalized absolute path returns it unchanged.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !matches!(out.components().next_back(), None | Some(Component::RootDir) | Some(Component::Prefix(_))) {
                    out.pop();
                }
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Case-insensitive comparison, matching the case-folding the original used
/// for its `stricmp`-based dedup and sort.
pub fn eq_ignore_case(a: &Path, b: &Path) -> bool {
    a.as_os_str().to_string_lossy().eq_ignore_ascii_case(&b.as_os_str().to_string_lossy())
}
