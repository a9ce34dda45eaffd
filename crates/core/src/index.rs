//! The built, queryable index: deduplicated files, their owning projects,
//! and the derived lookup tables ([`Index::ext_hashes`], [`Index::files_by_project`])
//! that `find` and `toggle` run against.

use std::path::PathBuf;

use crate::hashing;
use crate::strtab::{StrOffset, StringTable};
use crate::toggle::{self, ToggleEntry};

pub type ProjectIndex = u32;
pub type FileIndex = u32;

#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub name: StrOffset,
    pub sln_guid: StrOffset,
    pub parent_guid: Option<StrOffset>,
    /// Project file path, or `None` for solution folders (non-buildable,
    /// GUID-only entries).
    pub file_path: Option<StrOffset>,
}

#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: StrOffset,
    pub project: ProjectIndex,
}

pub struct Index {
    pub sln_path: StrOffset,
    pub sln_dir: StrOffset,
    pub strings: StringTable,
    pub projects: Vec<ProjectRecord>,
    pub files: Vec<FileRecord>,
    /// Indices into `files`, stable-sorted by `project`.
    pub files_by_project: Vec<FileIndex>,
    /// Parallel to `files`: the whole-extension hash of each file's path,
    /// used to push extension filters down before the substring matcher
    /// ever opens the file.
    pub ext_hashes: Vec<u32>,
    /// Sorted by `(basename_hash, extension_rank)` for companion-file lookup.
    pub toggle: Vec<ToggleEntry>,
}

impl Index {
    pub fn path(&self, file: FileIndex) -> &str {
        self.strings.get(self.files[file as usize].path)
    }

    pub fn sln_path(&self) -> &str {
        self.strings.get(self.sln_path)
    }

    pub fn sln_dir(&self) -> &str {
        self.strings.get(self.sln_dir)
    }

    pub fn project_name(&self, project: ProjectIndex) -> &str {
        self.strings.get(self.projects[project as usize].name)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Files belonging to `project`, in sorted-path order.
    pub fn files_of_project(&self, project: ProjectIndex) -> impl Iterator<Item = FileIndex> + '_ {
        self.files_by_project
            .iter()
            .copied()
            .filter(move |&f| self.files[f as usize].project == project)
    }
}

/// One file contributed by a manifest load, prior to dedup/sort.
pub struct RawFile {
    pub path: StrOffset,
    pub project: ProjectIndex,
}

/// Build the final [`Index`] from the raw file list a manifest load
/// collected, consuming the accumulated string table.
///
/// Dedup and sort are case-insensitive over the path text (matching the
/// original's `stricmp`-based dedup), so `Foo.cpp` and `foo.cpp` collapse to
/// one entry, the first one encountered.
pub fn build(
    sln_path: StrOffset,
    sln_dir: StrOffset,
    strings: StringTable,
    projects: Vec<ProjectRecord>,
    mut raw_files: Vec<RawFile>,
) -> Index {
    raw_files.sort_by(|a, b| {
        let pa = strings.get(a.path);
        let pb = strings.get(b.path);
        pa.to_ascii_lowercase().cmp(&pb.to_ascii_lowercase())
    });
    raw_files.dedup_by(|a, b| strings.get(a.path).eq_ignore_ascii_case(strings.get(b.path)));

    let files: Vec<FileRecord> = raw_files.into_iter().map(|r| FileRecord { path: r.path, project: r.project }).collect();

    let mut files_by_project: Vec<FileIndex> = (0..files.len() as u32).collect();
    files_by_project.sort_by_key(|&i| files[i as usize].project);

    let ext_hashes: Vec<u32> = files
        .iter()
        .map(|f| {
            let path = strings.get(f.path);
            hashing::hash_str(extension_of(path))
        })
        .collect();

    let toggle_entries = toggle::build(&files, &ext_hashes, &strings);

    Index {
        sln_path,
        sln_dir,
        strings,
        projects,
        files,
        files_by_project,
        ext_hashes,
        toggle: toggle_entries,
    }
}

/// The substring after the last `.` in the final path component, or `""` if
/// there is none. Does not include the dot.
pub fn extension_of(path: &str) -> &str {
    let basename = basename_of(path);
    match basename.rfind('.') {
        Some(0) | None => "",
        Some(i) => &basename[i + 1..],
    }
}

/// The final path component (after the last `/` or `\`).
pub fn basename_of(path: &str) -> &str {
    let idx = path.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
    &path[idx..]
}

/// The final path component with its extension (and the separating dot)
/// stripped, used as the key for companion-file grouping.
pub fn basename_no_ext(path: &str) -> &str {
    let basename = basename_of(path);
    match basename.rfind('.') {
        Some(0) | None => basename,
        Some(i) => &basename[..i],
    }
}

pub fn to_pathbuf(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_of_basic() {
        assert_eq!(extension_of("src/main.cpp"), "cpp");
        assert_eq!(extension_of("src/main"), "");
        assert_eq!(extension_of(".gitignore"), "");
        assert_eq!(extension_of("a/b.c.h"), "h");
    }

    #[test]
    fn basename_no_ext_strips_last_segment() {
        assert_eq!(basename_no_ext("src/foo/bar.cpp"), "bar");
        assert_eq!(basename_no_ext("bar"), "bar");
    }

    #[test]
    fn build_dedups_case_insensitively_keeping_first() {
        let mut strings = StringTable::new();
        let a = strings.intern("src/Foo.cpp").unwrap();
        let b = strings.intern("src/foo.cpp").unwrap();
        let sln_path = strings.intern("x.sln").unwrap();
        let sln_dir = strings.intern(".").unwrap();
        let raw = vec![
            RawFile { path: a, project: 0 },
            RawFile { path: b, project: 0 },
        ];
        let idx = build(sln_path, sln_dir, strings, vec![], raw);
        assert_eq!(idx.file_count(), 1);
        assert_eq!(idx.path(0), "src/Foo.cpp");
    }
}
