//! Manifest ingestion: parse a solution file and its projects' file lists
//! into the raw `(project, path)` tuples that [`index::build`] turns into an
//! [`Index`].

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::BoreConfig;
use crate::error::BoreError;
use crate::index::{self, FileRecord, Index, ProjectIndex, ProjectRecord, RawFile};
use crate::pathutil;
use crate::strtab::StringTable;

/// One `Project(...)` line parsed out of a `.sln` file.
#[derive(Debug, Clone)]
pub struct RawProject {
    pub name: String,
    pub raw_path: Option<String>,
    pub sln_guid: String,
    pub parent_guid: Option<String>,
}

/// Parses the handful of `.sln` constructs bore cares about: `Project(...)`
/// declaration lines, and `NestedProjects` entries inside
/// `GlobalSection(NestedProjects)`.
pub struct SolutionParser {
    project_line: Regex,
    nested: Regex,
}

impl SolutionParser {
    pub fn new() -> Self {
        SolutionParser {
            project_line: Regex::new(
                r#"(?m)^Project\("\{[^}]*\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"\{([^}]*)\}""#,
            )
            .expect("valid regex"),
            nested: Regex::new(r#"(?m)^\s*\{([^}]*)\}\s*=\s*\{([^}]*)\}\s*$"#).expect("valid regex"),
        }
    }

    pub fn parse(&self, text: &str) -> Vec<RawProject> {
        let mut parents: std::collections::HashMap<String, String> = std::collections::HashMap::new();
        if let Some(section_start) = text.find("GlobalSection(NestedProjects)") {
            if let Some(section) = text[section_start..].find("EndGlobalSection").map(|end| &text[section_start..section_start + end]) {
                for cap in self.nested.captures_iter(section) {
                    parents.insert(cap[1].to_string(), cap[2].to_string());
                }
            }
        }

        self.project_line
            .captures_iter(text)
            .map(|cap| {
                let name = cap[1].to_string();
                let path_field = cap[2].to_string();
                let sln_guid = cap[3].to_string();
                // Solution folders reuse their own name as the "path" field;
                // treat it as a real path only if it looks like one.
                let raw_path = if path_field.contains('.') || path_field.contains('/') || path_field.contains('\\') {
                    Some(path_field)
                } else {
                    None
                };
                let parent_guid = parents.get(&sln_guid).cloned();
                RawProject { name, raw_path, sln_guid, parent_guid }
            })
            .collect()
    }
}

impl Default for SolutionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Scans a project file's raw XML text for every `Include="..."` attribute,
/// the way the original walked `@Include` nodes in a `.vcxproj.filters`.
pub struct ProjectFileParser {
    include_attr: Regex,
}

impl ProjectFileParser {
    pub fn new() -> Self {
        ProjectFileParser {
            include_attr: Regex::new(r#"(?i)Include\s*=\s*"([^"]*)"?"#).expect("valid regex"),
        }
    }

    pub fn parse(&self, text: &str) -> Vec<String> {
        self.include_attr
            .captures_iter(text)
            .map(|cap| cap[1].trim_end_matches('"').to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for ProjectFileParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates projects and files as a solution is loaded, then hands the
/// collected raw data to [`index::build`].
pub struct ManifestLoader<'a> {
    config: &'a BoreConfig,
    sln_dir: PathBuf,
    strings: StringTable,
    projects: Vec<ProjectRecord>,
    raw_files: Vec<RawFile>,
}

impl<'a> ManifestLoader<'a> {
    pub fn new(sln_dir: PathBuf, config: &'a BoreConfig) -> Self {
        ManifestLoader {
            config,
            sln_dir,
            strings: StringTable::new(),
            projects: Vec::new(),
            raw_files: Vec::new(),
        }
    }

    /// Register a project. `project_file_raw_path` is `None` for solution
    /// folders; their files are still added via [`ManifestLoader::add_file`],
    /// just with a null `file_path`.
    pub fn begin_project(
        &mut self,
        name: &str,
        sln_guid: &str,
        parent_guid: Option<&str>,
        project_file_raw_path: Option<&str>,
    ) -> Result<ProjectIndex, BoreError> {
        let file_path = match project_file_raw_path {
            Some(raw) => {
                let resolved = pathutil::canonicalize(&self.sln_dir, raw)?;
                Some(self.strings.intern(&resolved.to_string_lossy())?)
            }
            None => None,
        };
        let record = ProjectRecord {
            name: self.strings.intern(name)?,
            sln_guid: self.strings.intern(sln_guid)?,
            parent_guid: parent_guid.map(|g| self.strings.intern(g)).transpose()?,
            file_path,
        };
        let index = self.projects.len() as ProjectIndex;
        self.projects.push(record);
        Ok(index)
    }

    /// Resolve and add one file reference. Silently dropped (not an error)
    /// if its extension is excluded, canonicalization fails, or it resolves
    /// to a directory.
    pub fn add_file(&mut self, raw_path: &str, project: ProjectIndex, project_dir: &Path) {
        let raw_ext = index::extension_of(raw_path);
        if self.config.is_excluded(raw_ext) {
            return;
        }
        let Ok((resolved, is_dir)) = pathutil::canonicalize_with_attrs(project_dir, raw_path) else {
            return;
        };
        if is_dir {
            return;
        }
        let Ok(path) = self.strings.intern(&resolved.to_string_lossy()) else {
            return;
        };
        self.raw_files.push(RawFile { path, project });
    }

    pub fn project_dir(&self, project: ProjectIndex) -> PathBuf {
        match self.projects[project as usize].file_path {
            Some(offset) => {
                let path = self.strings.get(offset);
                Path::new(path).parent().map(Path::to_path_buf).unwrap_or_else(|| self.sln_dir.clone())
            }
            None => self.sln_dir.clone(),
        }
    }

    /// The project file's canonical path, or `None` for a solution folder
    /// (a project whose path didn't canonicalize at `begin_project` time).
    pub fn project_file_path(&self, project: ProjectIndex) -> Option<&str> {
        self.projects[project as usize].file_path.map(|offset| self.strings.get(offset))
    }

    pub fn finish(mut self, sln_path: &Path) -> Result<Index, BoreError> {
        let sln_path_off = self.strings.intern(&sln_path.to_string_lossy())?;
        let sln_dir_off = self.strings.intern(&self.sln_dir.to_string_lossy())?;
        Ok(index::build(sln_path_off, sln_dir_off, self.strings, self.projects, self.raw_files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_project_lines_and_nesting() {
        let text = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}") = "App", "src\App\App.vcxproj", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Solution Items", "Solution Items", "{22222222-2222-2222-2222-222222222222}"
EndProject
Global
	GlobalSection(NestedProjects) = preSolution
		{11111111-1111-1111-1111-111111111111} = {22222222-2222-2222-2222-222222222222}
	EndGlobalSection
EndGlobal
"#;
        let parser = SolutionParser::new();
        let projects = parser.parse(text);
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].name, "App");
        assert_eq!(projects[0].raw_path.as_deref(), Some("src\\App\\App.vcxproj"));
        assert_eq!(projects[0].parent_guid.as_deref(), Some("22222222-2222-2222-2222-222222222222"));
        assert_eq!(projects[1].raw_path, None, "solution folder has no real path");
    }

    #[test]
    fn project_file_parser_extracts_includes() {
        let text = r#"<ItemGroup><ClCompile Include="src\main.cpp" /><ClInclude Include="src\main.h"/></ItemGroup>"#;
        let parser = ProjectFileParser::new();
        let includes = parser.parse(text);
        assert_eq!(includes, vec!["src\\main.cpp", "src\\main.h"]);
    }

    #[test]
    fn add_file_skips_excluded_extensions() {
        let config = BoreConfig::default();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.obj"), b"").unwrap();
        let mut loader = ManifestLoader::new(dir.path().to_path_buf(), &config);
        let project = loader.begin_project("App", "guid", None, None).unwrap();
        let project_dir = loader.project_dir(project);
        loader.add_file("a.obj", project, &project_dir);
        assert!(loader.raw_files.is_empty());
    }

    #[test]
    fn add_file_skips_directories() {
        let config = BoreConfig::default();
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();
        let mut loader = ManifestLoader::new(dir.path().to_path_buf(), &config);
        let project = loader.begin_project("App", "guid", None, None).unwrap();
        let project_dir = loader.project_dir(project);
        loader.add_file("subdir", project, &project_dir);
        assert!(loader.raw_files.is_empty());
    }
}
