//! End-to-end: parse a small on-disk solution, load it, then exercise
//! find/toggle against the resulting index. Mirrors the scenarios in
//! spec.md §8.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use bore_core::config::BoreConfig;
use bore_core::hashing;
use bore_core::manifest::{ManifestLoader, ProjectFileParser, SolutionParser};
use bore_core::query;
use bore_core::search::{SearchOptions, Truncation};
use bore_core::toggle;

const SLN: &str = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}") = "App", "App\App.vcxproj", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Lib", "Lib\Lib.vcxproj", "{22222222-2222-2222-2222-222222222222}"
EndProject
Global
EndGlobal
"#;

fn project_xml(includes: &[&str]) -> String {
    let mut body = String::from("<Project><ItemGroup>\n");
    for inc in includes {
        body.push_str(&format!("  <ClCompile Include=\"{inc}\" />\n"));
    }
    body.push_str("</ItemGroup></Project>\n");
    body
}

/// Build a fixture solution directory with two projects and load it through
/// the same code path `bore-cli` uses (parse → `ManifestLoader` → `Index`).
fn load_fixture(dir: &Path) -> bore_core::Index {
    fs::create_dir_all(dir.join("App")).unwrap();
    fs::create_dir_all(dir.join("Lib")).unwrap();
    fs::create_dir_all(dir.join("other")).unwrap();

    fs::write(dir.join("demo.sln"), SLN).unwrap();
    fs::write(dir.join("App/App.vcxproj"), project_xml(&["a.c"])).unwrap();
    fs::write(dir.join("Lib/Lib.vcxproj"), project_xml(&["a.cpp", "a.h", "b.cpp", "B.CPP"])).unwrap();

    fs::write(dir.join("App/a.c"), "int x; int y;").unwrap();
    fs::write(dir.join("Lib/a.cpp"), "// companion source\n").unwrap();
    fs::write(dir.join("Lib/a.h"), "#pragma once\n").unwrap();
    fs::write(dir.join("other/a.h"), "#pragma once\n").unwrap();
    fs::write(dir.join("Lib/b.cpp"), "TODO: finish this\n").unwrap();

    // `other/a.h` isn't referenced by any project, so we add it by hand to
    // exercise "farther" companion candidates in the toggle test below.
    let config = BoreConfig::default();
    let sln_parser = SolutionParser::new();
    let project_parser = ProjectFileParser::new();
    let sln_text = fs::read_to_string(dir.join("demo.sln")).unwrap();
    let raw_projects = sln_parser.parse(&sln_text);

    let mut loader = ManifestLoader::new(dir.to_path_buf(), &config);
    for raw in &raw_projects {
        let project = loader
            .begin_project(&raw.name, &raw.sln_guid, raw.parent_guid.as_deref(), raw.raw_path.as_deref())
            .unwrap();
        let Some(project_file) = loader.project_file_path(project).map(str::to_owned) else {
            continue;
        };
        let project_text = fs::read_to_string(&project_file).unwrap();
        let project_dir = loader.project_dir(project);
        for include in project_parser.parse(&project_text) {
            loader.add_file(&include, project, &project_dir);
        }
    }
    // `other/a.h` is injected directly via add_file to simulate a file
    // referenced by a third, unrelated project outside this fixture's two
    // `.vcxproj`s (scenario 3 in spec.md §8).
    loader.add_file("../other/a.h", 1, &dir.join("Lib"));

    loader.finish(&dir.join("demo.sln")).unwrap()
}

#[test]
fn single_thread_exact_match() {
    let dir = tempfile::tempdir().unwrap();
    let index = load_fixture(dir.path());
    let opts = SearchOptions { thread_count: 1, ..SearchOptions::default() };
    let result = query::find(&index, "int", &[], &opts);
    assert_eq!(result.matches.len(), 2);
    assert_eq!(result.truncated, Truncation::None);
    let mut by_col: Vec<u32> = result.matches.iter().map(|m| m.column).collect();
    by_col.sort();
    assert_eq!(by_col, vec![1, 8]);
    for m in &result.matches {
        assert_eq!(m.row, 1);
        assert_eq!(m.line, "int x; int y;");
    }
}

#[test]
fn duplicate_elimination_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let index = load_fixture(dir.path());
    // b.cpp and B.CPP were both declared as includes; only one file entry
    // should survive dedup.
    let count = (0..index.file_count())
        .filter(|&i| index.path(i as u32).to_ascii_lowercase().ends_with("b.cpp"))
        .count();
    assert_eq!(count, 1);
}

#[test]
fn extension_filter_limits_matches_to_matching_extension() {
    let dir = tempfile::tempdir().unwrap();
    let index = load_fixture(dir.path());
    fs::write(dir.path().join("App/a.c"), "int TODO() { return 0; }").unwrap();
    // Reload so the a.c body edit above is visible (find reads from disk).
    let opts = SearchOptions::default();
    let filter: HashSet<u32> = [hashing::hash_str("c")].into_iter().collect();
    let result = query::find(&index, "TODO", &[], &opts);
    assert!(result.matches.iter().any(|m| index.path(m.file).ends_with("a.c")));
    assert!(result.matches.iter().any(|m| index.path(m.file).ends_with("b.cpp")));

    let filtered = bore_core::query::find(&index, "TODO", &["c".to_string()], &opts);
    assert!(filtered.matches.iter().all(|m| filter.contains(&index.ext_hashes[m.file as usize])));
    assert!(filtered.matches.iter().any(|m| index.path(m.file).ends_with("a.c")));
    assert!(!filtered.matches.iter().any(|m| index.path(m.file).ends_with("b.cpp")));
}

#[test]
fn toggle_prefers_same_directory_companion() {
    let dir = tempfile::tempdir().unwrap();
    let index = load_fixture(dir.path());
    let current = (0..index.file_count() as u32)
        .find(|&f| index.path(f).ends_with("Lib/a.cpp") || index.path(f).ends_with("Lib\\a.cpp"))
        .expect("Lib/a.cpp indexed");

    let companion = toggle::query(&index.toggle, &index.files, &index.strings, current).expect("companion found");
    let companion_path = index.path(companion);
    assert!(companion_path.contains("Lib"), "expected the Lib/a.h companion, got {companion_path}");
    assert!(!companion_path.contains("other"), "should not pick the unrelated other/a.h, got {companion_path}");
}

#[test]
fn per_file_cap_truncates_a_noisy_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("App")).unwrap();
    fs::write(dir.path().join("demo.sln"), SLN).unwrap();
    fs::write(dir.path().join("App/App.vcxproj"), project_xml(&["noisy.c"])).unwrap();
    fs::create_dir_all(dir.path().join("Lib")).unwrap();
    fs::write(dir.path().join("Lib/Lib.vcxproj"), project_xml(&[])).unwrap();
    fs::write(dir.path().join("App/noisy.c"), "aa ".repeat(250)).unwrap();

    let config = BoreConfig::default();
    let sln_parser = SolutionParser::new();
    let project_parser = ProjectFileParser::new();
    let sln_text = fs::read_to_string(dir.path().join("demo.sln")).unwrap();
    let mut loader = ManifestLoader::new(dir.path().to_path_buf(), &config);
    for raw in sln_parser.parse(&sln_text) {
        let project = loader
            .begin_project(&raw.name, &raw.sln_guid, raw.parent_guid.as_deref(), raw.raw_path.as_deref())
            .unwrap();
        let Some(project_file) = loader.project_file_path(project).map(str::to_owned) else {
            continue;
        };
        let text = fs::read_to_string(&project_file).unwrap();
        let project_dir = loader.project_dir(project);
        for include in project_parser.parse(&text) {
            loader.add_file(&include, project, &project_dir);
        }
    }
    let index = loader.finish(&dir.path().join("demo.sln")).unwrap();

    let opts = SearchOptions { thread_count: 1, per_file_cap: 100, match_cap: 1000, ..SearchOptions::default() };
    let result = query::find(&index, "aa", &[], &opts);
    assert_eq!(result.matches.len(), 100);
    assert_eq!(result.truncated, Truncation::Soft);
}
