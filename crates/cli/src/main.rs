//! bore CLI — solution-aware source search from the terminal.
//!
//! Calls `bore-core` directly: no server, no persistent index. Every
//! invocation re-parses the solution (and, for commands that touch file
//! contents, the referenced project files) from scratch.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use bore_core::config::BoreConfig;
use bore_core::error::BoreError;
use bore_core::index::{FileIndex, Index};
use bore_core::manifest::{ManifestLoader, ProjectFileParser, SolutionParser};
use bore_core::query;
use bore_core::search::{SearchOptions, Truncation};
use bore_core::toggle;

/// bore — solution-aware source search.
#[derive(Parser)]
#[command(name = "bore", version, about)]
struct Cli {
    /// Path to a `.sln` file, or a directory to look for one in
    /// (default: current directory).
    #[arg(long, global = true)]
    sln: Option<PathBuf>,

    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Substring search across every indexed file: `[-e ext1,ext2,...] needle`.
    Find {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,

        /// Worker thread count, clamped to [1, 32].
        #[arg(long)]
        threads: Option<usize>,

        /// Global match cap (M).
        #[arg(long)]
        match_cap: Option<usize>,

        /// Per-file match cap (F).
        #[arg(long)]
        per_file_cap: Option<usize>,
    },
    /// Switch to the companion header/source file for `path`.
    Toggle { path: PathBuf },
    /// List every indexed file, optionally scoped to one project.
    List {
        #[arg(long)]
        project: Option<String>,
    },
    /// Print a one-line solution summary (path, project count, file count).
    Status,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("bore=warn".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let sln_path = match find_solution(cli.sln.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let index = match load_index(&sln_path) {
        Ok(idx) => idx,
        Err(e) => {
            eprintln!("failed to load {}: {e}", sln_path.display());
            std::process::exit(1);
        }
    };
    tracing::info!(
        sln = %index.sln_path(),
        projects = index.projects.len(),
        files = index.file_count(),
        "loaded solution"
    );

    match cli.command {
        Commands::Find { query, threads, match_cap, per_file_cap } => {
            run_find(&index, &query.join(" "), threads, match_cap, per_file_cap, cli.json)
        }
        Commands::Toggle { path } => run_toggle(&index, &path, cli.json),
        Commands::List { project } => run_list(&index, project.as_deref(), cli.json),
        Commands::Status => run_status(&index, cli.json),
    }
}

/// Resolve the `.sln` to load: an explicit file, the first `.sln` found in
/// an explicit directory, or the first `.sln` found in the current
/// directory.
fn find_solution(explicit: Option<&Path>) -> Result<PathBuf, String> {
    let start = explicit.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    if start.extension().is_some_and(|e| e.eq_ignore_ascii_case("sln")) {
        return std::fs::canonicalize(&start).map_err(|e| format!("{}: {e}", start.display()));
    }
    let dir = std::fs::canonicalize(&start).map_err(|e| format!("{}: {e}", start.display()))?;
    let entries = std::fs::read_dir(&dir).map_err(|e| format!("{}: {e}", dir.display()))?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("sln")))
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| format!("no .sln file found in {}", dir.display()))
}

/// Parse `sln_path` and every project file it references into a fresh
/// [`Index`]. This is the CLI's concrete stand-in for the "host editor"
/// collaborator the core crate treats as an external interface.
fn load_index(sln_path: &Path) -> Result<Index, BoreError> {
    let sln_dir = sln_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    let config = BoreConfig::load(&sln_dir)?;

    let sln_text = std::fs::read_to_string(sln_path).map_err(|source| BoreError::ManifestNotOpenable {
        path: sln_path.to_path_buf(),
        source,
    })?;

    let sln_parser = SolutionParser::new();
    let project_parser = ProjectFileParser::new();
    let raw_projects = sln_parser.parse(&sln_text);

    let mut loader = ManifestLoader::new(sln_dir.clone(), &config);
    for raw in &raw_projects {
        let project = loader.begin_project(
            &raw.name,
            &raw.sln_guid,
            raw.parent_guid.as_deref(),
            raw.raw_path.as_deref(),
        )?;
        let Some(project_file) = loader.project_file_path(project) else {
            // Solution folder: no buildable project file, nothing to scan.
            continue;
        };
        let Ok(project_text) = std::fs::read_to_string(project_file) else {
            tracing::debug!(path = %project_file, "project file not readable, skipping its includes");
            continue;
        };
        let project_dir = loader.project_dir(project);
        for include in project_parser.parse(&project_text) {
            loader.add_file(&include.replace('\\', "/"), project, &project_dir);
        }
    }
    loader.finish(sln_path)
}

fn run_find(
    index: &Index,
    query_str: &str,
    threads: Option<usize>,
    match_cap: Option<usize>,
    per_file_cap: Option<usize>,
    json: bool,
) {
    let parsed = query::parse_find_args(query_str);
    if parsed.needle.is_empty() {
        eprintln!("empty needle");
        std::process::exit(1);
    }

    let defaults = SearchOptions::default();
    let opts = SearchOptions {
        thread_count: threads.unwrap_or(defaults.thread_count),
        match_cap: match_cap.unwrap_or(defaults.match_cap),
        per_file_cap: per_file_cap.unwrap_or(defaults.per_file_cap),
        line_cap: defaults.line_cap,
    };

    let result = query::find(index, &parsed.needle, &parsed.extensions, &opts);
    tracing::info!(
        needle = %parsed.needle,
        matches = result.matches.len(),
        truncated = ?result.truncated,
        "find complete"
    );

    if json {
        let items: Vec<serde_json::Value> = result
            .matches
            .iter()
            .map(|m| {
                serde_json::json!({
                    "path": display_path(index, m.file),
                    "row": m.row,
                    "column": m.column,
                    "line": m.line,
                })
            })
            .collect();
        let output = serde_json::json!({
            "matches": items,
            "truncated": truncation_code(result.truncated),
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        for m in &result.matches {
            println!("{}:{}:{}:{}", display_path(index, m.file), m.row, m.column, m.line);
        }
        match result.truncated {
            Truncation::None => eprintln!("\n{} matches", result.matches.len()),
            Truncation::Soft => eprintln!("\n{} matches (truncated)", result.matches.len()),
            Truncation::Hard => eprintln!("\n{} matches (truncated, search cut short)", result.matches.len()),
        }
    }

    if matches!(result.truncated, Truncation::Hard) {
        std::process::exit(2);
    }
}

fn run_toggle(index: &Index, path: &Path, json: bool) {
    let Some(current) = file_index_for(index, path) else {
        eprintln!("{} is not in the index", path.display());
        std::process::exit(1);
    };
    match toggle::query(&index.toggle, &index.files, &index.strings, current) {
        Some(target) => {
            let target_path = index.path(target);
            if json {
                println!("{}", serde_json::json!({ "path": target_path }));
            } else {
                println!("{target_path}");
            }
        }
        None => {
            eprintln!("no companion file for {}", path.display());
            std::process::exit(1);
        }
    }
}

fn run_list(index: &Index, project: Option<&str>, json: bool) {
    let files: Vec<FileIndex> = match project {
        Some(name) => {
            let Some(project_idx) =
                (0..index.projects.len() as u32).find(|&i| index.project_name(i).eq_ignore_ascii_case(name))
            else {
                eprintln!("no project named {name}");
                std::process::exit(1);
            };
            index.files_of_project(project_idx).collect()
        }
        None => (0..index.file_count() as FileIndex).collect(),
    };

    if json {
        let items: Vec<&str> = files.iter().map(|&f| index.path(f)).collect();
        println!("{}", serde_json::to_string_pretty(&items).unwrap());
    } else {
        for f in files {
            println!("{}", display_path(index, f));
        }
    }
}

fn run_status(index: &Index, json: bool) {
    if json {
        let output = serde_json::json!({
            "sln": index.sln_path(),
            "projects": index.projects.len(),
            "files": index.file_count(),
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("{}, {} projects, {} files", index.sln_path(), index.projects.len(), index.file_count());
    }
}

/// Find the [`FileIndex`] whose canonical path matches `path`
/// case-insensitively, resolving `path` against the current directory first.
fn file_index_for(index: &Index, path: &Path) -> Option<FileIndex> {
    let resolved = std::fs::canonicalize(path).ok()?;
    let target = resolved.to_string_lossy();
    (0..index.file_count() as FileIndex).find(|&f| index.path(f).eq_ignore_ascii_case(&target))
}

/// `PATH` as printed in match/list output: relative to the solution
/// directory when the file lives within it, absolute otherwise.
fn display_path(index: &Index, file: FileIndex) -> String {
    let path = index.path(file);
    let sln_dir = index.sln_dir();
    match Path::new(path).strip_prefix(sln_dir) {
        Ok(rel) => rel.to_string_lossy().into_owned(),
        Err(_) => path.to_string(),
    }
}

fn truncation_code(t: Truncation) -> i32 {
    match t {
        Truncation::None => 0,
        Truncation::Soft => 1,
        Truncation::Hard => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_path_strips_solution_dir() {
        // exercised indirectly via index-backed tests in bore-core; this
        // crate only formats strings, so cover that directly.
        let sln_dir = "/solutions/foo";
        let file_path = "/solutions/foo/src/main.cpp";
        let rel = Path::new(file_path).strip_prefix(sln_dir).unwrap();
        assert_eq!(rel.to_string_lossy(), "src/main.cpp");
    }

    #[test]
    fn display_path_keeps_absolute_outside_solution() {
        let sln_dir = "/solutions/foo";
        let file_path = "/elsewhere/lib.h";
        assert!(Path::new(file_path).strip_prefix(sln_dir).is_err());
    }
}
