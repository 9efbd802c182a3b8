//! Shared test helpers for integration tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use kolink_core::config::{CalleeDef, CallerDef, FileFilter, FileParam, RequestDef};
use kolink_core::graph::catalog::Catalog;
use kolink_core::languages::GoAnalyser;
use kolink_core::output::{DotFileBackend, RenderBackend};
use kolink_core::phases::resolve::CallerUsage;
use kolink_core::{KolinkError, Result};

// ---------------------------------------------------------------------------
// Fixture path resolution
// ---------------------------------------------------------------------------

/// Resolve `tests/fixtures/{name}` relative to the workspace root.
pub fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir)
        .join("../../tests/fixtures")
        .join(name)
        .canonicalize()
        .unwrap_or_else(|_| {
            Path::new(manifest_dir)
                .join("../../tests/fixtures")
                .join(name)
        })
}

/// A job over the `go_project` fixture with test files ignored on both sides.
pub fn go_project_request(out_dir: &Path) -> RequestDef {
    request_for(&fixture_path("go_project"), out_dir)
}

/// A job over `<root>/callee` and `<root>/caller` with test files ignored.
pub fn request_for(root: &Path, out_dir: &Path) -> RequestDef {
    let skip_tests = FileFilter {
        ignore_test: true,
        ..Default::default()
    };
    RequestDef {
        out_dir: out_dir.to_path_buf(),
        callee: CalleeDef {
            dir: root.join("callee"),
            files: skip_tests.clone(),
            functions: Default::default(),
        },
        caller: CallerDef {
            dir: root.join("caller"),
            files: skip_tests,
        },
        file_params: Vec::new(),
    }
}

pub fn split_param(file_name: &str) -> FileParam {
    FileParam {
        file_name: file_name.to_string(),
        split: true,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Temporary Go trees
// ---------------------------------------------------------------------------

/// Write `files` (relative path, contents) under `root`, creating directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (rel, contents) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        std::fs::write(&path, contents).expect("Failed to write fixture file");
    }
}

// ---------------------------------------------------------------------------
// Phase runners
// ---------------------------------------------------------------------------

pub fn run_catalog(request: &RequestDef) -> Catalog {
    kolink_core::phases::catalog::run_catalog_phase(&request.callee, &GoAnalyser::new())
        .expect("catalog phase failed")
}

pub fn run_resolve(request: &RequestDef) -> CallerUsage {
    let catalog = run_catalog(request);
    kolink_core::phases::resolve::run_resolve_phase(
        &request.caller,
        &request.callee.functions,
        &catalog,
        &GoAnalyser::new(),
    )
    .expect("resolve phase failed")
}

/// `(file, function)` pairs resolved for one caller file, in discovery order.
pub fn edges_of(usage: &CallerUsage, caller_file: &str) -> Vec<(String, String)> {
    usage
        .get(caller_file)
        .map(|refs| {
            refs.iter()
                .map(|r| (r.file.clone(), r.function.clone()))
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Render backends
// ---------------------------------------------------------------------------

/// Writes DOT files but fails for targets whose file stem is `fail_on`.
pub struct FailingBackend {
    pub fail_on: String,
}

impl RenderBackend for FailingBackend {
    fn extension(&self) -> &str {
        "dot"
    }

    fn render(&self, dot: &str, target: &Path) -> Result<()> {
        let stem = target.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        if stem == self.fail_on {
            return Err(KolinkError::render(target, "renderer crashed"));
        }
        DotFileBackend.render(dot, target)
    }
}

/// Writes DOT files and remembers every document it was handed.
#[derive(Default)]
pub struct RecordingBackend {
    pub rendered: RefCell<Vec<(PathBuf, String)>>,
}

impl RecordingBackend {
    pub fn dot_for(&self, stem: &str) -> Option<String> {
        self.rendered
            .borrow()
            .iter()
            .find(|(path, _)| path.file_stem().and_then(|s| s.to_str()) == Some(stem))
            .map(|(_, dot)| dot.clone())
    }
}

impl RenderBackend for RecordingBackend {
    fn extension(&self) -> &str {
        "dot"
    }

    fn render(&self, dot: &str, target: &Path) -> Result<()> {
        DotFileBackend.render(dot, target)?;
        self.rendered
            .borrow_mut()
            .push((target.to_path_buf(), dot.to_string()));
        Ok(())
    }
}
