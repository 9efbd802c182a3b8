//! Walk a source tree and select the files a phase should parse.

use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::config::FileFilter;
use crate::error::{KolinkError, Result};
use crate::languages::LanguageAnalyser;
use crate::model::SourceFile;

/// Collect every regular source file under `root` admitted by `filter`.
///
/// Files are visited depth-first in file-name order. Any unreadable entry
/// aborts the walk.
pub fn collect_source_files(
    root: &Path,
    filter: &FileFilter,
    analyser: &dyn LanguageAnalyser,
) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| KolinkError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().to_string();
        if !analyser.is_source_file(&file_name) {
            continue;
        }
        if filter.ignore_test && analyser.is_test_file(&file_name) {
            debug!("skipping test file {}", entry.path().display());
            continue;
        }
        if !filter.in_focus(&file_name) {
            debug!("skipping {} (not in file focus)", entry.path().display());
            continue;
        }

        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            file_name,
        });
    }

    Ok(files)
}

/// Read a selected file's bytes.
pub fn read_source(file: &SourceFile) -> Result<Vec<u8>> {
    std::fs::read(&file.path).map_err(|e| KolinkError::io(&file.path, e))
}
