//! Phase 1: catalog the exported functions and types of the callee tree.

use log::{debug, info};

use crate::config::{CalleeDef, FunctionFilter};
use crate::error::Result;
use crate::graph::catalog::Catalog;
use crate::languages::{parse_source, LanguageAnalyser};
use crate::model::DeclarationKind;
use crate::phases::structure::{collect_source_files, read_source};

/// Build the catalog for a callee tree. Any parse failure aborts the build.
pub fn run_catalog_phase(callee: &CalleeDef, analyser: &dyn LanguageAnalyser) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    for file in collect_source_files(&callee.dir, &callee.files, analyser)? {
        let source = read_source(&file)?;
        let tree = parse_source(analyser, &file.path, &source)?;

        for decl in analyser.extract_declarations(&tree, &source) {
            match decl.kind {
                DeclarationKind::Function | DeclarationKind::Method => {
                    if admits_function(analyser, &callee.functions, &decl.name) {
                        catalog.add_function(&file.file_name, &decl.name);
                    }
                }
                DeclarationKind::Type => {
                    if analyser.is_exported(&decl.name) {
                        catalog.add_type(&file.file_name, &decl.name);
                    }
                }
                DeclarationKind::FunctionType => {}
            }
        }
        debug!(
            "catalogued {}: {} functions",
            file.file_name,
            catalog
                .functions_in_file(&file.file_name)
                .map_or(0, |f| f.len())
        );
    }

    info!(
        "catalog: {} files, {} functions, {} types",
        catalog.file_count(),
        catalog.function_count(),
        catalog.type_count()
    );
    Ok(catalog)
}

/// Whether a declared function name may enter the catalog.
pub fn admits_function(
    analyser: &dyn LanguageAnalyser,
    filter: &FunctionFilter,
    name: &str,
) -> bool {
    if filter.ignore_new_func && analyser.is_constructor(name) {
        return false;
    }
    filter.in_focus(name) && analyser.is_exported(name)
}
