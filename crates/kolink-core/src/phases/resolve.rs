//! Phase 2: resolve which catalog functions each caller file uses.
//!
//! Resolution is syntactic. Each caller file goes through two passes:
//!
//! 1. build a [`FileIndex`] from its struct fields and imports;
//! 2. match every selector shape in the file against that index and the
//!    catalog, with no further state.
//!
//! Two shapes produce edges:
//!
//! - `x.field.Member`, where `field` is a struct field typed as a catalog
//!   type: `Member` is attributed to the file declaring that type.
//! - `ident.Func(...)`, where `Func` is a catalog function. It is
//!   attributed to the file the catalog records for it:
//!   - once when `ident` is an imported package identifier;
//!   - once more for every callee file whose types the caller holds in a
//!     field and which declares `Func`, whatever `ident` is. This catches
//!     calls through local variables of those types (`st := s.db; st.Get()`).
//!
//! Duplicate edges are expected and left for the renderer to collapse.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, info};

use crate::config::{CallerDef, FunctionFilter};
use crate::error::Result;
use crate::graph::catalog::Catalog;
use crate::languages::{parse_source, LanguageAnalyser};
use crate::model::{CalleeRef, ImportSpec, QualifiedField, SelectorShape};
use crate::phases::catalog::admits_function;
use crate::phases::structure::{collect_source_files, read_source};

/// Caller file name → callee functions it uses (duplicates kept).
pub type CallerUsage = BTreeMap<String, Vec<CalleeRef>>;

/// Read-only per-file indexes built before any call is matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    /// Struct field name → catalog type name.
    pub variable_types: HashMap<String, String>,
    /// Callee files declaring a type held in one of this file's fields.
    pub used_callee_files: BTreeSet<String>,
    /// Local package identifier → import path.
    pub packages: HashMap<String, String>,
}

impl FileIndex {
    pub fn build(fields: &[QualifiedField], imports: &[ImportSpec], catalog: &Catalog) -> Self {
        let mut index = Self::default();

        for field in fields {
            let Some(type_file) = catalog.type_file(&field.type_name) else {
                continue;
            };
            for name in &field.names {
                index
                    .variable_types
                    .insert(name.clone(), field.type_name.clone());
            }
            index.used_callee_files.insert(type_file.to_string());
        }

        for import in imports {
            index
                .packages
                .insert(import.local_name().to_string(), import.path.clone());
        }
        index
    }
}

/// Shared inputs of the matching rules.
pub struct Matcher<'a> {
    pub analyser: &'a dyn LanguageAnalyser,
    pub catalog: &'a Catalog,
    pub functions: &'a FunctionFilter,
}

impl Matcher<'_> {
    /// `x.field.member`: attribute `member` to the file of `field`'s type.
    ///
    /// `member` must pass the same name filters as catalog functions. Only
    /// with `strict_methods` must it also be declared in that file.
    pub fn match_chained(&self, index: &FileIndex, field: &str, member: &str) -> Option<CalleeRef> {
        let type_name = index.variable_types.get(field)?;
        if !admits_function(self.analyser, self.functions, member) {
            return None;
        }
        let file = self.catalog.type_file(type_name)?;
        if self.functions.strict_methods && !self.catalog.declares(file, member) {
            return None;
        }
        Some(CalleeRef::new(file, member))
    }

    /// `qualifier.name(...)` with an identifier qualifier.
    ///
    /// An imported `qualifier` yields the direct edge. Each callee file held
    /// through one of this file's fields and declaring `name` yields one more,
    /// whether or not `qualifier` is an import.
    pub fn match_qualified_call(
        &self,
        index: &FileIndex,
        qualifier: &str,
        name: &str,
    ) -> Vec<CalleeRef> {
        let mut edges = Vec::new();
        if !self.functions.in_focus(name) {
            return edges;
        }
        let Some(file) = self.catalog.function_file(name) else {
            return edges;
        };

        if index.packages.contains_key(qualifier) {
            edges.push(CalleeRef::new(file, name));
        }
        for used in &index.used_callee_files {
            if self.catalog.declares(used, name) {
                edges.push(CalleeRef::new(file, name));
            }
        }
        edges
    }

    pub fn match_shape(&self, index: &FileIndex, shape: &SelectorShape) -> Vec<CalleeRef> {
        match shape {
            SelectorShape::Chained { field, member, .. } => {
                self.match_chained(index, field, member).into_iter().collect()
            }
            SelectorShape::QualifiedCall {
                qualifier, name, ..
            } => self.match_qualified_call(index, qualifier, name),
        }
    }

    /// Second pass over one file: every edge its selector shapes resolve to.
    pub fn scan(&self, index: &FileIndex, shapes: &[SelectorShape]) -> Vec<CalleeRef> {
        shapes
            .iter()
            .flat_map(|shape| self.match_shape(index, shape))
            .collect()
    }
}

/// Resolve every caller file against the catalog. Any parse failure aborts.
pub fn run_resolve_phase(
    caller: &CallerDef,
    functions: &FunctionFilter,
    catalog: &Catalog,
    analyser: &dyn LanguageAnalyser,
) -> Result<CallerUsage> {
    let matcher = Matcher {
        analyser,
        catalog,
        functions,
    };
    let mut usage = CallerUsage::new();

    for file in collect_source_files(&caller.dir, &caller.files, analyser)? {
        let source = read_source(&file)?;
        let tree = parse_source(analyser, &file.path, &source)?;

        let index = FileIndex::build(
            &analyser.extract_qualified_fields(&tree, &source),
            &analyser.extract_imports(&tree, &source),
            catalog,
        );
        let edges = matcher.scan(&index, &analyser.extract_selectors(&tree, &source));
        for edge in &edges {
            debug!("{} -> {}:{}", file.file_name, edge.file, edge.function);
        }

        // Same-named files in different directories share one entry.
        usage.entry(file.file_name).or_default().extend(edges);
    }

    info!(
        "resolved {} caller files, {} edges",
        usage.len(),
        usage.values().map(Vec::len).sum::<usize>()
    );
    Ok(usage)
}
