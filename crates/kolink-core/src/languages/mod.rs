//! Language analyser trait and tree-sitter parsing helper.

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::{KolinkError, Result};
use crate::model::{Declaration, ImportSpec, QualifiedField, SelectorShape};

pub mod go_lang;

pub use go_lang::GoAnalyser;

/// Syntactic knowledge about one source language.
///
/// Analysers only report what the syntax says; deciding which declarations
/// enter the catalog and which selectors become edges is left to the phases.
pub trait LanguageAnalyser: Send + Sync {
    /// File extensions this analyser handles (e.g. &["go"]).
    fn extensions(&self) -> &[&str];

    /// Human-readable language name (e.g. "Go").
    fn language_name(&self) -> &str;

    /// Get the tree-sitter Language for parsing.
    fn get_language(&self) -> Language;

    /// Whether a file name follows the language's test-file convention.
    fn is_test_file(&self, file_name: &str) -> bool;

    /// Whether a function name follows the constructor convention.
    fn is_constructor(&self, name: &str) -> bool;

    /// Whether a declared name is visible outside its package.
    fn is_exported(&self, name: &str) -> bool;

    /// Top-level functions, methods and types.
    fn extract_declarations(&self, tree: &Tree, source: &[u8]) -> Vec<Declaration>;

    /// Import clauses usable as call qualifiers.
    fn extract_imports(&self, tree: &Tree, source: &[u8]) -> Vec<ImportSpec>;

    /// Struct fields typed as a package-qualified type.
    fn extract_qualified_fields(&self, tree: &Tree, source: &[u8]) -> Vec<QualifiedField>;

    /// Every chained selector and qualified call in the file.
    fn extract_selectors(&self, tree: &Tree, source: &[u8]) -> Vec<SelectorShape>;

    /// Whether a file name carries one of this analyser's extensions.
    fn is_source_file(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}

/// Parse `source` and reject trees that contain syntax errors.
pub fn parse_source(analyser: &dyn LanguageAnalyser, path: &Path, source: &[u8]) -> Result<Tree> {
    let parse_error = |message: String| KolinkError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut parser = Parser::new();
    parser
        .set_language(&analyser.get_language())
        .map_err(|e| parse_error(format!("{} grammar unavailable: {e}", analyser.language_name())))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| parse_error("parser produced no tree".to_string()))?;

    if let Some(node) = first_error(tree.root_node()) {
        let pos = node.start_position();
        return Err(parse_error(format!(
            "syntax error at {}:{}",
            pos.row + 1,
            pos.column + 1
        )));
    }
    Ok(tree)
}

fn first_error(node: Node) -> Option<Node> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    for i in 0..node.child_count() {
        if let Some(found) = node.child(i).and_then(first_error) {
            return Some(found);
        }
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_go() {
        let analyser = GoAnalyser::new();
        let tree = parse_source(
            &analyser,
            Path::new("ok.go"),
            b"package ok\n\nfunc Run() {}\n",
        )
        .unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
    }

    #[test]
    fn syntax_error_is_reported_with_position() {
        let analyser = GoAnalyser::new();
        let err = parse_source(
            &analyser,
            Path::new("broken.go"),
            b"package broken\n\nfunc Run( {\n",
        )
        .unwrap_err();
        match err {
            KolinkError::Parse { path, message } => {
                assert_eq!(path, Path::new("broken.go"));
                assert!(message.starts_with("syntax error at"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn source_file_detection() {
        let analyser = GoAnalyser::new();
        assert!(analyser.is_source_file("main.go"));
        assert!(analyser.is_source_file("main_test.go"));
        assert!(!analyser.is_source_file("main.go.bak"));
        assert!(!analyser.is_source_file("README.md"));
        assert!(!analyser.is_source_file("go"));
    }
}
