//! Data types passed between the analysis phases.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of a top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclarationKind {
    Function,
    Method,
    /// Any named type except function types.
    Type,
    /// `type Handler func(...)`; never enters the catalog.
    FunctionType,
}

/// A top-level declaration extracted from a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub line: usize,
}

/// An import clause: `alias "path"` or just `"path"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    pub alias: Option<String>,
    pub path: String,
}

impl ImportSpec {
    /// The identifier the importing file uses to refer to the package.
    pub fn local_name(&self) -> &str {
        match self.alias {
            Some(ref alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// A struct field whose type is a package-qualified reference (`pkg.Type`
/// or `*pkg.Type`). Embedded fields have no names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifiedField {
    pub names: Vec<String>,
    pub package: String,
    pub type_name: String,
}

/// Selector shapes the resolver knows how to match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorShape {
    /// `x.field.member`, whether or not it is called.
    Chained {
        field: String,
        member: String,
        line: usize,
    },
    /// `ident.Name(...)`.
    QualifiedCall {
        qualifier: String,
        name: String,
        line: usize,
    },
}

/// Callee side of a call edge: the function and the file declaring it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalleeRef {
    pub file: String,
    pub function: String,
}

impl CalleeRef {
    pub fn new(file: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            function: function.into(),
        }
    }
}

/// Caller side of an inverted edge, as displayed in a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallerRef {
    /// Caller file name up to its first `.`.
    pub caller: String,
    pub function: String,
}

/// A source file selected by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// Display name of a file: everything before the first `.`.
pub fn base_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}
