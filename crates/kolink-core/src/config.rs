//! Run configuration: one YAML file describing any number of analysis jobs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KolinkError, Result};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "kolink.yml";

/// Layout engines understood by Graphviz.
pub const LAYOUT_ENGINES: &[&str] = &[
    "dot",
    "neato",
    "fdp",
    "sfdp",
    "circo",
    "twopi",
    "osage",
    "patchwork",
];

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    #[serde(default)]
    pub repository_name: String,
    #[serde(default)]
    pub request_defs: Vec<RequestDef>,
}

/// One analysis job: a callee tree, a caller tree and where to draw the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDef {
    pub out_dir: PathBuf,
    pub callee: CalleeDef,
    pub caller: CallerDef,
    #[serde(default)]
    pub file_params: Vec<FileParam>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalleeDef {
    pub dir: PathBuf,
    #[serde(flatten)]
    pub files: FileFilter,
    #[serde(flatten)]
    pub functions: FunctionFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerDef {
    pub dir: PathBuf,
    #[serde(flatten)]
    pub files: FileFilter,
}

/// File-level filters, shared by both sides of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFilter {
    /// Allow-list of file names; empty admits every file.
    #[serde(default)]
    pub file_focus: HashSet<String>,
    #[serde(default)]
    pub ignore_test: bool,
}

impl FileFilter {
    /// Whether the focus list admits `file_name`.
    pub fn in_focus(&self, file_name: &str) -> bool {
        self.file_focus.is_empty() || self.file_focus.contains(file_name)
    }
}

/// Function-level filters, callee side only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionFilter {
    /// Allow-list of function names; empty admits every function.
    #[serde(default)]
    pub func_focus: HashSet<String>,
    #[serde(default)]
    pub ignore_new_func: bool,
    /// Only resolve `x.field.Method` when `Method` is declared in the
    /// field type's file.
    #[serde(default)]
    pub strict_methods: bool,
}

impl FunctionFilter {
    /// Whether the focus list admits `name`.
    pub fn in_focus(&self, name: &str) -> bool {
        self.func_focus.is_empty() || self.func_focus.contains(name)
    }
}

/// Per-callee-file rendering parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileParam {
    pub file_name: String,
    /// One image per callee function instead of one per callee file.
    #[serde(default)]
    pub split: bool,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

/// A global graph attribute, e.g. `rankdir = LR`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl RequestDef {
    /// Rendering parameters configured for a callee file, if any.
    pub fn file_param(&self, file_name: &str) -> Option<&FileParam> {
        self.file_params.iter().find(|p| p.file_name == file_name)
    }

    fn validate(&self, index: usize, path: &Path) -> Result<()> {
        let invalid = |message: String| KolinkError::Config {
            path: path.to_path_buf(),
            message: format!("requestDefs[{index}]: {message}"),
        };

        if self.out_dir.as_os_str().is_empty() {
            return Err(invalid("outDir must not be empty".to_string()));
        }
        if self.callee.dir.as_os_str().is_empty() {
            return Err(invalid("callee.dir must not be empty".to_string()));
        }
        if self.caller.dir.as_os_str().is_empty() {
            return Err(invalid("caller.dir must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for param in &self.file_params {
            if !seen.insert(param.file_name.as_str()) {
                return Err(invalid(format!(
                    "fileParams declares '{}' more than once",
                    param.file_name
                )));
            }
        }
        Ok(())
    }
}

impl RunConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| KolinkError::io(path, e))?;
        Self::from_yaml_str(&text, path)
    }

    /// Parse and validate configuration text. `origin` is only used in errors.
    pub fn from_yaml_str(text: &str, origin: &Path) -> Result<Self> {
        let config: RunConfig =
            serde_yaml::from_str(text).map_err(|source| KolinkError::ConfigParse {
                path: origin.to_path_buf(),
                source,
            })?;
        config.validate(origin)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.request_defs.is_empty() {
            return Err(KolinkError::Config {
                path: path.to_path_buf(),
                message: "requestDefs must declare at least one job".to_string(),
            });
        }
        for (i, request) in self.request_defs.iter().enumerate() {
            request.validate(i, path)?;
        }
        Ok(())
    }
}
