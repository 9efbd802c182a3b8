//! Phase 3: invert caller usages per callee file and cut them into images.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::config::RequestDef;
use crate::model::{base_name, CallerRef};
use crate::phases::resolve::CallerUsage;

/// Callee file name → (caller base name, callee function) pairs.
pub type EdgeIndex = BTreeMap<String, Vec<CallerRef>>;

/// The edges destined for one output image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub callee_file: String,
    /// Set when the callee file is split per function.
    pub function: Option<String>,
    pub out_dir: PathBuf,
    /// Image file stem.
    pub name: String,
    pub edges: Vec<CallerRef>,
}

impl Partition {
    /// Output path for an image with the given extension.
    pub fn target(&self, extension: &str) -> PathBuf {
        self.out_dir.join(format!("{}.{extension}", self.name))
    }
}

/// Re-key caller usages by callee file.
pub fn invert(usage: &CallerUsage) -> EdgeIndex {
    let mut index = EdgeIndex::new();
    for (caller_file, callees) in usage {
        let caller = base_name(caller_file);
        for callee in callees {
            index
                .entry(callee.file.clone())
                .or_default()
                .push(CallerRef {
                    caller: caller.to_string(),
                    function: callee.function.clone(),
                });
        }
    }
    index
}

/// Cut the edge index into partitions according to each callee file's
/// `split` setting. Split files render under `<out_root>/<base name>/`.
pub fn run_partition_phase(index: EdgeIndex, request: &RequestDef, out_root: &Path) -> Vec<Partition> {
    let mut partitions = Vec::new();

    for (callee_file, edges) in index {
        let stem = base_name(&callee_file).to_string();
        let split = request
            .file_param(&callee_file)
            .is_some_and(|param| param.split);

        if split {
            let out_dir = out_root.join(&stem);
            let mut by_function: BTreeMap<String, Vec<CallerRef>> = BTreeMap::new();
            for edge in edges {
                by_function
                    .entry(edge.function.clone())
                    .or_default()
                    .push(edge);
            }
            for (function, edges) in by_function {
                partitions.push(Partition {
                    callee_file: callee_file.clone(),
                    function: Some(function.clone()),
                    out_dir: out_dir.clone(),
                    name: function,
                    edges,
                });
            }
        } else {
            partitions.push(Partition {
                callee_file,
                function: None,
                out_dir: out_root.to_path_buf(),
                name: stem,
                edges,
            });
        }
    }

    info!("{} partitions to render", partitions.len());
    partitions
}
