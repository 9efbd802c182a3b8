//! Phase 4: assemble and render one graph document per partition.

use std::path::{Path, PathBuf};

use log::debug;

use crate::config::{FileParam, LAYOUT_ENGINES};
use crate::error::{KolinkError, Result};
use crate::graph::document::{Cluster, GraphDocument};
use crate::output::RenderBackend;
use crate::phases::partition::Partition;

/// Build the graph document for a partition, styled by its callee file's
/// parameters. `target` is only used to label errors.
pub fn build_document(
    partition: &Partition,
    param: Option<&FileParam>,
    target: &Path,
) -> Result<GraphDocument> {
    let mut doc = GraphDocument::new();

    if let Some(param) = param {
        for attr in &param.attributes {
            doc.set_attribute(&attr.name, &attr.value)
                .map_err(|e| KolinkError::render(target, e.to_string()))?;
        }
        if let Some(layout) = param.layout.as_deref().filter(|l| !l.is_empty()) {
            if !LAYOUT_ENGINES.contains(&layout) {
                return Err(KolinkError::render(
                    target,
                    format!("unknown layout engine '{layout}'"),
                ));
            }
            doc.set_attribute("layout", layout)
                .map_err(|e| KolinkError::render(target, e.to_string()))?;
        }
    }

    for edge in &partition.edges {
        doc.add_call(&edge.caller, &edge.function);
    }
    Ok(doc)
}

/// Render one partition, creating its output directory first.
/// Returns the written file's path.
pub fn render_partition(
    partition: &Partition,
    param: Option<&FileParam>,
    backend: &dyn RenderBackend,
) -> Result<PathBuf> {
    let target = partition.target(backend.extension());
    let doc = build_document(partition, param, &target)?;

    std::fs::create_dir_all(&partition.out_dir)
        .map_err(|e| KolinkError::io(&partition.out_dir, e))?;
    backend.render(&doc.to_dot(), &target)?;

    debug!(
        "rendered {} ({} nodes: {} callers, {} callees; {} edges)",
        target.display(),
        doc.node_count(),
        doc.cluster_size(Cluster::Caller),
        doc.cluster_size(Cluster::Callee),
        doc.edge_count()
    );
    Ok(target)
}
