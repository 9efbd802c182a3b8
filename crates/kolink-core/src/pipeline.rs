//! Sequential job runner: catalog → resolve → partition → render.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{error, info, warn};
use serde::Serialize;

use crate::config::RequestDef;
use crate::error::{KolinkError, Result};
use crate::languages::LanguageAnalyser;
use crate::output::RenderBackend;
use crate::phases;

/// Phase labels for progress reporting.
const PHASE_LABELS: &[(&str, &str)] = &[
    ("catalog", "Cataloguing callee tree"),
    ("resolve", "Resolving caller usages"),
    ("partition", "Partitioning edges"),
    ("render", "Rendering graphs"),
];

/// Progress callback type: (phase_name, label).
pub type ProgressCallback = Box<dyn FnMut(&str, &str)>;

/// A partition whose image could not be produced.
#[derive(Debug, Clone, Serialize)]
pub struct PartitionFailure {
    pub target: PathBuf,
    pub message: String,
}

/// Outcome of one job.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobReport {
    pub out_dir: PathBuf,
    pub callee_files: usize,
    pub caller_files: usize,
    /// Raw edge count before any deduplication.
    pub edges: usize,
    pub rendered: Vec<PathBuf>,
    pub failures: Vec<PartitionFailure>,
    /// Seconds spent per phase.
    pub phase_timings: BTreeMap<String, f64>,
}

impl JobReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

fn announce(progress: &mut Option<ProgressCallback>, name: &str) {
    if let Some(ref mut cb) = progress {
        let label = PHASE_LABELS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, l)| *l)
            .unwrap_or(name);
        cb(name, label);
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| KolinkError::io(path, e))
}

/// Run one job.
///
/// Catalog and resolve failures abort the job before any image is written.
/// A failing partition is recorded in the report; the others still render.
pub fn run_job(
    request: &RequestDef,
    analyser: &dyn LanguageAnalyser,
    backend: &dyn RenderBackend,
    mut progress: Option<ProgressCallback>,
) -> Result<JobReport> {
    let mut report = JobReport {
        out_dir: absolute(&request.out_dir)?,
        ..Default::default()
    };

    announce(&mut progress, "catalog");
    let start = Instant::now();
    let catalog = phases::catalog::run_catalog_phase(&request.callee, analyser)?;
    report.callee_files = catalog.file_count();
    if catalog.is_empty() {
        warn!(
            "{} declares no exported functions or types; nothing will be drawn",
            request.callee.dir.display()
        );
    }
    report
        .phase_timings
        .insert("catalog".to_string(), start.elapsed().as_secs_f64());

    announce(&mut progress, "resolve");
    let start = Instant::now();
    let usage = phases::resolve::run_resolve_phase(
        &request.caller,
        &request.callee.functions,
        &catalog,
        analyser,
    )?;
    report.caller_files = usage.len();
    report.edges = usage.values().map(Vec::len).sum();
    report
        .phase_timings
        .insert("resolve".to_string(), start.elapsed().as_secs_f64());

    announce(&mut progress, "partition");
    let start = Instant::now();
    let index = phases::partition::invert(&usage);
    let partitions = phases::partition::run_partition_phase(index, request, &report.out_dir);
    report
        .phase_timings
        .insert("partition".to_string(), start.elapsed().as_secs_f64());

    announce(&mut progress, "render");
    let start = Instant::now();
    for partition in &partitions {
        let param = request.file_param(&partition.callee_file);
        match phases::render::render_partition(partition, param, backend) {
            Ok(path) => report.rendered.push(path),
            Err(e) => {
                if e.is_render() {
                    warn!("{e}");
                } else {
                    error!("{e}");
                }
                report.failures.push(PartitionFailure {
                    target: partition.target(backend.extension()),
                    message: e.to_string(),
                });
            }
        }
    }
    report
        .phase_timings
        .insert("render".to_string(), start.elapsed().as_secs_f64());

    info!(
        "job {}: {} images, {} failed",
        report.out_dir.display(),
        report.rendered.len(),
        report.failures.len()
    );
    Ok(report)
}
