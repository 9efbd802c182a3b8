//! Phases 3-4: Partitioning and document assembly integration tests.

mod common;

use std::path::Path;

use common::*;
use kolink_core::config::{Attribute, FileParam};
use kolink_core::graph::Cluster;
use kolink_core::phases::partition::{invert, run_partition_phase, Partition};
use kolink_core::phases::render::build_document;

fn partitions(request: &kolink_core::config::RequestDef) -> Vec<Partition> {
    let usage = run_resolve(request);
    run_partition_phase(invert(&usage), request, Path::new("/graphs"))
}

// ===========================================================================
// Partitioning
// ===========================================================================

#[test]
fn merged_partitions_are_one_per_callee_file() {
    let dir = tempfile::tempdir().unwrap();
    let parts = partitions(&go_project_request(dir.path()));

    let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["helper", "store"]);
    assert_eq!(parts[0].target("png"), Path::new("/graphs/helper.png"));
    // Raw edges: 6 from main.go plus 1 from server.go.
    assert_eq!(parts[0].edges.len(), 7);
}

#[test]
fn split_partitions_are_one_per_function() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = go_project_request(dir.path());
    request.file_params.push(split_param("helper.go"));

    let parts = partitions(&request);
    let targets: Vec<_> = parts.iter().map(|p| p.target("png")).collect();
    assert_eq!(
        targets,
        vec![
            Path::new("/graphs/helper/NewWorker.png").to_path_buf(),
            Path::new("/graphs/helper/Run.png").to_path_buf(),
            Path::new("/graphs/helper/Version.png").to_path_buf(),
            Path::new("/graphs/store.png").to_path_buf(),
        ]
    );
    assert!(parts[..3]
        .iter()
        .all(|p| p.edges.iter().all(|e| Some(&e.function) == p.function.as_ref())));
}

// ===========================================================================
// Document assembly
// ===========================================================================

#[test]
fn document_collapses_duplicate_edges() {
    let dir = tempfile::tempdir().unwrap();
    let parts = partitions(&go_project_request(dir.path()));

    let doc = build_document(&parts[0], None, Path::new("helper.png")).unwrap();
    assert_eq!(doc.cluster_size(Cluster::Caller), 2);
    assert_eq!(doc.cluster_size(Cluster::Callee), 3);
    assert_eq!(doc.edge_count(), 4);
    assert!(doc.has_call("main", "NewWorker"));
    assert!(doc.has_call("main", "Run"));
    assert!(doc.has_call("main", "Version"));
    assert!(doc.has_call("server", "Version"));
    assert!(!doc.has_call("server", "Run"));
}

#[test]
fn dot_output_carries_clusters_and_styling() {
    let dir = tempfile::tempdir().unwrap();
    let parts = partitions(&go_project_request(dir.path()));
    let param = FileParam {
        file_name: "store.go".to_string(),
        layout: Some("circo".to_string()),
        attributes: vec![Attribute {
            name: "rankdir".to_string(),
            value: "LR".to_string(),
        }],
        ..Default::default()
    };

    let dot = build_document(&parts[1], Some(&param), Path::new("store.png"))
        .unwrap()
        .to_dot();
    assert!(dot.starts_with("digraph g {\n"));
    assert!(dot.contains("rankdir=\"LR\";"));
    assert!(dot.contains("layout=\"circo\";"));
    assert!(dot.contains("subgraph cluster_caller {"));
    assert!(dot.contains("subgraph cluster_callee {"));
    assert!(dot.contains("\"caller:server\" -> \"callee:Get\";"));
}

#[test]
fn field_and_package_calls_collapse_to_one_edge() {
    let dir = tempfile::tempdir().unwrap();
    write_tree(
        dir.path(),
        &[
            (
                "callee/helper.go",
                "package helper\n\ntype Worker struct{}\n\nfunc Run() {}\n",
            ),
            (
                "caller/main.go",
                "package main\n\nimport \"example.com/helper\"\n\ntype Obj struct {\n\tw helper.Worker\n}\n\nfunc main() {\n\tobj := Obj{}\n\tobj.w.Run()\n\thelper.Run()\n}\n",
            ),
        ],
    );
    let request = request_for(dir.path(), &dir.path().join("out"));

    let parts = partitions(&request);
    assert_eq!(parts.len(), 1);
    assert!(parts[0].edges.len() > 1);

    let doc = build_document(&parts[0], None, Path::new("helper.png")).unwrap();
    assert_eq!(doc.edge_count(), 1);
    assert!(doc.has_call("main", "Run"));
}
