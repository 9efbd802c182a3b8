//! Two-cluster directed graph handed to a render backend.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::LazyLock;

use petgraph::graph::{DiGraph, NodeIndex};
use regex::Regex;
use thiserror::Error;

static DOT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

const GRAPH_NAME: &str = "g";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("invalid graph attribute name '{0}'")]
    InvalidAttribute(String),
}

/// Which side of the call a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cluster {
    Caller,
    Callee,
}

impl Cluster {
    fn subgraph(&self) -> &'static str {
        match self {
            Self::Caller => "cluster_caller",
            Self::Callee => "cluster_callee",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Caller => "caller",
            Self::Callee => "callee",
        }
    }

    fn cluster_attributes(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Caller => &[
                ("style", "filled"),
                ("fillcolor", "lightgrey"),
                ("rank", "same"),
                ("label", "caller"),
            ],
            Self::Callee => &[
                ("fillcolor", "blue"),
                ("rank", "same"),
                ("label", "callee"),
            ],
        }
    }

    fn node_attributes(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Caller => &[("style", "wedged"), ("fillcolor", "blue")],
            Self::Callee => &[("style", "rounded")],
        }
    }
}

#[derive(Debug, Clone)]
struct DocNode {
    cluster: Cluster,
    name: String,
}

/// Caller cluster, callee cluster and the deduplicated calls between them.
///
/// Node identity is `(cluster, name)`, so a caller file and a callee function
/// with the same name stay distinct nodes.
#[derive(Debug, Default)]
pub struct GraphDocument {
    attributes: Vec<(String, String)>,
    graph: DiGraph<DocNode, ()>,
    nodes: HashMap<(Cluster, String), NodeIndex>,
    drawn: HashSet<(String, String)>,
}

impl GraphDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a global graph attribute. Later values for the same name win.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), DocumentError> {
        if !DOT_ID.is_match(name) {
            return Err(DocumentError::InvalidAttribute(name.to_string()));
        }
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Ensure a node exists; adding an existing node is a no-op.
    pub fn add_node(&mut self, cluster: Cluster, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(&(cluster, name.to_string())) {
            return idx;
        }
        let idx = self.graph.add_node(DocNode {
            cluster,
            name: name.to_string(),
        });
        self.nodes.insert((cluster, name.to_string()), idx);
        idx
    }

    /// Add `caller → callee`. Returns `false` if that pair was already drawn.
    pub fn add_call(&mut self, caller: &str, callee: &str) -> bool {
        let from = self.add_node(Cluster::Caller, caller);
        let to = self.add_node(Cluster::Callee, callee);
        if self.has_call(caller, callee) {
            return false;
        }
        self.drawn.insert((caller.to_string(), callee.to_string()));
        self.graph.add_edge(from, to, ());
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn cluster_size(&self, cluster: Cluster) -> usize {
        self.graph
            .node_weights()
            .filter(|n| n.cluster == cluster)
            .count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_call(&self, caller: &str, callee: &str) -> bool {
        self.drawn
            .contains(&(caller.to_string(), callee.to_string()))
    }

    /// Serialise to Graphviz DOT.
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph {GRAPH_NAME} {{");
        for (name, value) in &self.attributes {
            let _ = writeln!(out, "  {name}={};", quote(value));
        }

        for cluster in [Cluster::Caller, Cluster::Callee] {
            let _ = writeln!(out, "  subgraph {} {{", cluster.subgraph());
            for (name, value) in cluster.cluster_attributes() {
                let _ = writeln!(out, "    {name}={};", quote(value));
            }
            for node in self.graph.node_weights().filter(|n| n.cluster == cluster) {
                let mut attrs = vec![format!("label={}", quote(&node.name))];
                attrs.extend(
                    cluster
                        .node_attributes()
                        .iter()
                        .map(|(k, v)| format!("{k}={}", quote(v))),
                );
                let _ = writeln!(
                    out,
                    "    {} [{}];",
                    quote(&node_id(cluster, &node.name)),
                    attrs.join(", ")
                );
            }
            let _ = writeln!(out, "  }}");
        }

        for edge in self.graph.raw_edges() {
            let from = &self.graph[edge.source()];
            let to = &self.graph[edge.target()];
            let _ = writeln!(
                out,
                "  {} -> {};",
                quote(&node_id(from.cluster, &from.name)),
                quote(&node_id(to.cluster, &to.name))
            );
        }
        out.push_str("}\n");
        out
    }
}

fn node_id(cluster: Cluster, name: &str) -> String {
    format!("{}:{name}", cluster.label())
}

fn quote(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}
