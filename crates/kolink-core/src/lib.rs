//! kolink core: maps which exported Go functions of a callee tree are used
//! by a caller tree, and draws one usage graph per callee file.
//!
//! Pipeline: catalog the callee tree, resolve caller usages against the
//! catalog, partition the edges per callee file, render each partition.

pub mod config;
pub mod error;
pub mod graph;
pub mod languages;
pub mod model;
pub mod output;
pub mod phases;
pub mod pipeline;

pub use error::{KolinkError, Result};
