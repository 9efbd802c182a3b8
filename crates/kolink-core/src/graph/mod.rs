//! In-memory indexes and graph documents.

pub mod catalog;
pub mod document;

pub use catalog::Catalog;
pub use document::{Cluster, DocumentError, GraphDocument};
