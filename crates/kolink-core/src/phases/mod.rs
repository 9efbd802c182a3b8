//! The analysis phases, in pipeline order.

pub mod structure;
pub mod catalog;
pub mod resolve;
pub mod partition;
pub mod render;
