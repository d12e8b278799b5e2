//! UI components.

pub mod project_graph;
