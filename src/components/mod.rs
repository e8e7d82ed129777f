//! UI components.

pub mod legend;
pub mod network_graph;
pub mod person_panel;
