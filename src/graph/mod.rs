//! Relationship graph derivation, layout, and diagram view model.
//!
//! Pipeline: edge set → [`builder::FamilyGraph`] (derived per-member views)
//! → [`layout::LayoutEngine`] (generation-ranked coordinates) →
//! [`view_model::TreeDiagram`] (UI-ready nodes and visual edges).

pub mod builder;
pub mod layout;
pub mod view_model;

pub use builder::FamilyGraph;
pub use layout::{LayoutConfig, LayoutEngine};
pub use view_model::{build_diagram, DiagramNode, NodeKey, TreeDiagram, VisualEdge, VisualEdgeKind};
