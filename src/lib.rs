//! Family tree relationship graph core.
//!
//! Normalized relationship edges (parent/spouse) are the single source of
//! truth; everything a UI renders is derived from them:
//!
//! - [`model`] — members, media, and the two relationship edge kinds
//! - [`graph`] — edge set → per-member views → layered layout → diagram
//!   view model with synthetic marriage junction nodes
//! - [`interact`] — drag-to-connect gesture state machine producing
//!   semantic graph commands
//! - [`controller`] — optimistic command application over a pluggable
//!   [`store::FamilyStore`] backend
//! - [`timeline`] — chronological projection of the member set

pub mod controller;
pub mod error;
pub mod graph;
pub mod interact;
pub mod model;
pub mod store;
pub mod timeline;

pub use controller::{Applied, TreeController, TreeState};
pub use error::TreeError;
pub use graph::{
    build_diagram, DiagramNode, FamilyGraph, LayoutConfig, LayoutEngine, NodeKey, TreeDiagram,
    VisualEdge, VisualEdgeKind,
};
pub use interact::{ConnectGesture, DragEnd, GraphCommand, HandleRole, SeedRelation};
pub use model::edge::{EdgeKind, RelationshipEdge, SpousePair};
pub use model::{Gender, MediaItem, MediaKind, Member, MemberPatch, Position};
pub use store::{ChangeEvent, FamilyStore, MemoryStore};
pub use timeline::{build_timeline, TimelineEntry};
