//! Normalized relationship edges — the source of truth for graph shape.
//!
//! `parent` edges are directional (from = parent, to = child). `spouse`
//! edges are symmetric: equivalence ignores which endpoint was stored first,
//! so a sorted [`SpousePair`] is the canonical key for a couple.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a relationship edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Directed: `from` is the parent of `to`.
    Parent,
    /// Symmetric: `from` and `to` are spouses, direction is storage detail.
    Spouse,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Parent => "parent",
            EdgeKind::Spouse => "spouse",
        }
    }
}

/// A typed link between two members.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RelationshipEdge {
    pub from: Uuid,
    pub to: Uuid,
    pub kind: EdgeKind,
}

impl RelationshipEdge {
    pub fn parent(from: Uuid, to: Uuid) -> Self {
        Self {
            from,
            to,
            kind: EdgeKind::Parent,
        }
    }

    pub fn spouse(a: Uuid, b: Uuid) -> Self {
        Self {
            from: a,
            to: b,
            kind: EdgeKind::Spouse,
        }
    }

    /// Equivalence test: parent edges match on the ordered pair, spouse
    /// edges match regardless of direction.
    pub fn matches(&self, from: Uuid, to: Uuid, kind: EdgeKind) -> bool {
        if self.kind != kind {
            return false;
        }
        match kind {
            EdgeKind::Parent => self.from == from && self.to == to,
            EdgeKind::Spouse => {
                (self.from == from && self.to == to) || (self.from == to && self.to == from)
            }
        }
    }

    pub fn same_link(&self, other: &RelationshipEdge) -> bool {
        self.matches(other.from, other.to, other.kind)
    }

    pub fn touches(&self, id: Uuid) -> bool {
        self.from == id || self.to == id
    }
}

/// Canonical (sorted) key for a couple, independent of edge direction.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub struct SpousePair {
    a: Uuid,
    b: Uuid,
}

impl SpousePair {
    pub fn new(x: Uuid, y: Uuid) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn a(&self) -> Uuid {
        self.a
    }

    pub fn b(&self) -> Uuid {
        self.b
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.a == id || self.b == id
    }

    pub fn other(&self, id: Uuid) -> Option<Uuid> {
        if id == self.a {
            Some(self.b)
        } else if id == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}
