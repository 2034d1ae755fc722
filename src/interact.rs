//! Gesture-level interaction: translates raw pointer gestures into semantic
//! graph commands.
//!
//! The connect gesture is an explicit state machine with typed transition
//! inputs, independent of any UI toolkit's event shape:
//! `Idle → Dragging { from, role } → resolved | released-on-canvas |
//! cancelled`. State resets to `Idle` unconditionally on drag end.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graph::view_model::{NodeKey, VisualEdge};
use crate::model::edge::EdgeKind;
use crate::model::Position;

/// Which connection handle a drag started from or landed on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandleRole {
    /// Receives a parent link.
    Top,
    /// Emits a child link.
    Bottom,
    Left,
    Right,
}

impl HandleRole {
    pub fn is_side(&self) -> bool {
        matches!(self, HandleRole::Left | HandleRole::Right)
    }
}

/// Where a drag was released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEnd {
    /// Released on an existing node, on the given handle.
    OnNode { key: NodeKey, role: HandleRole },
    /// Released on empty canvas at the given coordinates.
    OnCanvas { position: Position },
    /// Released over chrome/UI — neither a node nor the canvas.
    Cancelled,
}

/// Seed relationship for a member created from a canvas release.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SeedRelation {
    /// New member is a child of this member.
    ChildOf(Uuid),
    /// New member is a child of both spouses of a junction.
    ChildOfCouple(Uuid, Uuid),
    /// New member is a parent of this member.
    ParentOf(Uuid),
    /// New member is a spouse of this member.
    SpouseOf(Uuid),
}

/// Semantic graph operation produced by a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphCommand {
    AddEdge {
        from: Uuid,
        to: Uuid,
        kind: EdgeKind,
    },
    /// Both spouses of a junction become parents of the child. One user
    /// gesture, two writes — applied together.
    AddCoParents {
        a: Uuid,
        b: Uuid,
        child: Uuid,
    },
    /// Open the member form seeded with a relationship, at the release
    /// coordinates.
    CreateMember {
        seed: SeedRelation,
        at: Position,
    },
    /// Remove every stored edge behind a visual edge (a collapsed
    /// marriage→child edge carries two parent edges).
    DeleteEdges {
        edges: Vec<crate::model::edge::RelationshipEdge>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum GestureState {
    #[default]
    Idle,
    Dragging {
        from: NodeKey,
        role: HandleRole,
    },
}

/// Connect-gesture state machine plus the pending edge-delete confirmation.
#[derive(Debug, Default)]
pub struct ConnectGesture {
    state: GestureState,
    pending_delete: Option<VisualEdge>,
}

impl ConnectGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Pointer went down on a handle.
    pub fn begin(&mut self, from: NodeKey, role: HandleRole) {
        self.state = GestureState::Dragging { from, role };
    }

    /// Pointer released. Resets to idle regardless of outcome; a release
    /// with no valid target has no side effects.
    pub fn end(&mut self, input: DragEnd) -> Option<GraphCommand> {
        let state = std::mem::take(&mut self.state);
        let GestureState::Dragging { from, role } = state else {
            return None;
        };
        Self::resolve(from, role, input)
    }

    fn resolve(from: NodeKey, role: HandleRole, input: DragEnd) -> Option<GraphCommand> {
        match (from, role, input) {
            (_, _, DragEnd::Cancelled) => None,

            // ── Released on empty canvas: create a seeded member ──
            (NodeKey::Person(id), HandleRole::Bottom, DragEnd::OnCanvas { position }) => {
                Some(GraphCommand::CreateMember {
                    seed: SeedRelation::ChildOf(id),
                    at: position,
                })
            }
            (NodeKey::Person(id), HandleRole::Top, DragEnd::OnCanvas { position }) => {
                Some(GraphCommand::CreateMember {
                    seed: SeedRelation::ParentOf(id),
                    at: position,
                })
            }
            (NodeKey::Person(id), side, DragEnd::OnCanvas { position }) if side.is_side() => {
                Some(GraphCommand::CreateMember {
                    seed: SeedRelation::SpouseOf(id),
                    at: position,
                })
            }
            (NodeKey::Marriage(a, b), HandleRole::Bottom, DragEnd::OnCanvas { position }) => {
                Some(GraphCommand::CreateMember {
                    seed: SeedRelation::ChildOfCouple(a, b),
                    at: position,
                })
            }

            // ── Released on an existing node ──
            (
                NodeKey::Marriage(a, b),
                HandleRole::Bottom,
                DragEnd::OnNode {
                    key: NodeKey::Person(child),
                    ..
                },
            ) => {
                // A spouse cannot be their own child.
                if child == a || child == b {
                    return None;
                }
                Some(GraphCommand::AddCoParents { a, b, child })
            }
            (
                NodeKey::Person(source),
                source_role,
                DragEnd::OnNode {
                    key: NodeKey::Person(target),
                    role: target_role,
                },
            ) => {
                if source == target {
                    return None;
                }
                let kind = if source_role.is_side() && target_role.is_side() {
                    EdgeKind::Spouse
                } else {
                    EdgeKind::Parent
                };
                Some(GraphCommand::AddEdge {
                    from: source,
                    to: target,
                    kind,
                })
            }

            // Drags onto a junction, or from a junction's non-bottom
            // handles, have no defined meaning.
            _ => None,
        }
    }

    // ── Edge deletion (modifier-click → confirm) ──

    /// Modifier-click on a visual edge: stage it for confirmation.
    pub fn request_edge_delete(&mut self, edge: VisualEdge) {
        self.pending_delete = Some(edge);
    }

    pub fn pending_delete(&self) -> Option<&VisualEdge> {
        self.pending_delete.as_ref()
    }

    /// Confirm the staged deletion, yielding one command that removes every
    /// underlying stored edge.
    pub fn confirm_delete(&mut self) -> Option<GraphCommand> {
        self.pending_delete
            .take()
            .map(|edge| GraphCommand::DeleteEdges {
                edges: edge.underlying,
            })
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }
}
