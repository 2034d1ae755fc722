//! Tree controller: the single owner of in-memory graph state.
//!
//! Every graph-mutating action is applied to the local state synchronously
//! (optimistic, idempotent), then the persistence write is spawned
//! fire-and-forget. Write failures are logged and left to reconcile on the
//! next full [`TreeController::reload`]; out-of-band change notifications
//! trigger the same full re-derivation, never a partial patch.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::TreeError;
use crate::graph::view_model::{build_diagram, TreeDiagram, VisualEdge};
use crate::graph::{FamilyGraph, LayoutEngine};
use crate::interact::{ConnectGesture, DragEnd, GraphCommand, HandleRole, SeedRelation};
use crate::model::edge::{EdgeKind, RelationshipEdge};
use crate::model::{MediaItem, Member, MemberPatch, Position};
use crate::store::{ChangeEvent, FamilyStore};
use crate::timeline::{build_timeline, TimelineEntry};

/// Explicit container for the client-session graph state. Relationship
/// views are always re-derived from `edges`, never patched in place.
#[derive(Debug, Clone, Default)]
pub struct TreeState {
    pub members: Vec<Member>,
    pub edges: Vec<RelationshipEdge>,
}

impl TreeState {
    pub fn member(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    fn member_mut(&mut self, id: Uuid) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    pub fn has_member(&self, id: Uuid) -> bool {
        self.member(id).is_some()
    }

    pub fn has_edge(&self, from: Uuid, to: Uuid, kind: EdgeKind) -> bool {
        self.edges.iter().any(|e| e.matches(from, to, kind))
    }

    /// Checked-then-inserted; returns false if an equivalent edge exists.
    fn insert_edge(&mut self, from: Uuid, to: Uuid, kind: EdgeKind) -> bool {
        if self.has_edge(from, to, kind) {
            return false;
        }
        self.edges.push(RelationshipEdge { from, to, kind });
        true
    }

    fn remove_edge(&mut self, edge: &RelationshipEdge) {
        self.edges.retain(|e| !e.same_link(edge));
    }
}

/// Outcome of applying a gesture command.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    Done,
    /// The gesture asks for a new member: the UI should open the member
    /// form pre-seeded, then call [`TreeController::create_seeded_member`].
    MemberFormRequested { seed: SeedRelation, at: Position },
}

/// Owns graph state for one client session and mediates between gestures,
/// the layout pipeline, and the persistence backend.
pub struct TreeController {
    store: Arc<dyn FamilyStore>,
    state: TreeState,
    layout: LayoutEngine,
    gesture: ConnectGesture,
}

impl TreeController {
    /// Fetch the initial state from the store.
    pub async fn load(store: Arc<dyn FamilyStore>) -> Result<Self, TreeError> {
        let members = store.list_members().await?;
        let edges = store.list_edges().await?;
        info!(members = members.len(), edges = edges.len(), "loaded family tree");
        Ok(Self {
            store,
            state: TreeState { members, edges },
            layout: LayoutEngine::new(),
            gesture: ConnectGesture::new(),
        })
    }

    /// Replace local state wholesale from the store. This is the
    /// reconciliation point for failed optimistic writes.
    pub async fn reload(&mut self) -> Result<(), TreeError> {
        self.state.members = self.store.list_members().await?;
        self.state.edges = self.store.list_edges().await?;
        debug!(
            members = self.state.members.len(),
            edges = self.state.edges.len(),
            "reloaded family tree"
        );
        Ok(())
    }

    /// Coarse change notification from a concurrent collaborator: full
    /// re-derivation, never a partial patch.
    pub async fn on_change(&mut self, event: ChangeEvent) -> Result<(), TreeError> {
        debug!(?event, "change notification, reloading");
        self.reload().await
    }

    pub fn state(&self) -> &TreeState {
        &self.state
    }

    /// Derive the relationship views from the current edge set.
    pub fn graph(&self) -> FamilyGraph {
        FamilyGraph::derive(&self.state.members, &self.state.edges)
    }

    /// Build the `{nodes, edges}` diagram model for the rendering layer.
    pub fn diagram(&self) -> TreeDiagram {
        let graph = self.graph();
        build_diagram(&self.state.members, &graph, &self.layout)
    }

    /// Chronological projection of the member set.
    pub fn timeline(&self) -> Vec<TimelineEntry> {
        build_timeline(&self.state.members)
    }

    // ── Gestures ──

    pub fn drag_begin(&mut self, from: crate::graph::NodeKey, role: HandleRole) {
        self.gesture.begin(from, role);
    }

    /// Resolve a drag release into a command and apply it.
    pub fn drag_end(&mut self, input: DragEnd) -> Result<Applied, TreeError> {
        match self.gesture.end(input) {
            Some(cmd) => self.apply(cmd),
            None => Ok(Applied::Done),
        }
    }

    pub fn request_edge_delete(&mut self, edge: VisualEdge) {
        self.gesture.request_edge_delete(edge);
    }

    pub fn pending_edge_delete(&self) -> Option<&VisualEdge> {
        self.gesture.pending_delete()
    }

    pub fn confirm_edge_delete(&mut self) -> Result<Applied, TreeError> {
        match self.gesture.confirm_delete() {
            Some(cmd) => self.apply(cmd),
            None => Ok(Applied::Done),
        }
    }

    pub fn cancel_edge_delete(&mut self) {
        self.gesture.cancel_delete();
    }

    // ── Commands ──

    /// Apply a semantic graph command: optimistic local mutation first,
    /// then the persistence write(s), fire-and-forget.
    pub fn apply(&mut self, cmd: GraphCommand) -> Result<Applied, TreeError> {
        match cmd {
            GraphCommand::AddEdge { from, to, kind } => {
                self.ensure_member(from)?;
                self.ensure_member(to)?;
                if self.state.insert_edge(from, to, kind) {
                    let store = Arc::clone(&self.store);
                    self.spawn_write("create edge", async move {
                        store.create_edge(from, to, kind).await
                    });
                } else {
                    // Duplicate request is success.
                    debug!(%from, %to, kind = kind.as_str(), "edge already present");
                }
                Ok(Applied::Done)
            }
            GraphCommand::AddCoParents { a, b, child } => {
                self.ensure_member(a)?;
                self.ensure_member(b)?;
                self.ensure_member(child)?;
                self.state.insert_edge(a, child, EdgeKind::Parent);
                self.state.insert_edge(b, child, EdgeKind::Parent);
                let store = Arc::clone(&self.store);
                // One gesture, two writes: run them in one task so a
                // partial failure is reported as such.
                self.spawn_write("link co-parents", async move {
                    store.create_edge(a, child, EdgeKind::Parent).await?;
                    store.create_edge(b, child, EdgeKind::Parent).await?;
                    Ok(())
                });
                Ok(Applied::Done)
            }
            GraphCommand::CreateMember { seed, at } => {
                Ok(Applied::MemberFormRequested { seed, at })
            }
            GraphCommand::DeleteEdges { edges } => {
                for edge in &edges {
                    self.state.remove_edge(edge);
                }
                let store = Arc::clone(&self.store);
                self.spawn_write("delete edges", async move {
                    for edge in edges {
                        store.delete_edge(edge.from, edge.to, edge.kind).await?;
                    }
                    Ok(())
                });
                Ok(Applied::Done)
            }
        }
    }

    /// Finish a canvas-release gesture: create the member at the release
    /// coordinates with its seed relationship(s).
    pub fn create_seeded_member(
        &mut self,
        mut draft: Member,
        seed: SeedRelation,
        at: Position,
    ) -> Result<Member, TreeError> {
        draft.validate()?;
        draft.position = Some(at);

        let seed_edges: Vec<RelationshipEdge> = match seed {
            SeedRelation::ChildOf(parent) => {
                self.ensure_member(parent)?;
                vec![RelationshipEdge::parent(parent, draft.id)]
            }
            SeedRelation::ChildOfCouple(a, b) => {
                self.ensure_member(a)?;
                self.ensure_member(b)?;
                vec![
                    RelationshipEdge::parent(a, draft.id),
                    RelationshipEdge::parent(b, draft.id),
                ]
            }
            SeedRelation::ParentOf(child) => {
                self.ensure_member(child)?;
                vec![RelationshipEdge::parent(draft.id, child)]
            }
            SeedRelation::SpouseOf(partner) => {
                self.ensure_member(partner)?;
                vec![RelationshipEdge::spouse(draft.id, partner)]
            }
        };

        self.state.members.push(draft.clone());
        for edge in &seed_edges {
            self.state.insert_edge(edge.from, edge.to, edge.kind);
        }

        let store = Arc::clone(&self.store);
        let member = draft.clone();
        self.spawn_write("create seeded member", async move {
            store.create_member(member).await?;
            for edge in seed_edges {
                store.create_edge(edge.from, edge.to, edge.kind).await?;
            }
            Ok(())
        });

        Ok(draft)
    }

    // ── Member CRUD ──

    pub fn create_member(&mut self, draft: Member) -> Result<Member, TreeError> {
        draft.validate()?;
        self.state.members.push(draft.clone());
        let store = Arc::clone(&self.store);
        let member = draft.clone();
        self.spawn_write("create member", async move {
            store.create_member(member).await?;
            Ok(())
        });
        Ok(draft)
    }

    pub fn update_member(&mut self, id: Uuid, patch: MemberPatch) -> Result<(), TreeError> {
        patch.validate()?;
        let member = self
            .state
            .member_mut(id)
            .ok_or(TreeError::UnknownMember { id })?;
        patch.apply_to(member);
        let store = Arc::clone(&self.store);
        self.spawn_write("update member", async move {
            store.update_member(id, patch).await
        });
        Ok(())
    }

    /// Remove a member locally (cascading its edges) and in the store.
    pub fn delete_member(&mut self, id: Uuid) -> Result<(), TreeError> {
        if !self.state.has_member(id) {
            return Err(TreeError::UnknownMember { id });
        }
        self.state.members.retain(|m| m.id != id);
        self.state.edges.retain(|e| !e.touches(id));
        let store = Arc::clone(&self.store);
        self.spawn_write("delete member", async move { store.delete_member(id).await });
        Ok(())
    }

    /// Persist a user-dragged position; it becomes authoritative for
    /// every later re-layout.
    pub fn set_member_position(&mut self, id: Uuid, x: f32, y: f32) -> Result<(), TreeError> {
        let member = self
            .state
            .member_mut(id)
            .ok_or(TreeError::UnknownMember { id })?;
        member.position = Some(Position::new(x, y));
        let store = Arc::clone(&self.store);
        self.spawn_write("save position", async move {
            store.set_member_position(id, x, y).await
        });
        Ok(())
    }

    pub fn add_media(&mut self, member_id: Uuid, item: MediaItem) -> Result<(), TreeError> {
        let member = self
            .state
            .member_mut(member_id)
            .ok_or(TreeError::UnknownMember { id: member_id })?;
        member.media.insert(0, item.clone());
        let store = Arc::clone(&self.store);
        self.spawn_write("add media", async move {
            store.add_media(member_id, item).await
        });
        Ok(())
    }

    // ── Internals ──

    fn ensure_member(&self, id: Uuid) -> Result<(), TreeError> {
        if self.state.has_member(id) {
            Ok(())
        } else {
            Err(TreeError::UnknownMember { id })
        }
    }

    fn spawn_write<F>(&self, what: &'static str, fut: F)
    where
        F: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        tokio::spawn(async move {
            if let Err(error) = fut.await {
                warn!(%error, what, "persistence write failed; keeping optimistic state until next reload");
            }
        });
    }
}
