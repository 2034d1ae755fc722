//! End-to-end flows over the public API: gestures through the controller
//! down to the store, and the reconciliation behavior on write failure.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use kintree_core::{
    Applied, ChangeEvent, DragEnd, EdgeKind, FamilyStore, GraphCommand, HandleRole, MediaItem,
    Member, MemberPatch, MemoryStore, NodeKey, Position, RelationshipEdge, TreeController,
    VisualEdgeKind,
};

async fn seeded_store(names: &[&str]) -> (Arc<MemoryStore>, Vec<Uuid>) {
    let store = Arc::new(MemoryStore::new());
    let mut ids = Vec::new();
    for name in names {
        let member = store
            .create_member(Member::new(*name, "Flow"))
            .await
            .unwrap();
        ids.push(member.id);
    }
    (store, ids)
}

/// Let spawned fire-and-forget writes run to completion.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn couple_with_child_renders_junction_diagram() {
    let (store, ids) = seeded_store(&["Ada", "Ben", "Cal"]).await;
    let mut controller = TreeController::load(store).await.unwrap();

    // Side-to-side drag makes the couple.
    controller.drag_begin(NodeKey::Person(ids[0]), HandleRole::Right);
    controller
        .drag_end(DragEnd::OnNode {
            key: NodeKey::Person(ids[1]),
            role: HandleRole::Left,
        })
        .unwrap();

    // Junction bottom drag onto the child links both parents at once.
    controller.drag_begin(NodeKey::marriage(ids[0], ids[1]), HandleRole::Bottom);
    controller
        .drag_end(DragEnd::OnNode {
            key: NodeKey::Person(ids[2]),
            role: HandleRole::Top,
        })
        .unwrap();

    let diagram = controller.diagram();
    assert!(diagram.has_node(NodeKey::marriage(ids[0], ids[1])));
    assert_eq!(diagram.edges_of_kind(VisualEdgeKind::SpouseHalf).len(), 2);
    assert_eq!(diagram.edges_of_kind(VisualEdgeKind::MarriageChild).len(), 1);
    assert!(diagram.edges_of_kind(VisualEdgeKind::ParentSingle).is_empty());

    // The child sits strictly below both parents.
    let child_y = diagram.get_node(NodeKey::Person(ids[2])).unwrap().position.y;
    for parent in &ids[..2] {
        let parent_y = diagram.get_node(NodeKey::Person(*parent)).unwrap().position.y;
        assert!(child_y > parent_y);
    }

    settle().await;
    controller.reload().await.unwrap();
    assert!(controller.state().has_edge(ids[0], ids[2], EdgeKind::Parent));
    assert!(controller.state().has_edge(ids[1], ids[2], EdgeKind::Parent));
    assert!(controller.state().has_edge(ids[0], ids[1], EdgeKind::Spouse));
}

#[tokio::test]
async fn canvas_release_creates_member_at_drop_point() {
    let (store, ids) = seeded_store(&["Ada"]).await;
    let mut controller = TreeController::load(Arc::clone(&store) as Arc<dyn FamilyStore>)
        .await
        .unwrap();

    controller.drag_begin(NodeKey::Person(ids[0]), HandleRole::Bottom);
    let applied = controller
        .drag_end(DragEnd::OnCanvas {
            position: Position::new(640.0, 480.0),
        })
        .unwrap();
    let Applied::MemberFormRequested { seed, at } = applied else {
        panic!("expected a member form request");
    };

    let child = controller
        .create_seeded_member(Member::new("Dee", "Flow"), seed, at)
        .unwrap();

    settle().await;
    let stored = store.list_members().await.unwrap();
    let stored_child = stored.iter().find(|m| m.id == child.id).unwrap();
    assert_eq!(stored_child.position, Some(Position::new(640.0, 480.0)));

    let edges = store.list_edges().await.unwrap();
    assert!(edges
        .iter()
        .any(|e| e.matches(ids[0], child.id, EdgeKind::Parent)));
    assert_eq!(edges.len(), 1);
}

#[tokio::test]
async fn deleting_collapsed_edge_removes_both_parent_links() {
    let (store, ids) = seeded_store(&["Ada", "Ben", "Cal"]).await;
    let mut controller = TreeController::load(Arc::clone(&store) as Arc<dyn FamilyStore>)
        .await
        .unwrap();

    for cmd in [
        GraphCommand::AddEdge {
            from: ids[0],
            to: ids[1],
            kind: EdgeKind::Spouse,
        },
        GraphCommand::AddCoParents {
            a: ids[0],
            b: ids[1],
            child: ids[2],
        },
    ] {
        controller.apply(cmd).unwrap();
    }
    settle().await;

    let diagram = controller.diagram();
    let collapsed = diagram
        .edges
        .iter()
        .find(|e| e.kind == VisualEdgeKind::MarriageChild)
        .cloned()
        .expect("collapsed marriage edge");
    assert_eq!(collapsed.underlying.len(), 2);

    controller.request_edge_delete(collapsed);
    controller.confirm_edge_delete().unwrap();
    settle().await;

    let edges = store.list_edges().await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::Spouse);

    // With no shared child left, the couple renders as a direct line again.
    controller.reload().await.unwrap();
    let diagram = controller.diagram();
    assert!(!diagram.has_node(NodeKey::marriage(ids[0], ids[1])));
    assert_eq!(diagram.edges_of_kind(VisualEdgeKind::SpouseDirect).len(), 1);
}

#[tokio::test]
async fn store_events_drive_collaborator_reload() {
    let (store, _) = seeded_store(&[]).await;
    let mut events = store.subscribe();
    let mut controller = TreeController::load(Arc::clone(&store) as Arc<dyn FamilyStore>)
        .await
        .unwrap();

    // Another session writes directly to the shared store.
    let ada = store
        .create_member(Member::new("Ada", "Flow"))
        .await
        .unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event, ChangeEvent::MemberAdded(ada.id));

    controller.on_change(event).await.unwrap();
    assert!(controller.state().has_member(ada.id));
}

#[tokio::test]
async fn member_edit_and_media_flow() {
    let (store, ids) = seeded_store(&["Ada"]).await;
    let mut controller = TreeController::load(Arc::clone(&store) as Arc<dyn FamilyStore>)
        .await
        .unwrap();

    controller
        .update_member(
            ids[0],
            MemberPatch {
                maiden_name: Some("Byron".to_string()),
                bio: Some("mathematician".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    controller
        .add_media(ids[0], MediaItem::image("http://x/new.jpg", "New"))
        .unwrap();
    controller
        .add_media(ids[0], MediaItem::image("http://x/newer.jpg", "Newer"))
        .unwrap();
    settle().await;

    let stored = store.list_members().await.unwrap();
    let ada = stored.iter().find(|m| m.id == ids[0]).unwrap();
    assert_eq!(ada.maiden_name.as_deref(), Some("Byron"));
    // Newest first.
    assert_eq!(ada.media[0].title, "Newer");
    assert_eq!(ada.media[1].title, "New");
}

// ── Write-failure policy ──

/// Store whose edge writes always fail, for exercising the optimistic
/// reconcile-on-reload policy.
struct FlakyStore {
    inner: MemoryStore,
}

#[async_trait]
impl FamilyStore for FlakyStore {
    async fn list_members(&self) -> Result<Vec<Member>> {
        self.inner.list_members().await
    }

    async fn list_edges(&self) -> Result<Vec<RelationshipEdge>> {
        self.inner.list_edges().await
    }

    async fn create_member(&self, member: Member) -> Result<Member> {
        self.inner.create_member(member).await
    }

    async fn update_member(&self, id: Uuid, patch: MemberPatch) -> Result<()> {
        self.inner.update_member(id, patch).await
    }

    async fn delete_member(&self, id: Uuid) -> Result<()> {
        self.inner.delete_member(id).await
    }

    async fn set_member_position(&self, id: Uuid, x: f32, y: f32) -> Result<()> {
        self.inner.set_member_position(id, x, y).await
    }

    async fn add_media(&self, member_id: Uuid, item: MediaItem) -> Result<()> {
        self.inner.add_media(member_id, item).await
    }

    async fn create_edge(&self, _from: Uuid, _to: Uuid, _kind: EdgeKind) -> Result<()> {
        bail!("backend unavailable")
    }

    async fn delete_edge(&self, _from: Uuid, _to: Uuid, _kind: EdgeKind) -> Result<()> {
        bail!("backend unavailable")
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.inner.subscribe()
    }
}

#[tokio::test]
async fn failed_edge_write_reconciles_on_reload() {
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(),
    });
    let ada = store
        .inner
        .create_member(Member::new("Ada", "Flow"))
        .await
        .unwrap();
    let ben = store
        .inner
        .create_member(Member::new("Ben", "Flow"))
        .await
        .unwrap();
    let mut controller = TreeController::load(Arc::clone(&store) as Arc<dyn FamilyStore>)
        .await
        .unwrap();

    controller
        .apply(GraphCommand::AddEdge {
            from: ada.id,
            to: ben.id,
            kind: EdgeKind::Spouse,
        })
        .unwrap();

    // Optimistic state shows the edge even though the write will fail.
    assert!(controller.state().has_edge(ada.id, ben.id, EdgeKind::Spouse));

    settle().await;
    // The next full reload reconciles with the backend.
    controller.reload().await.unwrap();
    assert!(!controller.state().has_edge(ada.id, ben.id, EdgeKind::Spouse));
}
