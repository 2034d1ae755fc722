//! In-memory reference backend.
//!
//! Backs the POC and the test suite. Semantics mirror what a production
//! backend must provide: idempotent edge writes, cascade delete, and coarse
//! change notifications.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;
use uuid::Uuid;

use super::{ChangeEvent, FamilyStore};
use crate::model::edge::{EdgeKind, RelationshipEdge};
use crate::model::{MediaItem, Member, MemberPatch};

#[derive(Default)]
struct Shelves {
    members: Vec<Member>,
    edges: Vec<RelationshipEdge>,
}

/// In-memory [`FamilyStore`] implementation.
pub struct MemoryStore {
    inner: RwLock<Shelves>,
    events: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: RwLock::new(Shelves::default()),
            events,
        }
    }

    fn notify(&self, event: ChangeEvent) {
        // No receivers is fine; notifications are best-effort.
        let _ = self.events.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FamilyStore for MemoryStore {
    async fn list_members(&self) -> Result<Vec<Member>> {
        Ok(self.inner.read().await.members.clone())
    }

    async fn list_edges(&self) -> Result<Vec<RelationshipEdge>> {
        Ok(self.inner.read().await.edges.clone())
    }

    async fn create_member(&self, member: Member) -> Result<Member> {
        member.validate()?;
        let mut inner = self.inner.write().await;
        if inner.members.iter().any(|m| m.id == member.id) {
            bail!("member {} already exists", member.id);
        }
        debug!(member_id = %member.id, name = %member.display_name(), "creating member");
        inner.members.push(member.clone());
        drop(inner);
        self.notify(ChangeEvent::MemberAdded(member.id));
        Ok(member)
    }

    async fn update_member(&self, id: Uuid, patch: MemberPatch) -> Result<()> {
        patch.validate()?;
        let mut inner = self.inner.write().await;
        let member = inner
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| anyhow!("member {id} not found"))?;
        patch.apply_to(member);
        drop(inner);
        self.notify(ChangeEvent::MemberChanged(id));
        Ok(())
    }

    async fn delete_member(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        let before = inner.members.len();
        inner.members.retain(|m| m.id != id);
        if inner.members.len() == before {
            bail!("member {id} not found");
        }
        let edges_before = inner.edges.len();
        inner.edges.retain(|e| !e.touches(id));
        let cascaded = edges_before - inner.edges.len();
        drop(inner);
        debug!(member_id = %id, cascaded_edges = cascaded, "deleted member");
        self.notify(ChangeEvent::MemberRemoved(id));
        if cascaded > 0 {
            self.notify(ChangeEvent::EdgeSetChanged);
        }
        Ok(())
    }

    async fn set_member_position(&self, id: Uuid, x: f32, y: f32) -> Result<()> {
        let mut inner = self.inner.write().await;
        let member = inner
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| anyhow!("member {id} not found"))?;
        member.position = Some(crate::model::Position::new(x, y));
        drop(inner);
        self.notify(ChangeEvent::MemberChanged(id));
        Ok(())
    }

    async fn add_media(&self, member_id: Uuid, item: MediaItem) -> Result<()> {
        let mut inner = self.inner.write().await;
        let member = inner
            .members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or_else(|| anyhow!("member {member_id} not found"))?;
        // Newest first, matching the fetch ordering of the app shell.
        member.media.insert(0, item);
        drop(inner);
        self.notify(ChangeEvent::MemberChanged(member_id));
        Ok(())
    }

    async fn create_edge(&self, from: Uuid, to: Uuid, kind: EdgeKind) -> Result<()> {
        if from == to {
            bail!("cannot relate member {from} to themselves");
        }
        let mut inner = self.inner.write().await;
        if inner.edges.iter().any(|e| e.matches(from, to, kind)) {
            // Duplicate request is success.
            debug!(%from, %to, kind = kind.as_str(), "edge already exists, skipping");
            return Ok(());
        }
        inner.edges.push(RelationshipEdge { from, to, kind });
        drop(inner);
        self.notify(ChangeEvent::EdgeSetChanged);
        Ok(())
    }

    async fn delete_edge(&self, from: Uuid, to: Uuid, kind: EdgeKind) -> Result<()> {
        let mut inner = self.inner.write().await;
        let before = inner.edges.len();
        inner.edges.retain(|e| !e.matches(from, to, kind));
        let removed = before - inner.edges.len();
        drop(inner);
        if removed > 0 {
            self.notify(ChangeEvent::EdgeSetChanged);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}
