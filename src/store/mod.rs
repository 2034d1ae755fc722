//! Persistence boundary for the tree core.
//!
//! The controller and graph pipeline operate exclusively through the
//! [`FamilyStore`] trait, enabling pluggable backends ([`MemoryStore`] for
//! tests/POC, a remote store in production). All writes are independently
//! idempotent; relationship-edge creation is checked-then-inserted.

pub mod memory;

pub use memory::MemoryStore;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::model::edge::{EdgeKind, RelationshipEdge};
use crate::model::{MediaItem, Member, MemberPatch};

/// Coarse change notifications. Consumers must respond with a full
/// re-derivation (reload), never a partial patch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeEvent {
    MemberAdded(Uuid),
    MemberChanged(Uuid),
    MemberRemoved(Uuid),
    EdgeSetChanged,
}

/// Persistence trait for all family tree state.
#[async_trait]
pub trait FamilyStore: Send + Sync {
    // ── Reads ──

    async fn list_members(&self) -> Result<Vec<Member>>;
    async fn list_edges(&self) -> Result<Vec<RelationshipEdge>>;

    // ── Members ──

    /// Insert a new member. Name fields must already be validated.
    async fn create_member(&self, member: Member) -> Result<Member>;
    async fn update_member(&self, id: Uuid, patch: MemberPatch) -> Result<()>;
    /// Delete a member, cascading its relationship edges and media.
    async fn delete_member(&self, id: Uuid) -> Result<()>;
    async fn set_member_position(&self, id: Uuid, x: f32, y: f32) -> Result<()>;
    async fn add_media(&self, member_id: Uuid, item: MediaItem) -> Result<()>;

    // ── Relationship edges ──

    /// Idempotent: a duplicate request is success, not an error. Spouse
    /// equivalence ignores direction.
    async fn create_edge(&self, from: Uuid, to: Uuid, kind: EdgeKind) -> Result<()>;
    /// Spouse deletion matches either stored direction.
    async fn delete_edge(&self, from: Uuid, to: Uuid, kind: EdgeKind) -> Result<()>;

    // ── Change notifications ──

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
