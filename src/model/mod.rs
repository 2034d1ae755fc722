//! Core data model for the family tree.
//!
//! Members and media are owned by the store; the relationship arrays a UI
//! needs (parents/children/spouses) are *not* stored here — they are derived
//! views over the edge set, see [`crate::graph::builder`].

pub mod edge;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TreeError;

/// Gender tag for a member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Kind of an attached media item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Note,
}

/// A media attachment on a member (photo, clip, or free-text note).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: Uuid,
    pub kind: MediaKind,
    /// Blob-store or external URL.
    pub url: String,
    pub title: String,
    /// Body text for `MediaKind::Note` items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MediaItem {
    pub fn image(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: MediaKind::Image,
            url: url.into(),
            title: title.into(),
            content: None,
            created_at: Some(Utc::now()),
        }
    }
}

/// A 2D diagram position, in canvas coordinates (top-left of the node box).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One person in the family graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maiden_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Newest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaItem>,
    /// User-dragged position. Absent means the layout engine computes one;
    /// present means authoritative — re-layout must never overwrite it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Member {
    /// Create a member with a fresh id and only the required name fields.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            maiden_name: None,
            birth_date: None,
            death_date: None,
            gender: None,
            bio: None,
            media: Vec::new(),
            position: None,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Reject malformed input before any mutation is attempted.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.first_name.trim().is_empty() {
            return Err(TreeError::validation("first name must not be empty"));
        }
        if self.last_name.trim().is_empty() {
            return Err(TreeError::validation("last name must not be empty"));
        }
        Ok(())
    }
}

/// Partial update for a member. Only the fields that are `Some` are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maiden_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl MemberPatch {
    /// Reject patches that would blank out a required name field.
    pub fn validate(&self) -> Result<(), TreeError> {
        if matches!(&self.first_name, Some(s) if s.trim().is_empty()) {
            return Err(TreeError::validation("first name must not be empty"));
        }
        if matches!(&self.last_name, Some(s) if s.trim().is_empty()) {
            return Err(TreeError::validation("last name must not be empty"));
        }
        Ok(())
    }

    pub fn apply_to(&self, member: &mut Member) {
        if let Some(v) = &self.first_name {
            member.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            member.last_name = v.clone();
        }
        if let Some(v) = &self.maiden_name {
            member.maiden_name = Some(v.clone());
        }
        if let Some(v) = self.birth_date {
            member.birth_date = Some(v);
        }
        if let Some(v) = self.death_date {
            member.death_date = Some(v);
        }
        if let Some(v) = self.gender {
            member.gender = Some(v);
        }
        if let Some(v) = &self.bio {
            member.bio = Some(v.clone());
        }
    }
}
