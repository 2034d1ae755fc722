//! Chronological projection of the member set.
//!
//! A derived, read-only view: entries are rebuilt from the member list on
//! demand, sorted by birth date with undated members first.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{MediaItem, Member};

/// How many media previews a timeline entry carries.
const MEDIA_PREVIEW_LIMIT: usize = 3;

/// One member's row on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub member_id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_date: Option<NaiveDate>,
    /// Birth year, for the rail label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Up to [`MEDIA_PREVIEW_LIMIT`] newest media items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaItem>,
}

/// Build the timeline for the given members. Undated members sort before
/// dated ones; ties keep the input order.
pub fn build_timeline(members: &[Member]) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = members
        .iter()
        .map(|m| TimelineEntry {
            member_id: m.id,
            name: m.display_name(),
            birth_date: m.birth_date,
            death_date: m.death_date,
            birth_year: m.birth_date.map(|d| d.year()),
            bio: m.bio.clone(),
            media: m.media.iter().take(MEDIA_PREVIEW_LIMIT).cloned().collect(),
        })
        .collect();
    // Option<NaiveDate> orders None first, which is what we want.
    entries.sort_by_key(|e| e.birth_date);
    entries
}
