// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Bookmark, tag and collection rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    /// Owner (`users.id`)
    pub user_id: String,
    /// Hash of the bookmarked cast
    pub cast_hash: String,
    pub cast_author_fid: Option<u64>,
    pub cast_author_username: Option<String>,
    pub cast_content: Option<String>,
    pub cast_timestamp: Option<DateTime<Utc>>,
    /// Free-form note from the owner
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_private: bool,
    /// Tags linked through `bookmark_tags`, present only when embedded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

/// User-defined label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Named group of bookmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bookmarks linked through `collection_bookmarks`, present only when embedded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmarks: Option<Vec<Bookmark>>,
}
