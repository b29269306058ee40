// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User models: the persisted row and the host-supplied identity hint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User row stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Primary key assigned by the backend
    pub id: String,
    /// Farcaster ID (unique, same value the session carries)
    pub fid: u64,
    /// Farcaster handle
    pub username: Option<String>,
    /// Display name
    pub display_name: Option<String>,
    /// Profile picture URL
    pub pfp_url: Option<String>,
    /// When the row was created
    pub created_at: DateTime<Utc>,
    /// Last successful sign-in
    pub last_login: DateTime<Utc>,
}

/// Best-effort identity handed over by the embedding host before any session
/// exists. May disagree with the `users` row; the two are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextUser {
    pub fid: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp_url: Option<String>,
}
