// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Session status as reported by the session store.

use serde::Serialize;

/// Tri-state session status. Only the session store changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "fid", rename_all = "snake_case")]
pub enum SessionStatus {
    /// The session store has not answered yet
    #[default]
    Loading,
    /// No fid-bearing session
    Unauthenticated,
    /// Session for the given fid
    Authenticated(u64),
}

impl SessionStatus {
    /// Fid of the signed-in account, if any.
    pub fn fid(&self) -> Option<u64> {
        match self {
            SessionStatus::Authenticated(fid) => Some(*fid),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionStatus::Loading)
    }
}
