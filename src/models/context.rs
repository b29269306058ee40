// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Unified read model handed to the rest of the application.

use super::{ContextUser, User};
use serde::Serialize;

/// What consumers see of the signed-in user.
///
/// `is_authenticated` follows the session status alone; a failed or empty
/// record lookup never changes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub db_user: Option<User>,
    pub context_user: Option<ContextUser>,
    pub loading: bool,
    pub is_authenticated: bool,
}
