// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod bookmark;
pub mod context;
pub mod session;
pub mod user;

pub use bookmark::{Bookmark, Collection, Tag};
pub use context::UserContext;
pub use session::SessionStatus;
pub use user::{ContextUser, User};
