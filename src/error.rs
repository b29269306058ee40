// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! These never reach consumers of the identity read model; the reconciler
//! logs and absorbs them.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Record store error: {0}")]
    RecordStore(String),

    #[error("Expected at most one row from {table}, got {count}")]
    MultipleRows { table: &'static str, count: usize },

    #[error("Host context error: {0}")]
    HostContext(String),

    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Session exchange error: {0}")]
    SessionExchange(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::RecordStore(_) | AppError::SessionExchange(_) | AppError::HostContext(_)
        )
    }
}

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, AppError>;
