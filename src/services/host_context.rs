// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity hints supplied by the embedding host (e.g. a Farcaster client
//! rendering the app as a frame).

use crate::error::{AppError, Result};
use crate::models::ContextUser;
use serde::Deserialize;
use std::future::Future;

/// Source of the host-supplied identity hint.
pub trait HostContext: Send + Sync + 'static {
    /// Ask the host for its user, once.
    fn context_user(&self) -> impl Future<Output = Result<Option<ContextUser>>> + Send;
}

/// Frame context document as delivered by the host. Only `user` matters here.
#[derive(Debug, Deserialize)]
struct FrameContext {
    #[serde(default)]
    user: Option<FrameUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameUser {
    #[serde(default)]
    fid: Option<u64>,
    username: Option<String>,
    display_name: Option<String>,
    pfp_url: Option<String>,
}

/// Host context read from a JSON document handed over at startup.
#[derive(Debug, Clone, Default)]
pub struct JsonHostContext {
    raw: Option<String>,
}

impl JsonHostContext {
    pub fn new(raw: Option<String>) -> Self {
        Self { raw }
    }
}

impl HostContext for JsonHostContext {
    async fn context_user(&self) -> Result<Option<ContextUser>> {
        match &self.raw {
            Some(raw) => parse_frame_context(raw),
            None => Ok(None),
        }
    }
}

/// Host context with a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct StaticHostContext(pub Option<ContextUser>);

impl HostContext for StaticHostContext {
    async fn context_user(&self) -> Result<Option<ContextUser>> {
        Ok(self.0.clone())
    }
}

/// Extract the hint from a frame context document.
///
/// A missing user or a zero fid means "no hint"; malformed JSON is an error.
pub fn parse_frame_context(raw: &str) -> Result<Option<ContextUser>> {
    let context: Option<FrameContext> = serde_json::from_str(raw)
        .map_err(|e| AppError::HostContext(format!("invalid frame context: {e}")))?;

    let Some(user) = context.and_then(|c| c.user) else {
        return Ok(None);
    };

    Ok(user.fid.filter(|fid| *fid != 0).map(|fid| ContextUser {
        fid,
        username: user.username,
        display_name: user.display_name,
        pfp_url: user.pfp_url,
    }))
}
