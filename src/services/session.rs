// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store client for the app's `/api/auth/*` endpoints.
//!
//! Handles:
//! - Polling the current session and publishing its status
//! - The credential-callback exchange that turns a signed message into a session

use crate::error::{AppError, Result};
use crate::models::SessionStatus;
use anyhow::Context;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const SESSION_PATH: &str = "/api/auth/session";

/// Turns a completed sign-in handoff URL into a session.
pub trait SessionExchange: Send + Sync + 'static {
    fn exchange(&self, handoff_url: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Session payload. An absent session serializes as `{}` or `null`.
#[derive(Debug, Deserialize)]
struct SessionBody {
    #[serde(default)]
    user: Option<SessionUser>,
}

#[derive(Debug, Deserialize)]
struct SessionUser {
    #[serde(default)]
    fid: Option<u64>,
}

/// HTTP session store with a shared cookie jar.
#[derive(Clone)]
pub struct HttpSessionStore {
    http: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    status_tx: Arc<watch::Sender<SessionStatus>>,
    repoll: Arc<Notify>,
}

impl HttpSessionStore {
    /// Create a store for the app at `base_url`. Status starts as `Loading`.
    pub fn new(base_url: &str, poll_interval: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .cookie_store(true)
            .build()
            .context("failed building session HTTP client")?;

        let (status_tx, _) = watch::channel(SessionStatus::Loading);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            poll_interval,
            status_tx: Arc::new(status_tx),
            repoll: Arc::new(Notify::new()),
        })
    }

    /// Base URL the exchange and session endpoints live under.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        *self.status_tx.borrow()
    }

    /// Fetch the session once and publish the result if it changed.
    ///
    /// A failure before any status has been published settles the store on
    /// `Unauthenticated`; after that the last published status is kept.
    pub async fn poll_once(&self) -> Result<SessionStatus> {
        match self.fetch_status().await {
            Ok(status) => {
                self.publish(status);
                Ok(status)
            }
            Err(e) => {
                if self.status().is_loading() {
                    self.publish(SessionStatus::Unauthenticated);
                }
                Err(e)
            }
        }
    }

    async fn fetch_status(&self) -> Result<SessionStatus> {
        let url = format!("{}{}", self.base_url, SESSION_PATH);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::SessionExchange(format!("session request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::SessionExchange(format!(
                "session endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: Option<SessionBody> = response
            .json()
            .await
            .map_err(|e| AppError::SessionExchange(format!("invalid session JSON: {}", e)))?;

        Ok(status_from_body(body))
    }

    /// Poll in the background until the handle is aborted.
    pub fn spawn_poller(&self) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = store.poll_once().await {
                    tracing::warn!(error = %e, status = ?store.status(), "Session poll failed");
                }

                tokio::select! {
                    _ = tokio::time::sleep(store.poll_interval) => {}
                    _ = store.repoll.notified() => {
                        tracing::debug!("Session re-poll requested");
                    }
                }
            }
        })
    }

    fn publish(&self, status: SessionStatus) {
        let changed = self.status_tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });

        if changed {
            tracing::info!(fid = ?status.fid(), status = ?status, "Session status changed");
        }
    }
}

impl SessionExchange for HttpSessionStore {
    async fn exchange(&self, handoff_url: &str) -> Result<()> {
        let url = if handoff_url.starts_with('/') {
            format!("{}{}", self.base_url, handoff_url)
        } else {
            handoff_url.to_string()
        };

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::SessionExchange(format!("credential callback failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Failed reading credential callback body");
                String::new()
            });
            return Err(AppError::SessionExchange(format!(
                "credential callback returned HTTP {}: {}",
                status, body
            )));
        }

        tracing::info!("Credential exchange completed");
        self.repoll.notify_one();
        Ok(())
    }
}

fn status_from_body(body: Option<SessionBody>) -> SessionStatus {
    match body.and_then(|b| b.user).and_then(|u| u.fid) {
        Some(fid) if fid != 0 => SessionStatus::Authenticated(fid),
        _ => SessionStatus::Unauthenticated,
    }
}
