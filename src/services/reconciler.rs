// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity reconciliation between the session store, the host-supplied hint
//! and the `users` table.
//!
//! The reconciler owns the only mutable state consumers see. It:
//! - captures the host identity hint once at startup
//! - watches session status and fetches the matching user row
//! - serves on-demand refreshes
//! - tracks whether the sign-in prompt is showing
//!
//! Record store and host failures are logged and absorbed; consumers only
//! ever observe a [`UserContext`].

use crate::db::UserRecords;
use crate::error::Result;
use crate::models::{ContextUser, SessionStatus, User, UserContext};
use crate::services::host_context::HostContext;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Internal machine state. `UserContext` is derived from it.
#[derive(Debug, Clone, Default)]
struct MachineState {
    session: SessionStatus,
    db_user: Option<User>,
    context_user: Option<ContextUser>,
    /// Bumped on every observed session change.
    generation: u64,
    /// Generation whose session-driven fetch has not settled yet.
    pending_fetch: Option<u64>,
    auth_prompt_visible: bool,
}

impl MachineState {
    fn view(&self) -> UserContext {
        UserContext {
            db_user: self.db_user.clone(),
            context_user: self.context_user.clone(),
            loading: self.session.is_loading() || self.pending_fetch.is_some(),
            is_authenticated: self.session.is_authenticated(),
        }
    }
}

struct Inner<R, H> {
    records: R,
    host: H,
    state: watch::Sender<MachineState>,
}

/// Identity reconciliation state machine.
///
/// Cheap to clone; clones share state. Must be driven from within a Tokio
/// runtime since session-driven fetches are spawned.
pub struct IdentityReconciler<R, H> {
    inner: Arc<Inner<R, H>>,
}

impl<R, H> Clone for IdentityReconciler<R, H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: UserRecords, H: HostContext> IdentityReconciler<R, H> {
    pub fn new(records: R, host: H) -> Self {
        let (state, _) = watch::channel(MachineState::default());
        Self {
            inner: Arc::new(Inner {
                records,
                host,
                state,
            }),
        }
    }

    /// Start hint capture and the session watch.
    ///
    /// The session watch holds off until the host has been asked for a hint,
    /// so `loading` cannot clear before hint capture is attempted.
    pub fn start(&self, session_rx: watch::Receiver<SessionStatus>) -> ReconcilerHandle {
        let (attempted_tx, attempted_rx) = oneshot::channel();

        let hint_task = {
            let this = self.clone();
            tokio::spawn(async move { this.attempt_hint(Some(attempted_tx)).await })
        };

        let session_task = {
            let this = self.clone();
            let mut session_rx = session_rx;
            tokio::spawn(async move {
                // Err means the hint task was aborted; carry on regardless.
                let _ = attempted_rx.await;

                loop {
                    let status = *session_rx.borrow_and_update();
                    this.on_session_change(status);

                    if session_rx.changed().await.is_err() {
                        tracing::debug!("Session store closed; stopping session watch");
                        break;
                    }
                }
            })
        };

        tracing::debug!("Identity reconciler started");
        ReconcilerHandle {
            tasks: vec![hint_task, session_task],
        }
    }

    /// Ask the host for an identity hint.
    ///
    /// Once a hint is stored it is never replaced, so calling this again only
    /// reaches the host if every earlier attempt came back empty or failed.
    pub async fn capture_hint(&self) {
        self.attempt_hint(None).await;
    }

    /// Hint capture proper. `attempted` fires once the host has been asked,
    /// or straight away if a hint is already stored.
    async fn attempt_hint(&self, attempted: Option<oneshot::Sender<()>>) {
        let already_captured = self.inner.state.borrow().context_user.is_some();
        if already_captured {
            if let Some(tx) = attempted {
                let _ = tx.send(());
            }
            return;
        }

        let request = self.inner.host.context_user();
        if let Some(tx) = attempted {
            let _ = tx.send(());
        }

        match request.await {
            Ok(Some(user)) => {
                let fid = user.fid;
                let stored = self.inner.state.send_if_modified(|state| {
                    if state.context_user.is_some() {
                        return false;
                    }
                    state.context_user = Some(user);
                    true
                });
                if stored {
                    tracing::info!(fid, "Captured identity hint from host");
                }
            }
            Ok(None) => {
                tracing::debug!("Host supplied no identity hint");
            }
            Err(e) => {
                tracing::error!(error = %e, "Error getting context user");
            }
        }
    }

    /// Observe a session status transition.
    ///
    /// Re-delivery of the current status is ignored. An authenticated status
    /// spawns a fetch of the matching user row; `db_user` is never cleared here.
    pub fn on_session_change(&self, status: SessionStatus) {
        let mut fetch = None;

        self.inner.state.send_if_modified(|state| {
            if state.session == status {
                return false;
            }

            state.session = status;
            state.generation += 1;
            state.pending_fetch = match status {
                SessionStatus::Authenticated(fid) => {
                    fetch = Some((fid, state.generation));
                    Some(state.generation)
                }
                SessionStatus::Loading | SessionStatus::Unauthenticated => None,
            };
            true
        });

        let Some((fid, generation)) = fetch else {
            return;
        };

        tracing::debug!(fid, generation, "Session authenticated; loading user");
        let this = self.clone();
        tokio::spawn(async move {
            let result = this.inner.records.user_by_fid(fid).await;
            this.settle_session_fetch(fid, generation, result);
        });
    }

    /// Re-read the current user's row. No-op unless authenticated.
    ///
    /// Errors and empty results keep whatever `db_user` already holds.
    pub async fn refresh_user(&self) {
        let session = self.inner.state.borrow().session;
        let Some(fid) = session.fid() else {
            tracing::debug!("Skipping user refresh: not authenticated");
            return;
        };

        match self.inner.records.user_by_fid(fid).await {
            Ok(Some(user)) => {
                self.inner.state.send_modify(|state| state.db_user = Some(user));
                tracing::debug!(fid, "User refreshed");
            }
            Ok(None) => {
                tracing::debug!(fid, "User refresh found no row; keeping current value");
            }
            Err(e) => {
                tracing::error!(fid, error = %e, "Error refreshing user data");
            }
        }
    }

    /// Gate an action behind sign-in.
    ///
    /// Returns `true` when already authenticated. Otherwise shows the sign-in
    /// prompt and returns `false`; the caller should drop the gated action.
    pub fn request_authentication(&self) -> bool {
        let mut authenticated = false;

        self.inner.state.send_if_modified(|state| {
            if state.session.is_authenticated() {
                authenticated = true;
                return false;
            }
            let was_visible = state.auth_prompt_visible;
            state.auth_prompt_visible = true;
            !was_visible
        });

        authenticated
    }

    /// Hide the sign-in prompt. Session state is untouched.
    pub fn dismiss_auth_prompt(&self) {
        self.inner.state.send_if_modified(|state| {
            let was_visible = state.auth_prompt_visible;
            state.auth_prompt_visible = false;
            was_visible
        });
    }

    pub fn auth_prompt_visible(&self) -> bool {
        self.inner.state.borrow().auth_prompt_visible
    }

    /// Current read model.
    pub fn snapshot(&self) -> UserContext {
        self.inner.state.borrow().view()
    }

    /// Watch the read model for changes.
    pub fn subscribe(&self) -> UserContextWatcher {
        UserContextWatcher {
            rx: self.inner.state.subscribe(),
        }
    }

    fn settle_session_fetch(&self, fid: u64, generation: u64, result: Result<Option<User>>) {
        match &result {
            Ok(Some(_)) => tracing::debug!(fid, generation, "User loaded"),
            Ok(None) => tracing::warn!(fid, "User authenticated but not found in database"),
            Err(e) => tracing::error!(
                fid,
                error = %e,
                transient = e.is_transient(),
                "Error loading user data"
            ),
        }

        self.inner.state.send_modify(|state| {
            // Last settled fetch wins, superseded or not.
            if let Ok(Some(user)) = result {
                state.db_user = Some(user);
            }
            if state.pending_fetch == Some(generation) {
                state.pending_fetch = None;
            }
        });
    }
}

/// Observer of the read model.
pub struct UserContextWatcher {
    rx: watch::Receiver<MachineState>,
}

impl UserContextWatcher {
    pub fn current(&self) -> UserContext {
        self.rx.borrow().view()
    }

    pub fn auth_prompt_visible(&self) -> bool {
        self.rx.borrow().auth_prompt_visible
    }

    /// Wait for the next change. `None` once the reconciler is gone.
    pub async fn changed(&mut self) -> Option<UserContext> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().view())
    }

    /// Wait until the read model satisfies `pred` (checked immediately too).
    /// `None` if the reconciler goes away first.
    pub async fn wait_for(
        &mut self,
        mut pred: impl FnMut(&UserContext) -> bool,
    ) -> Option<UserContext> {
        let state = self.rx.wait_for(|state| pred(&state.view())).await.ok()?;
        Some(state.view())
    }
}

/// Running reconciler tasks.
pub struct ReconcilerHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl ReconcilerHandle {
    /// Stop hint capture and the session watch. Fetches already in flight
    /// are left to settle.
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Reconciler task failed");
                }
            }
        }
        tracing::debug!("Identity reconciler stopped");
    }
}
