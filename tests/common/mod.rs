// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use castmark::db::UserRecords;
use castmark::error::{AppError, Result};
use castmark::models::{ContextUser, User};
use castmark::services::{HostContext, IdentityProvider, SessionExchange, SignedMessage};
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Build a `users` row.
#[allow(dead_code)]
pub fn user_row(fid: u64, username: &str) -> User {
    User {
        id: format!("user-{}", fid),
        fid,
        username: Some(username.to_string()),
        display_name: None,
        pfp_url: None,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        last_login: Utc.with_ymd_and_hms(2026, 10, 1, 8, 30, 0).unwrap(),
    }
}

#[allow(dead_code)]
pub fn hint(fid: u64, display_name: &str) -> ContextUser {
    ContextUser {
        fid,
        username: None,
        display_name: Some(display_name.to_string()),
        pfp_url: None,
    }
}

/// Canned answer from the record store.
#[allow(dead_code)]
pub enum Reply {
    Row(User),
    Empty,
    Fail,
}

type Gate = Option<oneshot::Receiver<()>>;

#[derive(Default)]
struct Script {
    replies: HashMap<u64, VecDeque<(Reply, Gate)>>,
    calls: Vec<u64>,
}

/// Record store that answers from a per-fid queue, optionally holding a
/// reply until the test releases it. An exhausted queue answers "no row".
#[derive(Clone, Default)]
pub struct ScriptedRecords {
    script: Arc<Mutex<Script>>,
}

#[allow(dead_code)]
impl ScriptedRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, fid: u64, reply: Reply) {
        self.queue(fid, reply, None);
    }

    /// Queue a reply that is held until the returned sender fires.
    pub fn push_gated(&self, fid: u64, reply: Reply) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.queue(fid, reply, Some(rx));
        tx
    }

    fn queue(&self, fid: u64, reply: Reply, gate: Gate) {
        self.script
            .lock()
            .unwrap()
            .replies
            .entry(fid)
            .or_default()
            .push_back((reply, gate));
    }

    /// Fids looked up so far, in call order.
    pub fn calls(&self) -> Vec<u64> {
        self.script.lock().unwrap().calls.clone()
    }
}

impl UserRecords for ScriptedRecords {
    async fn user_by_fid(&self, fid: u64) -> Result<Option<User>> {
        let (reply, gate) = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(fid);
            script
                .replies
                .get_mut(&fid)
                .and_then(|queue| queue.pop_front())
                .unwrap_or((Reply::Empty, None))
        };

        if let Some(gate) = gate {
            let _ = gate.await;
        }

        match reply {
            Reply::Row(user) => Ok(Some(user)),
            Reply::Empty => Ok(None),
            Reply::Fail => Err(AppError::RecordStore("connection reset".to_string())),
        }
    }
}

/// Host context answering from a queue; an exhausted queue answers `None`.
/// Calls are counted as soon as the host is asked, before any gate opens.
#[derive(Clone, Default)]
pub struct ScriptedHost {
    replies: Arc<Mutex<VecDeque<Result<Option<ContextUser>>>>>,
    calls: Arc<Mutex<usize>>,
    gate: Arc<Mutex<Gate>>,
}

#[allow(dead_code)]
impl ScriptedHost {
    pub fn new(replies: Vec<Result<Option<ContextUser>>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            calls: Arc::default(),
            gate: Arc::default(),
        }
    }

    /// Hold the next answer until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl HostContext for ScriptedHost {
    fn context_user(&self) -> impl Future<Output = Result<Option<ContextUser>>> + Send {
        *self.calls.lock().unwrap() += 1;
        let reply = self.replies.lock().unwrap().pop_front().unwrap_or(Ok(None));
        let gate = self.gate.lock().unwrap().take();

        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            reply
        }
    }
}

/// Identity provider that signs every nonce, or always fails.
#[derive(Clone, Default)]
pub struct FakeProvider {
    pub fail: bool,
    pub nonces: Arc<Mutex<Vec<String>>>,
}

impl IdentityProvider for FakeProvider {
    async fn sign_in(&self, nonce: &str) -> Result<SignedMessage> {
        self.nonces.lock().unwrap().push(nonce.to_string());
        if self.fail {
            return Err(AppError::IdentityProvider("user rejected request".to_string()));
        }
        Ok(SignedMessage {
            message: format!(
                "castmark.app wants you to sign in with your Ethereum account:\nNonce: {}",
                nonce
            ),
            signature: "0xdeadbeef".to_string(),
        })
    }
}

/// Session exchange that records handoff URLs.
#[derive(Clone, Default)]
pub struct RecordingExchange {
    pub fail: bool,
    pub urls: Arc<Mutex<Vec<String>>>,
}

impl SessionExchange for RecordingExchange {
    async fn exchange(&self, handoff_url: &str) -> Result<()> {
        self.urls.lock().unwrap().push(handoff_url.to_string());
        if self.fail {
            return Err(AppError::SessionExchange("HTTP 401".to_string()));
        }
        Ok(())
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
