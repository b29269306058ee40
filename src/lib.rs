// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Castmark: Farcaster cast bookmarks
//!
//! This crate reconciles the signed-in Farcaster session with the user's
//! row in the Supabase backend and exposes a single read model, plus the
//! sign-in flow and typed reads of bookmarks, tags and collections.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

use config::Config;
use db::SupabaseDb;
use services::{
    HttpSessionStore, IdentityProvider, IdentityReconciler, JsonHostContext, SignInTrigger,
};

/// Reconciler wired to the hosted backends.
pub type AppReconciler = IdentityReconciler<SupabaseDb, JsonHostContext>;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SupabaseDb,
    pub sessions: HttpSessionStore,
    pub reconciler: AppReconciler,
}

impl AppState {
    /// Build the HTTP collaborators and the reconciler from config.
    pub fn from_config(config: Config) -> error::Result<Self> {
        let db = SupabaseDb::from_config(&config)?;
        let sessions = HttpSessionStore::new(&config.auth_base_url, config.session_poll_interval)?;
        let host = JsonHostContext::new(config.frame_context.clone());
        let reconciler = IdentityReconciler::new(db.clone(), host);

        Ok(Self {
            config,
            db,
            sessions,
            reconciler,
        })
    }

    /// Sign-in trigger that hands off to this app's session store.
    pub fn sign_in_trigger<P: IdentityProvider>(
        &self,
        provider: P,
    ) -> SignInTrigger<P, HttpSessionStore> {
        SignInTrigger::new(
            provider,
            self.sessions.clone(),
            self.config.auth_callback_url.clone(),
        )
    }
}
