// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Backend credentials are injected by the deployment; a `.env` file is
//! honored for local development.

use std::env;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Record store ---
    /// Supabase project URL (e.g. `https://xyz.supabase.co`)
    pub supabase_url: String,
    /// Supabase anon key, sent as both `apikey` and bearer token
    pub supabase_anon_key: String,

    // --- Session store ---
    /// Base URL of the app serving `/api/auth/*`
    pub auth_base_url: String,
    /// Where the session store sends the browser after a credential exchange
    pub auth_callback_url: String,
    /// How often the session endpoint is polled
    pub session_poll_interval: Duration,

    // --- Embedding host ---
    /// Raw frame context JSON handed over by the embedding host, if any
    pub frame_context: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test_anon_key".to_string(),
            auth_base_url: "http://localhost:3000".to_string(),
            auth_callback_url: "/".to_string(),
            session_poll_interval: Duration::from_secs(30),
            frame_context: None,
        }
    }
}

impl Config {
    /// Config with fixed values for tests.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let poll_secs = match env::var("SESSION_POLL_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid("SESSION_POLL_SECS"))?,
            Err(_) => 30,
        };

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            auth_base_url: env::var("AUTH_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            auth_callback_url: env::var("AUTH_CALLBACK_URL").unwrap_or_else(|_| "/".to_string()),
            session_poll_interval: Duration::from_secs(poll_secs),
            frame_context: env::var("FRAME_CONTEXT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
