// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Castmark identity watcher
//!
//! Follows the auth session of the running app, keeps the matching Supabase
//! user row loaded and logs every change of the identity read model.

use castmark::{config::Config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        auth_base_url = %config.auth_base_url,
        poll_secs = config.session_poll_interval.as_secs(),
        "Starting Castmark identity watcher"
    );

    let state = AppState::from_config(config)?;

    let poller = state.sessions.spawn_poller();
    let reconciler = state.reconciler.start(state.sessions.subscribe());

    let mut watcher = state.reconciler.subscribe();
    loop {
        tokio::select! {
            changed = watcher.changed() => {
                let Some(view) = changed else { break };
                tracing::info!(
                    fid = ?view.db_user.as_ref().map(|u| u.fid),
                    username = ?view.db_user.as_ref().and_then(|u| u.username.clone()),
                    hint_fid = ?view.context_user.as_ref().map(|u| u.fid),
                    loading = view.loading,
                    authenticated = view.is_authenticated,
                    "User context updated"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    reconciler.shutdown().await;
    poller.abort();
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("castmark=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
