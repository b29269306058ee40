// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - identity, session and sign-in logic.

pub mod host_context;
pub mod reconciler;
pub mod session;
pub mod sign_in;

pub use host_context::{HostContext, JsonHostContext, StaticHostContext};
pub use reconciler::{IdentityReconciler, ReconcilerHandle, UserContextWatcher};
pub use session::{HttpSessionStore, SessionExchange};
pub use sign_in::{generate_nonce, IdentityProvider, SignInTrigger, SignedMessage};
