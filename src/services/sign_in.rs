// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign in with Farcaster.
//!
//! The identity provider signs a message over a fresh nonce; the signed
//! message is then handed to the session store's credential callback, which
//! verifies it and issues the session.

use crate::error::{AppError, Result};
use crate::services::session::SessionExchange;
use ring::rand::{SecureRandom, SystemRandom};
use std::future::Future;

const CREDENTIALS_CALLBACK_PATH: &str = "/api/auth/callback/credentials";
const NONCE_BYTES: usize = 16;

/// Message and signature returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    pub message: String,
    pub signature: String,
}

/// Produces a signed sign-in message for a nonce.
pub trait IdentityProvider: Send + Sync + 'static {
    fn sign_in(&self, nonce: &str) -> impl Future<Output = Result<SignedMessage>> + Send;
}

/// Random nonce: 16 bytes from the system CSPRNG, hex encoded.
pub fn generate_nonce() -> Result<String> {
    let mut bytes = [0u8; NONCE_BYTES];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("system randomness unavailable")))?;
    Ok(hex::encode(bytes))
}

/// One-shot sign-in action behind the auth prompt.
pub struct SignInTrigger<P, E> {
    provider: P,
    exchange: E,
    callback_url: String,
}

impl<P: IdentityProvider, E: SessionExchange> SignInTrigger<P, E> {
    /// `callback_url` is where the session store sends the user once signed in.
    pub fn new(provider: P, exchange: E, callback_url: impl Into<String>) -> Self {
        Self {
            provider,
            exchange,
            callback_url: callback_url.into(),
        }
    }

    /// Credential-callback URL (relative to the auth base) carrying the
    /// signed message.
    pub fn handoff_url(&self, signed: &SignedMessage) -> String {
        format!(
            "{}?message={}&signature={}&callbackUrl={}",
            CREDENTIALS_CALLBACK_PATH,
            urlencoding::encode(&signed.message),
            urlencoding::encode(&signed.signature),
            urlencoding::encode(&self.callback_url),
        )
    }

    /// Run the flow, reporting the first failure.
    pub async fn try_sign_in(&self) -> Result<()> {
        let nonce = generate_nonce()?;
        let signed = self.provider.sign_in(&nonce).await?;

        tracing::info!("Identity provider signed message; handing off to session store");
        self.exchange.exchange(&self.handoff_url(&signed)).await
    }

    /// Run the flow, logging failures. Returns whether the handoff went through.
    ///
    /// A failure leaves the auth prompt as it was so the user can retry.
    pub async fn sign_in(&self) -> bool {
        match self.try_sign_in().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Sign-in failed");
                false
            }
        }
    }
}
