// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Supabase REST (PostgREST) client with typed reads.
//!
//! Provides exact-match reads for:
//! - Users (looked up by fid)
//! - Bookmarks (with tags embedded through the join table)
//! - Tags
//! - Collections (optionally with their bookmarks)

use crate::config::Config;
use crate::db::{tables, UserRecords};
use crate::error::{AppError, Result};
use crate::models::{Bookmark, Collection, Tag, User};
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Supabase REST client.
#[derive(Clone)]
pub struct SupabaseDb {
    http: reqwest::Client,
    rest_url: String,
    anon_key: String,
}

impl SupabaseDb {
    /// Create a client for the project at `project_url`.
    pub fn new(project_url: &str, anon_key: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building Supabase HTTP client")?;

        let rest_url = format!("{}/rest/v1", project_url.trim_end_matches('/'));
        tracing::info!(rest_url = %rest_url, "Supabase client initialized");

        Ok(Self {
            http,
            rest_url,
            anon_key: anon_key.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.supabase_url, &config.supabase_anon_key)
    }

    // ─── Users ───────────────────────────────────────────────────────────────

    /// Fetch the user row with the given fid (zero or one).
    pub async fn get_user_by_fid(&self, fid: u64) -> Result<Option<User>> {
        self.select_one(
            tables::USERS,
            &[("fid", format!("eq.{}", fid)), ("select", "*".to_string())],
        )
        .await
    }

    // ─── Bookmarks / Tags / Collections ──────────────────────────────────────

    /// All bookmarks owned by `user_id`, newest first, with their tags.
    pub async fn bookmarks_for_user(&self, user_id: &str) -> Result<Vec<Bookmark>> {
        self.select(
            tables::BOOKMARKS,
            &[
                ("user_id", format!("eq.{}", user_id)),
                ("select", "*,tags(*)".to_string()),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    /// All tags owned by `user_id`, alphabetical.
    pub async fn tags_for_user(&self, user_id: &str) -> Result<Vec<Tag>> {
        self.select(
            tables::TAGS,
            &[
                ("user_id", format!("eq.{}", user_id)),
                ("select", "*".to_string()),
                ("order", "name.asc".to_string()),
            ],
        )
        .await
    }

    /// All collections owned by `user_id`, most recently updated first.
    pub async fn collections_for_user(&self, user_id: &str) -> Result<Vec<Collection>> {
        self.select(
            tables::COLLECTIONS,
            &[
                ("user_id", format!("eq.{}", user_id)),
                ("select", "*".to_string()),
                ("order", "updated_at.desc".to_string()),
            ],
        )
        .await
    }

    /// A single collection with its bookmarks (and their tags) embedded.
    pub async fn collection_with_bookmarks(
        &self,
        collection_id: &str,
    ) -> Result<Option<Collection>> {
        self.select_one(
            tables::COLLECTIONS,
            &[
                ("id", format!("eq.{}", collection_id)),
                ("select", "*,bookmarks(*,tags(*))".to_string()),
            ],
        )
        .await
    }

    // ─── Helpers ─────────────────────────────────────────────────────────────

    /// Select at most one row. Asks for two so duplicates are detected.
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &'static str,
        filters: &[(&str, String)],
    ) -> Result<Option<T>> {
        let mut query = filters.to_vec();
        query.push(("limit", "2".to_string()));

        let mut rows: Vec<T> = self.select(table, &query).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            count => Err(AppError::MultipleRows { table, count }),
        }
    }

    /// Generic GET against a table with PostgREST filters.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.rest_url, table);

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::RecordStore(format!("{} request failed: {}", table, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(table, error = %e, "Failed reading error body");
                String::new()
            });
            return Err(AppError::RecordStore(format!(
                "{} returned HTTP {}: {}",
                table, status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::RecordStore(format!("{} JSON parse error: {}", table, e)))
    }
}

impl UserRecords for SupabaseDb {
    async fn user_by_fid(&self, fid: u64) -> Result<Option<User>> {
        self.get_user_by_fid(fid).await
    }
}
