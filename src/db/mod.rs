//! Record store layer (Supabase / PostgREST).

pub mod supabase;

pub use supabase::SupabaseDb;

use crate::error::Result;
use crate::models::User;
use std::future::Future;

/// Table names as constants.
pub mod tables {
    pub const USERS: &str = "users";
    pub const BOOKMARKS: &str = "bookmarks";
    pub const TAGS: &str = "tags";
    pub const COLLECTIONS: &str = "collections";
}

/// Exact-match lookup of user rows by fid.
pub trait UserRecords: Send + Sync + 'static {
    /// Fetch the `users` row for `fid`.
    ///
    /// `Ok(None)` when no row exists; more than one row is an error.
    fn user_by_fid(&self, fid: u64) -> impl Future<Output = Result<Option<User>>> + Send;
}
