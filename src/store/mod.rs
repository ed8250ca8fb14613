//! Storage seam for the vote subsystem.
//!
//! `VoteStore` owns both the per-voter vote records and the denormalized
//! per-content score, because the two must commit together. `ContentSource`
//! is the boundary to the content collaborator (posts/comments live outside
//! this subsystem; we only read author and deletion status).
//!
//! All methods return `Send` futures so the traits can be used from a
//! multi-threaded tokio runtime behind axum.

pub mod memory;
pub mod postgres;

use std::future::Future;

use uuid::Uuid;

use crate::{
    error::Result,
    models::{ContentHead, ContentRef, Vote},
};

pub use memory::{MemoryContentSource, MemoryVoteStore};
pub use postgres::{PgContentSource, PgVoteStore};

/// Durable storage of vote records plus the running score per content item.
///
/// Invariants the backend must uphold:
/// - at most one record per (content, voter); "none" is absence of a record;
/// - the score row is created lazily at 0 and mutated only by atomic
///   increments, never by an application-level read-modify-write;
/// - `commit` applies the record mutation and the score delta in one
///   transaction, or neither.
pub trait VoteStore: Send + Sync {
    /// The voter's current vote on this content, `None` when no record
    /// exists. Plain read, no side effects.
    fn current(
        &self,
        content: ContentRef,
        voter_id: Uuid,
    ) -> impl Future<Output = Result<Option<Vote>>> + Send + '_;

    /// Atomically persist one transition: delete the record when `next` is
    /// `None`, upsert it otherwise, and add `delta` to the content score.
    /// Returns the committed score.
    ///
    /// `expected` is the state the transition was computed from. If the live
    /// record no longer matches (a concurrent commit for the same voter won),
    /// the backend must abort with a retryable `Conflict` so the caller can
    /// re-read and recompute.
    fn commit(
        &self,
        content: ContentRef,
        voter_id: Uuid,
        expected: Option<Vote>,
        next: Option<Vote>,
        delta: i64,
    ) -> impl Future<Output = Result<i64>> + Send + '_;

    /// Current score for the content item; 0 when no votes were ever cast.
    fn score(&self, content: ContentRef) -> impl Future<Output = Result<i64>> + Send + '_;
}

/// Read-only view of the content collaborator.
pub trait ContentSource: Send + Sync {
    /// Author and deletion status for a content item, `None` when the item
    /// does not exist.
    fn head(
        &self,
        content: ContentRef,
    ) -> impl Future<Output = Result<Option<ContentHead>>> + Send + '_;
}
