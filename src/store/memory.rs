//! In-memory backends, used by the test suite and for running the service
//! without external infrastructure. Handles are cheap clones over shared
//! state, like the pool-backed Postgres handles.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{ContentHead, ContentRef, Vote},
    store::{ContentSource, VoteStore},
};

#[derive(Clone, Default)]
pub struct MemoryVoteStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    votes: HashMap<(ContentRef, Uuid), Vote>,
    scores: HashMap<ContentRef, i64>,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the score from the individual vote records. Consistency
    /// check only; the serving path always reads the maintained counter.
    pub async fn recount(&self, content: ContentRef) -> i64 {
        let inner = self.inner.lock().await;
        inner
            .votes
            .iter()
            .filter(|((c, _), _)| *c == content)
            .map(|(_, vote)| vote.value())
            .sum()
    }

    /// Number of live vote records for the content item.
    pub async fn record_count(&self, content: ContentRef) -> usize {
        let inner = self.inner.lock().await;
        inner.votes.keys().filter(|(c, _)| *c == content).count()
    }
}

impl VoteStore for MemoryVoteStore {
    async fn current(&self, content: ContentRef, voter_id: Uuid) -> Result<Option<Vote>> {
        let inner = self.inner.lock().await;
        Ok(inner.votes.get(&(content, voter_id)).copied())
    }

    async fn commit(
        &self,
        content: ContentRef,
        voter_id: Uuid,
        expected: Option<Vote>,
        next: Option<Vote>,
        delta: i64,
    ) -> Result<i64> {
        let mut inner = self.inner.lock().await;

        let live = inner.votes.get(&(content, voter_id)).copied();
        if live != expected {
            return Err(AppError::Conflict("concurrent vote update".to_string()));
        }

        match next {
            None => {
                inner.votes.remove(&(content, voter_id));
            }
            Some(vote) => {
                inner.votes.insert((content, voter_id), vote);
            }
        }

        if delta != 0 {
            let score = inner.scores.entry(content).or_insert(0);
            *score += delta;
        }

        Ok(inner.scores.get(&content).copied().unwrap_or(0))
    }

    async fn score(&self, content: ContentRef) -> Result<i64> {
        let inner = self.inner.lock().await;
        Ok(inner.scores.get(&content).copied().unwrap_or(0))
    }
}

#[derive(Clone, Default)]
pub struct MemoryContentSource {
    entries: Arc<Mutex<HashMap<ContentRef, ContentHead>>>,
}

impl MemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, content: ContentRef, author_id: Uuid, deleted: bool) {
        let mut entries = self.entries.lock().await;
        entries.insert(content, ContentHead { author_id, deleted });
    }

    pub async fn mark_deleted(&self, content: ContentRef) {
        let mut entries = self.entries.lock().await;
        if let Some(head) = entries.get_mut(&content) {
            head.deleted = true;
        }
    }
}

impl ContentSource for MemoryContentSource {
    async fn head(&self, content: ContentRef) -> Result<Option<ContentHead>> {
        let entries = self.entries.lock().await;
        Ok(entries.get(&content).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentKind;

    fn content() -> ContentRef {
        ContentRef {
            kind: ContentKind::Post,
            id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn commit_applies_record_and_delta_together() {
        let store = MemoryVoteStore::new();
        let c = content();
        let voter = Uuid::new_v4();

        let score = store
            .commit(c, voter, None, Some(Vote::Up), 1)
            .await
            .unwrap();
        assert_eq!(score, 1);
        assert_eq!(store.current(c, voter).await.unwrap(), Some(Vote::Up));
        assert_eq!(store.recount(c).await, 1);
    }

    #[tokio::test]
    async fn commit_rejects_stale_expected_state() {
        let store = MemoryVoteStore::new();
        let c = content();
        let voter = Uuid::new_v4();

        store
            .commit(c, voter, None, Some(Vote::Up), 1)
            .await
            .unwrap();

        // Computed from "none" but the record now holds an upvote.
        let err = store
            .commit(c, voter, None, Some(Vote::Down), -1)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.score(c).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_of_absent_record_is_silent() {
        let store = MemoryVoteStore::new();
        let c = content();
        let voter = Uuid::new_v4();

        let score = store.commit(c, voter, None, None, 0).await.unwrap();
        assert_eq!(score, 0);
        assert_eq!(store.record_count(c).await, 0);
    }

    #[tokio::test]
    async fn score_defaults_to_zero_without_votes() {
        let store = MemoryVoteStore::new();
        assert_eq!(store.score(content()).await.unwrap(), 0);
    }
}
