//! Vote orchestration: ownership guard, transition, atomic commit, retry.

use std::time::Duration;

use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{ContentHead, ContentKind, ContentRef, Vote, VoteResponse},
    services::transition::{self, Transition},
    store::{ContentSource, VoteStore},
};

/// Commit attempts before a contended vote is surfaced as a transient
/// failure. NotFound/Forbidden are never retried.
const MAX_COMMIT_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(25);

/// Drives the vote state machine. Owns its storage backends; no ambient
/// handles.
#[derive(Clone)]
pub struct VoteService<S, C> {
    store: S,
    content: C,
}

impl<S, C> VoteService<S, C>
where
    S: VoteStore,
    C: ContentSource,
{
    pub fn new(store: S, content: C) -> Self {
        Self { store, content }
    }

    /// Cast an upvote or downvote. Repeating the active direction toggles
    /// the vote off; the opposite direction switches in one step. Voting on
    /// one's own content is forbidden.
    pub async fn cast(
        &self,
        voter_id: Uuid,
        content: ContentRef,
        requested: Vote,
    ) -> Result<VoteResponse> {
        let head = self.guard(content).await?;
        if head.author_id == voter_id {
            return Err(AppError::Authorization(
                "Cannot vote on your own content".to_string(),
            ));
        }

        self.apply(voter_id, content, |current| {
            transition::next(current, requested)
        })
        .await
    }

    /// Remove the voter's vote, whatever it currently is. Idempotent: with
    /// no live vote this observes "none" and commits nothing. Also a no-op
    /// for the content's own author, who can never have a vote record.
    pub async fn clear(&self, voter_id: Uuid, content: ContentRef) -> Result<VoteResponse> {
        self.guard(content).await?;
        self.apply(voter_id, content, transition::clear).await
    }

    /// The caller's own vote state. Requires the content to exist, but reads
    /// are not subject to the self-vote restriction. Other users' individual
    /// votes are never disclosed, only the aggregate score.
    pub async fn vote_state(&self, voter_id: Uuid, content: ContentRef) -> Result<Option<Vote>> {
        self.guard(content).await?;
        self.store.current(content, voter_id).await
    }

    /// Current score. A content item nobody voted on has score 0; no
    /// existence or authentication requirement.
    pub async fn score(&self, content: ContentRef) -> Result<i64> {
        self.store.score(content).await
    }

    /// Content must exist and not be deleted before any vote operation.
    async fn guard(&self, content: ContentRef) -> Result<ContentHead> {
        match self.content.head(content).await? {
            Some(head) if !head.deleted => Ok(head),
            _ => Err(AppError::NotFound(match content.kind {
                ContentKind::Post => "Post not found".to_string(),
                ContentKind::Comment => "Comment not found".to_string(),
            })),
        }
    }

    /// Read current state, compute the transition, commit record mutation
    /// and score delta atomically. The commit re-checks the state it was
    /// computed from; on contention we re-read and retry a bounded number
    /// of times.
    async fn apply<F>(&self, voter_id: Uuid, content: ContentRef, decide: F) -> Result<VoteResponse>
    where
        F: Fn(Option<Vote>) -> Transition,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let current = self.store.current(content, voter_id).await?;
            let t = decide(current);

            // Nothing to persist (e.g. clearing an absent vote); read the
            // score instead of opening a write transaction.
            if t.next == current && t.delta == 0 {
                let score = self.store.score(content).await?;
                return Ok(VoteResponse {
                    vote: current,
                    score,
                });
            }

            match self
                .store
                .commit(content, voter_id, current, t.next, t.delta)
                .await
            {
                Ok(score) => {
                    return Ok(VoteResponse {
                        vote: t.next,
                        score,
                    });
                }
                Err(e) if e.is_retryable() && attempt < MAX_COMMIT_ATTEMPTS => {
                    tracing::debug!(
                        voter_id = %voter_id,
                        content_id = %content.id,
                        attempt,
                        "vote commit contended, retrying"
                    );
                    tokio::time::sleep(RETRY_BASE_DELAY * attempt).await;
                }
                Err(e) if e.is_retryable() => {
                    return Err(AppError::Conflict(
                        "Vote could not be recorded, please try again".to_string(),
                    ));
                }
                Err(e) => return Err(e),
            }
        }
    }
}
