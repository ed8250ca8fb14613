//! Postgres backends for [`VoteStore`] and [`ContentSource`].

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{ContentHead, ContentKind, ContentRef, Vote, VoteRecord},
    store::{ContentSource, VoteStore},
};

#[derive(Clone)]
pub struct PgVoteStore {
    pool: PgPool,
}

impl PgVoteStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Commit-time failures that are worth retrying: serialization failures,
/// deadlocks, and the unique-key race two first-time voters can hit when
/// inserting the same (content, voter) row.
fn map_commit_err(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if let Some(code) = db.code() {
            if code == "40001" || code == "40P01" || code == "23505" {
                return AppError::Conflict("concurrent vote update".to_string());
            }
        }
    }
    AppError::Database(e)
}

fn decode_vote(vote_type: i16) -> Result<Vote> {
    Vote::from_vote_type(vote_type)
        .ok_or_else(|| AppError::Internal(format!("invalid stored vote_type {vote_type}")))
}

impl VoteStore for PgVoteStore {
    async fn current(&self, content: ContentRef, voter_id: Uuid) -> Result<Option<Vote>> {
        let record = sqlx::query_as::<_, VoteRecord>(
            r#"
            SELECT id, content_id, voter_id, vote_type, created_at, updated_at
            FROM content_votes
            WHERE content_kind = $1 AND content_id = $2 AND voter_id = $3
            "#,
        )
        .bind(content.kind.as_str())
        .bind(content.id)
        .bind(voter_id)
        .fetch_optional(&self.pool)
        .await?;

        match record {
            Some(record) => Ok(Some(decode_vote(record.vote_type)?)),
            None => Ok(None),
        }
    }

    async fn commit(
        &self,
        content: ContentRef,
        voter_id: Uuid,
        expected: Option<Vote>,
        next: Option<Vote>,
        delta: i64,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        // Lock the voter's record and verify the transition was computed
        // from the state that is still live. A mismatch means a concurrent
        // commit for the same voter won; the caller re-reads and retries.
        let live = sqlx::query(
            r#"
            SELECT vote_type FROM content_votes
            WHERE content_kind = $1 AND content_id = $2 AND voter_id = $3
            FOR UPDATE
            "#,
        )
        .bind(content.kind.as_str())
        .bind(content.id)
        .bind(voter_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_commit_err)?;

        let live = match live {
            Some(row) => Some(decode_vote(row.try_get("vote_type")?)?),
            None => None,
        };

        if live != expected {
            return Err(AppError::Conflict("concurrent vote update".to_string()));
        }

        match next {
            None => {
                sqlx::query(
                    r#"
                    DELETE FROM content_votes
                    WHERE content_kind = $1 AND content_id = $2 AND voter_id = $3
                    "#,
                )
                .bind(content.kind.as_str())
                .bind(content.id)
                .bind(voter_id)
                .execute(&mut *tx)
                .await
                .map_err(map_commit_err)?;
            }
            // A plain INSERT, not an upsert: when two first votes by the same
            // voter race, the row lock above protects neither (there is no
            // row yet), so the unique key is what makes the loser fail with
            // 23505 and retry against the winner's committed state.
            Some(vote) if expected.is_none() => {
                sqlx::query(
                    r#"
                    INSERT INTO content_votes (id, content_kind, content_id, voter_id, vote_type, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(content.kind.as_str())
                .bind(content.id)
                .bind(voter_id)
                .bind(vote.vote_type())
                .execute(&mut *tx)
                .await
                .map_err(map_commit_err)?;
            }
            Some(vote) => {
                sqlx::query(
                    r#"
                    UPDATE content_votes SET vote_type = $4, updated_at = NOW()
                    WHERE content_kind = $1 AND content_id = $2 AND voter_id = $3
                    "#,
                )
                .bind(content.kind.as_str())
                .bind(content.id)
                .bind(voter_id)
                .bind(vote.vote_type())
                .execute(&mut *tx)
                .await
                .map_err(map_commit_err)?;
            }
        }

        // Single atomic increment; the score row materializes at 0 on first
        // touch. Never read-modify-write at this layer.
        let score: i64 = if delta != 0 {
            sqlx::query(
                r#"
                INSERT INTO content_scores (content_kind, content_id, score, updated_at)
                VALUES ($1, $2, $3, NOW())
                ON CONFLICT (content_kind, content_id)
                DO UPDATE SET score = content_scores.score + $3, updated_at = NOW()
                RETURNING score
                "#,
            )
            .bind(content.kind.as_str())
            .bind(content.id)
            .bind(delta)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_commit_err)?
            .try_get("score")?
        } else {
            sqlx::query(
                r#"
                SELECT score FROM content_scores
                WHERE content_kind = $1 AND content_id = $2
                "#,
            )
            .bind(content.kind.as_str())
            .bind(content.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_commit_err)?
            .map(|row| row.try_get("score"))
            .transpose()?
            .unwrap_or(0)
        };

        tx.commit().await.map_err(map_commit_err)?;

        Ok(score)
    }

    async fn score(&self, content: ContentRef) -> Result<i64> {
        let row = sqlx::query(
            r#"
            SELECT score FROM content_scores
            WHERE content_kind = $1 AND content_id = $2
            "#,
        )
        .bind(content.kind.as_str())
        .bind(content.id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|row| row.try_get("score"))
            .transpose()?
            .unwrap_or(0))
    }
}

/// Reads author and deletion status from the platform's content tables.
/// Those tables are owned by the content service; this subsystem never
/// writes them.
#[derive(Clone)]
pub struct PgContentSource {
    pool: PgPool,
}

impl PgContentSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ContentSource for PgContentSource {
    async fn head(&self, content: ContentRef) -> Result<Option<ContentHead>> {
        // Removed/spam content is as unvotable as deleted content.
        let sql = match content.kind {
            ContentKind::Post => {
                "SELECT author_id, status <> 'active' AS deleted FROM posts WHERE id = $1"
            }
            ContentKind::Comment => {
                "SELECT author_id, status <> 'active' AS deleted FROM comments WHERE id = $1"
            }
        };

        let row = sqlx::query(sql)
            .bind(content.id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(ContentHead {
                author_id: row.try_get("author_id")?,
                deleted: row.try_get("deleted")?,
            })),
            None => Ok(None),
        }
    }
}
