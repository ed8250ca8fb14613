use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored vote direction. "No vote" is the absence of a record and is
/// modeled as `Option<Vote>` everywhere; it is never written to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    /// Signed unit value of this vote as it counts toward a score.
    pub fn value(self) -> i64 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }

    /// Wire/database encoding: 1 for upvote, -1 for downvote.
    pub fn vote_type(self) -> i16 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }

    pub fn from_vote_type(vote_type: i16) -> Option<Self> {
        match vote_type {
            1 => Some(Vote::Up),
            -1 => Some(Vote::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VoteRecord {
    pub id: Uuid,
    pub content_id: Uuid,
    pub voter_id: Uuid,
    pub vote_type: i16, // -1 for downvote, 1 for upvote
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Vote request
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub vote_type: i16, // -1 for downvote, 0 to remove vote, 1 for upvote
}

// Vote response
#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub vote: Option<Vote>,
    pub score: i64,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub score: i64,
}
