use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{ContentKind, ContentRef, ScoreResponse, Vote, VoteRequest, VoteResponse},
};

async fn check_vote_rate_limit(state: &AppState, user_id: Uuid, kind: ContentKind) -> Result<()> {
    let (limit, window_seconds) = match kind {
        // 100 post votes per hour
        ContentKind::Post => (100, 3600),
        // 30 comment votes per minute
        ContentKind::Comment => (30, 60),
    };

    let rate_limit_key = format!("vote_{}:{}", kind.as_str(), user_id);
    if !state
        .redis
        .check_rate_limit(&rate_limit_key, limit, window_seconds)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    Ok(())
}

async fn cast_or_clear(
    state: &AppState,
    auth_user: &AuthUser,
    content: ContentRef,
    payload: VoteRequest,
) -> Result<Json<VoteResponse>> {
    // Validate vote type
    if ![-1, 0, 1].contains(&payload.vote_type) {
        return Err(AppError::BadRequest("Invalid vote type".to_string()));
    }

    check_vote_rate_limit(state, auth_user.user_id, content.kind).await?;

    let response = match Vote::from_vote_type(payload.vote_type) {
        Some(vote) => state.votes.cast(auth_user.user_id, content, vote).await?,
        // vote_type 0 removes the vote
        None => state.votes.clear(auth_user.user_id, content).await?,
    };

    Ok(Json(response))
}

async fn clear_vote(
    state: &AppState,
    auth_user: &AuthUser,
    content: ContentRef,
) -> Result<Json<VoteResponse>> {
    check_vote_rate_limit(state, auth_user.user_id, content.kind).await?;

    let response = state.votes.clear(auth_user.user_id, content).await?;

    Ok(Json(response))
}

async fn my_vote(
    state: &AppState,
    auth_user: &AuthUser,
    content: ContentRef,
) -> Result<Json<VoteResponse>> {
    let vote = state.votes.vote_state(auth_user.user_id, content).await?;
    let score = state.votes.score(content).await?;

    Ok(Json(VoteResponse { vote, score }))
}

pub async fn vote_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    cast_or_clear(&state, &auth_user, ContentRef::post(post_id), payload).await
}

pub async fn unvote_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<VoteResponse>> {
    clear_vote(&state, &auth_user, ContentRef::post(post_id)).await
}

pub async fn get_post_vote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<VoteResponse>> {
    my_vote(&state, &auth_user, ContentRef::post(post_id)).await
}

pub async fn get_post_score(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<ScoreResponse>> {
    let score = state.votes.score(ContentRef::post(post_id)).await?;
    Ok(Json(ScoreResponse { score }))
}

pub async fn vote_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    cast_or_clear(&state, &auth_user, ContentRef::comment(comment_id), payload).await
}

pub async fn unvote_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<VoteResponse>> {
    clear_vote(&state, &auth_user, ContentRef::comment(comment_id)).await
}

pub async fn get_comment_vote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<VoteResponse>> {
    my_vote(&state, &auth_user, ContentRef::comment(comment_id)).await
}

pub async fn get_comment_score(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<ScoreResponse>> {
    let score = state.votes.score(ContentRef::comment(comment_id)).await?;
    Ok(Json(ScoreResponse { score }))
}
