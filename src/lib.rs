pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod redis;
pub mod services;
pub mod store;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    redis::RedisClient,
    services::vote_service::VoteService,
    store::{PgContentSource, PgVoteStore},
};

pub type AppVoteService = VoteService<PgVoteStore, PgContentSource>;

#[derive(Clone)]
pub struct AppState {
    pub votes: Arc<AppVoteService>,
    pub redis: Arc<RedisClient>,
    pub config: Arc<Config>,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .allowed_origins
                .iter()
                .map(|origin| origin.parse::<HeaderValue>().unwrap())
                .collect::<Vec<_>>(),
        )
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route(
            "/api/posts/{post_id}/score",
            get(handlers::votes::get_post_score),
        )
        .route(
            "/api/comments/{comment_id}/score",
            get(handlers::votes::get_comment_score),
        );

    // Protected routes
    let protected_routes = Router::new()
        .route(
            "/api/posts/{post_id}/vote",
            post(handlers::votes::vote_post),
        )
        .route(
            "/api/posts/{post_id}/vote",
            delete(handlers::votes::unvote_post),
        )
        .route(
            "/api/posts/{post_id}/vote",
            get(handlers::votes::get_post_vote),
        )
        .route(
            "/api/comments/{comment_id}/vote",
            post(handlers::votes::vote_comment),
        )
        .route(
            "/api/comments/{comment_id}/vote",
            delete(handlers::votes::unvote_comment),
        )
        .route(
            "/api/comments/{comment_id}/vote",
            get(handlers::votes::get_comment_vote),
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
