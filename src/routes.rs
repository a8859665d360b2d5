// Router for the StakeChain API

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app_state::SharedState;
use crate::handlers::*;

pub fn router(state: SharedState) -> Router {
    Router::new()
        // ===== HEALTH CHECK =====
        .route("/", get(health_check))
        .route("/health", get(health_check))
        // ===== EVENTS =====
        .route("/events", post(create_event))
        .route("/events/:id", get(get_event))
        .route("/events/:id/bets", get(get_bets).post(place_bet))
        // ===== SETTLEMENT & CLAIMS =====
        .route("/events/:id/settle", post(settle))
        .route("/events/:id/settlement", get(get_settlement))
        .route("/events/:id/claim", post(claim))
        .route("/events/:id/claimable/:account", get(get_claimable))
        // ===== ACCESS CONTROL =====
        .route("/owner", get(get_owner).post(transfer_ownership))
        .route("/resolver", post(set_resolver))
        .route("/creation-policy", post(set_creation_policy))
        // ===== INDEXER FEED & AUDIT =====
        .route("/notifications", get(get_notifications).delete(prune_notifications))
        .route("/audit", get(audit))
        // ===== FUNDS =====
        .route("/funds/deposit", post(deposit))
        .route("/funds/:account", get(get_balance))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
