use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{AppState, handlers};

/// Routes for any authenticated actor. Fine-grained authorization (kind,
/// role tier, ownership) happens in the handlers through the policy engine;
/// this layer only guarantees a resolved identity.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_me).put(handlers::update_me))
        .route("/courses", post(handlers::create_course))
        .route("/courses/{id}", put(handlers::update_course))
        .route("/courses/{id}/approval", post(handlers::approve_course))
        .route("/reviews", post(handlers::create_review))
        .route("/reviews/{id}/approval", post(handlers::approve_review))
}
