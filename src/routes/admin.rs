use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::{AppState, handlers};

/// The `/admin` nest. Every handler here re-checks the actor's admin tier
/// through the policy engine; the nest itself only requires authentication.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admins", get(handlers::list_admins))
        .route(
            "/admins/{id}",
            get(handlers::get_admin)
                .patch(handlers::modify_admin)
                .delete(handlers::destroy_admin),
        )
        .route(
            "/vendors/{id}",
            patch(handlers::moderate_vendor).delete(handlers::destroy_vendor),
        )
        .route("/vendors/{id}/approval", post(handlers::approve_vendor))
        .route("/courses", get(handlers::list_all_courses))
        .route(
            "/courses/{id}",
            patch(handlers::moderate_course).delete(handlers::destroy_course),
        )
        .route("/categories", post(handlers::create_category))
        .route(
            "/categories/{id}",
            patch(handlers::update_category).delete(handlers::destroy_category),
        )
        .route(
            "/reviews/{id}",
            patch(handlers::moderate_review).delete(handlers::destroy_review),
        )
        .route("/stats", get(handlers::get_stats))
}
