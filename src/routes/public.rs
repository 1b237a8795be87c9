use axum::{
    Router,
    routing::{get, post},
};

use crate::{AppState, handlers};

/// Routes that require no credential: registration, the storefront
/// catalogue, vendor lookup/search and the attribute existence probe.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/courses", get(handlers::list_courses))
        .route("/courses/{id}", get(handlers::get_course))
        .route("/categories", get(handlers::list_categories))
        .route("/vendors/search", get(handlers::search_vendors))
        .route("/vendors/{domain}", get(handlers::get_vendor_by_domain))
        .route(
            "/verify/{kind}/{attribute}/{value}",
            get(handlers::verify_attribute),
        )
}
