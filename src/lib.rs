use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Domain core: state machines, policy, mutation and approval semantics.
pub mod approval;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod mutation;
pub mod policy;

// Collaborators: persistence, search, notifications, identity, config.
pub mod auth;
pub mod config;
pub mod notify;
pub mod repository;
pub mod search;

// HTTP surface.
pub mod handlers;
pub mod routes;

use models::Actor;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, ApiReply, ApiResult};
pub use notify::{LogNotifier, MockNotifier, NotifierState};
pub use repository::{MemoryStore, PostgresStore, StoreState};
pub use search::{MockSearch, SearchState, StoreSearch};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the
/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register, handlers::list_courses, handlers::get_course,
        handlers::list_categories, handlers::get_vendor_by_domain, handlers::search_vendors,
        handlers::verify_attribute, handlers::get_me, handlers::update_me,
        handlers::create_course, handlers::update_course, handlers::approve_course,
        handlers::create_review, handlers::approve_review, handlers::list_admins,
        handlers::get_admin, handlers::modify_admin, handlers::destroy_admin,
        handlers::moderate_vendor, handlers::approve_vendor, handlers::destroy_vendor,
        handlers::list_all_courses, handlers::moderate_course, handlers::destroy_course,
        handlers::create_category, handlers::update_category, handlers::destroy_category,
        handlers::moderate_review, handlers::destroy_review, handlers::get_stats
    ),
    components(
        schemas(
            models::Standing, models::AdminAction, models::Approval, models::AdminRole,
            models::ActorKind, models::ReviewSubject, models::Address, models::WishlistEntry,
            models::CartEntry, models::AdminRecord, models::VendorRecord, models::CustomerRecord,
            models::CourseRecord, models::CategoryRecord, models::ReviewRecord,
            models::RegisterRequest, models::ProfilePatch, models::AdminModifyRequest,
            models::VendorModerationRequest, models::ModerationRequest, models::ApprovalRequest,
            models::CreateCourseRequest, models::CoursePatch, models::CreateCategoryRequest,
            models::CategoryPatch, models::CreateReviewRequest, models::VendorSummary,
            models::ExistsReply, models::DashboardStats,
        )
    ),
    tags(
        (name = "coursemart", description = "Multi-tenant course marketplace API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of application services: store, search
/// index, notifier and configuration. Cloned per request, all handles are
/// cheap `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreState,
    pub search: SearchState,
    pub notifier: NotifierState,
    pub config: AppConfig,
}

// FromRef implementations let extractors pull individual services out of
// the unified state.

impl FromRef<AppState> for StoreState {
    fn from_ref(app_state: &AppState) -> StoreState {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for SearchState {
    fn from_ref(app_state: &AppState) -> SearchState {
        app_state.search.clone()
    }
}

impl FromRef<AppState> for NotifierState {
    fn from_ref(app_state: &AppState) -> NotifierState {
        app_state.notifier.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for the authenticated and admin route groups: resolving an
/// [`Actor`] must succeed before the handler runs. Failure short-circuits
/// with the extractor's own rejection.
async fn auth_middleware(_actor: Actor, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, middleware stack and shared state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .nest(
            "/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Correlates every log line of a request by its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
