use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// ApiError
///
/// The crate-wide failure taxonomy. Every component returns one of these
/// variants instead of leaking storage or transport error types across the
/// request boundary. Each variant carries a human-readable reason naming the
/// offending actor role, field, or state, because callers assert on message
/// content, not just status codes.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Malformed or missing input; the caller's fault.
    Validation(String),
    /// No credential, or a credential missing id/type/role.
    Unauthenticated(String),
    /// Valid credential, insufficient role or ownership.
    Forbidden(String),
    /// Record absent, or the id itself is malformed.
    NotFound(String),
    /// `action = deny`/`restrict` blocks owner mutation until an admin reverts it.
    RecordLocked(String),
    /// State-machine transition not legal from the current state.
    Conflict(String),
    /// Search or storage transient failure; recoverable, never fatal.
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RecordLocked(_) => StatusCode::LOCKED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(m)
            | ApiError::Unauthenticated(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::RecordLocked(m)
            | ApiError::Conflict(m)
            | ApiError::Upstream(m) => m,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiReply::<()> {
            success: false,
            payload: None,
            message: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// ApiReply
///
/// The tri-state response envelope shared by every operation:
/// `Success(payload, message)` serializes with `success = true`,
/// `NotFound`/`Failure` arrive through `ApiError` with `success = false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiReply<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
    pub message: String,
}

impl<T: Serialize> ApiReply<T> {
    pub fn success(payload: T, message: impl Into<String>) -> Self {
        ApiReply {
            success: true,
            payload: Some(payload),
            message: message.into(),
        }
    }
}

/// Shorthand used by the handlers: wrap a payload in the success envelope.
pub fn success<T: Serialize>(payload: T, message: impl Into<String>) -> Json<ApiReply<T>> {
    Json(ApiReply::success(payload, message))
}

pub type ApiResult<T> = Result<T, ApiError>;
