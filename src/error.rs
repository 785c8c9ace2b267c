use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure a handler can surface, mapped to a status at one boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("username already registered")]
    DuplicateUser,

    #[error("user not found")]
    UserNotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing x-auth-token header")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("meal not found")]
    MealNotFound,

    #[error("not authorized for this meal")]
    Forbidden,

    #[error("meal already saved for that date")]
    DuplicateEntry,

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("nutrition provider authorization failed")]
    TokenUnavailable,

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::DuplicateUser | ApiError::DuplicateEntry => StatusCode::CONFLICT,
            ApiError::UserNotFound
            | ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::MealNotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) | ApiError::Upstream(_) => StatusCode::BAD_REQUEST,
            ApiError::TokenUnavailable | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail is logged, never sent to the client.
        let message = match &self {
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::DuplicateEntry,
            _ => ApiError::Internal(e.into()),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_all_unauthorized() {
        for e in [
            ApiError::UserNotFound,
            ApiError::InvalidCredentials,
            ApiError::MissingToken,
            ApiError::InvalidToken,
        ] {
            assert_eq!(e.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn duplicates_are_conflict() {
        assert_eq!(ApiError::DuplicateUser.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::DuplicateEntry.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let response = ApiError::Internal(anyhow::anyhow!("password_hash column missing"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
