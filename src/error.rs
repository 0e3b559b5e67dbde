use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::auth::jwt::TokenError;

/// Error taxonomy for the whole HTTP surface.
///
/// `NotFound` covers both truly-absent resources and resources the caller is
/// not allowed to see; the two cases must stay indistinguishable on the wire.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("identifier already registered")]
    DuplicateIdentifier,
    #[error("unknown role: {0}")]
    InvalidRole(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid credentials")]
    AuthFailure,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("not found")]
    NotFound,
    #[error("classifier unavailable")]
    Classifier(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Internal(other.into()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::DuplicateIdentifier | Self::InvalidRole(_) | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::AuthFailure | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Classifier(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal detail is logged, never sent to the caller.
        match &self {
            Self::Internal(e) => error!(error = %e, "internal error"),
            Self::Classifier(e) => error!(error = %e, "classifier error"),
            _ => {}
        }
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_400() {
        assert_eq!(
            ApiError::DuplicateIdentifier.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidRole("dosen".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidInput("problem must not be blank".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn auth_errors_map_to_401() {
        assert_eq!(ApiError::AuthFailure.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::Token(TokenError::Expired).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn not_found_and_classifier_statuses() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Classifier(anyhow::anyhow!("down")).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn internal_error_hides_detail() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to db"));
        assert_eq!(err.to_string(), "internal error");
    }
}
