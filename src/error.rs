use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Where unauthenticated requests to the admin panel are sent.
pub const LOGIN_REDIRECT: &str =
    "/login?error=You+must+be+logged+in+to+access+the+admin+panel";

#[derive(Debug, Error)]
pub enum AppError {
    /// No resolvable principal on the request.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Principal is resolvable but lacks the admin role.
    #[error("Forbidden: You don't have permission to access this page")]
    Forbidden,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AuthenticationRequired => Redirect::to(LOGIN_REDIRECT).into_response(),
            AppError::Forbidden => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": self.to_string() })))
                    .into_response()
            }
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            AppError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": self.to_string() })))
                    .into_response()
            }
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn unauthenticated_redirects_to_login() {
        let res = AppError::AuthenticationRequired.into_response();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(LOCATION).unwrap(), LOGIN_REDIRECT);
    }

    #[test]
    fn forbidden_is_403() {
        let res = AppError::Forbidden.into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn invalid_input_is_400() {
        let res = AppError::InvalidInput("Invalid role".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_is_404() {
        let res = AppError::NotFound("User").into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_is_500() {
        let res = AppError::Storage(anyhow::anyhow!("connection reset")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
