//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_claims::{RoutingError, WizardError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    /// Set when changing answers cannot help and the user should contact support
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub contact_support: bool,
}

impl From<RoutingError> for ApiError {
    fn from(err: RoutingError) -> Self {
        ApiError::Wizard(WizardError::Routing(err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, Option<Vec<String>>) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error", None),
            ApiError::Wizard(err) => match err {
                WizardError::CannotAdvance { missing, .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "cannot_advance",
                    Some(missing.iter().map(|f| f.to_string()).collect()),
                ),
                WizardError::BranchIncomplete { field, .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "branch_incomplete",
                    Some(vec![field.to_string()]),
                ),
                WizardError::Routing(RoutingError::IncompleteAnswers { field }) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "incomplete_answers",
                    Some(vec![field.to_string()]),
                ),
                WizardError::Routing(RoutingError::UnroutableAnswers) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "unroutable_answers", None)
                }
                WizardError::WizardCompleted => (StatusCode::CONFLICT, "wizard_completed", None),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, details) = self.parts();
        let contact_support = matches!(&self, ApiError::Wizard(err) if err.needs_support());

        if contact_support {
            tracing::warn!(error = %self, "answers matched no claim route");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            details,
            contact_support,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_claims::AnswerField;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unroutable_answers_point_to_support() {
        let (status, body) = body_of(RoutingError::UnroutableAnswers.into()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "unroutable_answers");
        assert_eq!(body["contact_support"], true);
    }

    #[tokio::test]
    async fn test_recoverable_errors_omit_support_flag() {
        let err = ApiError::from(RoutingError::IncompleteAnswers {
            field: AnswerField::ClaimType,
        });
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["details"], serde_json::json!(["claim_type"]));
        assert!(body.get("contact_support").is_none());
    }
}
