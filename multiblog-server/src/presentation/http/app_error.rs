use crate::domain::error::{DomainError, ErrorKind};
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("admin access required")]
    Forbidden,

    #[error("request timed out")]
    Timeout,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorEnvelope {
    pub(crate) success: bool,
    pub(crate) error: ErrorBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorBody {
    /// One of `validation_error`, `not_found`, `conflict`, `forbidden`,
    /// `unauthenticated`, `request_timeout`, `internal_error`.
    pub(crate) code: &'static str,
    pub(crate) message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) fields: Vec<FieldError>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct FieldError {
    pub(crate) field: String,
    pub(crate) code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

fn kind_status(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "validation_error"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
        ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
        ErrorKind::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
        ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
}

fn validator_fields(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| FieldError {
                field: field.to_string(),
                code: err.code.to_string(),
                message: err.message.as_ref().map(|m| m.to_string()),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            AppError::Domain(err) => {
                let (status, code) = kind_status(err.kind());
                match err {
                    DomainError::Validation { field, message } => (
                        status,
                        code,
                        format!("validation failed for '{field}'"),
                        vec![FieldError {
                            field: field.to_string(),
                            code: "invalid".to_string(),
                            message: Some(message.to_string()),
                        }],
                    ),
                    DomainError::Unexpected(detail) => {
                        error!(error = %detail, "unexpected domain error");
                        (status, code, "internal error".to_string(), Vec::new())
                    }
                    other => (status, code, other.to_string(), Vec::new()),
                }
            }
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "request validation failed".to_string(),
                validator_fields(&err),
            ),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg, Vec::new())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "unauthorized".to_string(),
                Vec::new(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "admin access required".to_string(),
                Vec::new(),
            ),
            AppError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "request_timeout",
                "request timed out".to_string(),
                Vec::new(),
            ),
            AppError::Internal(err) => {
                error!(error = ?err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error".to_string(),
                    Vec::new(),
                )
            }
        };

        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code,
                message,
                fields,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::Value;
    use validator::Validate;

    use super::AppError;
    use crate::domain::error::DomainError;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        let json = serde_json::from_slice(&bytes).expect("body must be json");
        (status, json)
    }

    #[tokio::test]
    async fn domain_kinds_map_to_status_and_code() {
        let cases = [
            (DomainError::NotFound("post id: 1".into()), StatusCode::NOT_FOUND, "not_found"),
            (DomainError::AlreadyExists("email".into()), StatusCode::CONFLICT, "conflict"),
            (DomainError::Forbidden("nope"), StatusCode::FORBIDDEN, "forbidden"),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED, "unauthenticated"),
            (DomainError::AccountDisabled, StatusCode::UNAUTHORIZED, "unauthenticated"),
        ];

        for (err, status, code) in cases {
            let (actual, body) = render(AppError::from(err)).await;
            assert_eq!(actual, status);
            assert_eq!(body["success"], false);
            assert_eq!(body["error"]["code"], code);
            assert!(body["error"].get("fields").is_none());
        }
    }

    #[tokio::test]
    async fn unexpected_errors_hide_details() {
        let (status, body) =
            render(DomainError::Unexpected("connection reset by peer".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "internal_error");
        assert_eq!(body["error"]["message"], "internal error");
    }

    #[tokio::test]
    async fn domain_validation_reports_field() {
        let (status, body) =
            render(DomainError::validation("title", "must be 5..200 chars").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["fields"][0]["field"], "title");
        assert_eq!(body["error"]["fields"][0]["message"], "must be 5..200 chars");
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3))]
        name: String,
        #[validate(email)]
        email: String,
    }

    #[tokio::test]
    async fn validator_errors_list_every_field() {
        let err = Probe {
            name: "x".to_string(),
            email: "not-an-email".to_string(),
        }
        .validate()
        .expect_err("probe is invalid");

        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = body["error"]["fields"].as_array().expect("fields array");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["field"], "email");
        assert_eq!(fields[0]["code"], "email");
        assert_eq!(fields[1]["field"], "name");
        assert_eq!(fields[1]["code"], "length");
    }

    #[tokio::test]
    async fn transport_errors_use_fixed_codes() {
        let (status, body) = render(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "unauthenticated");

        let (status, body) = render(AppError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "forbidden");

        let (status, _) = render(AppError::Timeout).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    }
}
