use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Auth Errors
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("auth context missing")]
    AuthFailCtxNotInRequestExt,

    // Request Errors
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("request validation failed")]
    Validation(Vec<String>),

    // Generic
    #[error("{0}")]
    NotImplemented(String),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// The rejection used for every bad or unknown bearer token.
    pub fn credentials() -> Self {
        Error::Unauthorized("could not validate credentials".to_string())
    }

    pub fn invalid_id(kind: &str) -> Self {
        Error::BadRequest(format!("invalid {kind} id"))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            Error::AuthFailCtxNotInRequestExt | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            Error::Validation(details) => json!({
                "error": {
                    "message": self.to_string(),
                    "details": details,
                }
            }),
            _ => json!({
                "error": {
                    "message": self.to_string()
                }
            }),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// Store failures are logged here and reported to the client without details.
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        error!("store error: {}", err);
        Error::Internal("database error".to_string())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        error!("internal error: {:#}", err);
        Error::Internal("internal error".to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        error!("io error: {}", err);
        Error::Internal("file storage error".to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for Error {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        Error::BadRequest(format!("malformed multipart body: {err}"))
    }
}

// Body and query payloads that parse but don't fit the target type are 422,
// like field validation; anything else the extractor rejects is 400.

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => Error::Validation(vec![err.body_text()]),
            other => Error::BadRequest(other.body_text()),
        }
    }
}

impl From<FormRejection> for Error {
    fn from(rejection: FormRejection) -> Self {
        match rejection {
            FormRejection::FailedToDeserializeForm(err) => Error::Validation(vec![err.body_text()]),
            FormRejection::FailedToDeserializeFormBody(err) => {
                Error::Validation(vec![err.body_text()])
            }
            other => Error::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        match rejection {
            QueryRejection::FailedToDeserializeQueryString(err) => {
                Error::Validation(vec![err.body_text()])
            }
            other => Error::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

/// True when a store write was rejected by a UNIQUE constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
