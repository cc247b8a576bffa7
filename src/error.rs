use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Failures of the remote vision, image-generation and search services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport error, non-success HTTP status or an `error` payload.
    #[error("{service} request failed: {message}")]
    External {
        service: &'static str,
        message: String,
    },
    /// API key or engine id absent at call time.
    #[error("{0} credentials are not configured")]
    MissingCredential(&'static str),
    /// Response body does not have the expected shape.
    #[error("{service} returned a malformed response: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        Self::External {
            service,
            message: message.into(),
        }
    }

    pub fn malformed(service: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            service,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    /// Return a status code with a plain-text message body.
    Msg(StatusCode, String),
    /// Internal error -> 500 with JSON body; logged.
    Anyhow(anyhow::Error),
}

impl From<(StatusCode, String)> for AppError {
    fn from((code, msg): (StatusCode, String)) -> Self {
        Self::Msg(code, msg)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Anyhow(e)
    }
}

/* ---- Narrow, explicit conversions so `?` works everywhere ---- */

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        Self::Anyhow(e.into())
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        // keeps 413 for oversized uploads, 400 for broken bodies
        Self::Msg(e.status(), e.body_text())
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Msg(code, msg) => (code, msg).into_response(),
            Self::Anyhow(err) => {
                tracing::error!("{:#}", err);
                let body = Json(ErrBody {
                    error: err.to_string(),
                });
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
