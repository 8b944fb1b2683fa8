use std::fmt::Display;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::{generator::GenerationError, names};

#[derive(Debug)]
pub enum AppError {
    Internal(&'static str),
    Input(&'static str),
    /// No valid session: the caller is sent to the login page.
    Unauthorized,
    /// Authenticated, but not allowed to see the resource.
    Forbidden,
    /// The request body could not be decoded.
    Body(String),
    Generation(GenerationError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn error_json(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => Redirect::to(names::LOGIN_URL).into_response(),
            AppError::Forbidden => error_json(StatusCode::FORBIDDEN, "Unauthorized"),
            AppError::Input(message) => error_json(StatusCode::BAD_REQUEST, message),
            AppError::Internal(message) => error_json(StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::Body(message) => error_json(StatusCode::INTERNAL_SERVER_ERROR, message),
            AppError::Generation(e) => {
                tracing::error!(kind = e.kind(), "request failed: {e}");
                error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        tracing::warn!(status = %rejection.status(), "rejected request body: {message}");
        AppError::Body(message)
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::Generation(e)
    }
}

pub trait ResultExt<T> {
    /// Log the underlying error and replace it with a short public message.
    fn reject(self, message: &'static str) -> Result<T, AppError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn reject(self, message: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e}");
            AppError::Internal(message)
        })
    }
}
