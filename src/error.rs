use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use crate::views;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("username or email is already registered")]
    DuplicateIdentity,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("login required")]
    Unauthenticated { next: String },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated { next } => {
                Redirect::to(&views::login_url(Some(&next))).into_response()
            }
            AppError::DuplicateIdentity | AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                Html(views::error_page(StatusCode::BAD_REQUEST, &self.to_string())),
            )
                .into_response(),
            AppError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                Html(views::error_page(StatusCode::NOT_FOUND, &self.to_string())),
            )
                .into_response(),
            AppError::Internal(e) => {
                error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(views::error_page(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "something went wrong",
                    )),
                )
                    .into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
