//! Service-layer error type
//!
//! `ServiceError` bridges repository/infrastructure errors and the API-layer
//! [`AppError`], so services can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::repository::RepoError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error, two variants:
///
/// - `Db`: database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(e) => write!(f, "database error: {e}"),
            ServiceError::App(e) => write!(f, "{} ({})", e.message, e.code),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Duplicate(msg) => {
                ServiceError::App(AppError::with_message(ErrorCode::AlreadyExists, msg))
            }
            RepoError::Validation(msg) => ServiceError::App(AppError::validation(msg)),
            RepoError::Database(msg) => ServiceError::Db(msg.into()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
