use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::unread::UnreadError;
use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("未授权访问")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("未读数暂时不可用")]
    UnreadCountUnavailable(#[from] UnreadError),
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::UnreadCountUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, error_codes::UNAVAILABLE)
            }
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // 数据库细节只写日志，不返回给客户端
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "内部服务器错误".to_string()
            }
            AppError::UnreadCountUnavailable(e) => {
                tracing::error!(error = %e, "Unread count unavailable");
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, error_to_api_response::<()>(code, message)).into_response()
    }
}
