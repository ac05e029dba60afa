//! API 错误类型定义
//!
//! 统一映射为 HTTP 状态码与 `{success, code, message, data}` 响应体

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use consultorio_shared::error::ConsultorioError;
use serde_json::json;

use crate::auth::AuthError;

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("邮箱或密码错误")]
    InvalidCredentials,
    #[error("用户已被停用")]
    UserInactive,

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源错误
    #[error("资源已存在: {0}")]
    Conflict(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 账号不存在、密码错误、账号停用对外都是 401
            Self::Unauthorized(_) | Self::InvalidCredentials | Self::UserInactive => {
                StatusCode::UNAUTHORIZED
            }
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::UserInactive => "USER_INACTIVE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "ALREADY_EXISTS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从共享层错误转换
impl From<ConsultorioError> for ApiError {
    fn from(err: ConsultorioError) -> Self {
        match err {
            ConsultorioError::Database(e) => Self::Database(e),
            ConsultorioError::AlreadyExists {
                entity,
                field,
                value,
            } => Self::Conflict(format!("{} {}={}", entity, field, value)),
            ConsultorioError::Config(msg) => Self::Internal(format!("配置错误: {}", msg)),
        }
    }
}

/// 从认证核心错误转换
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmptyPassword => Self::Validation(err.to_string()),
            AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::SigningConfig(_) | AuthError::TokenEncoding(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;
