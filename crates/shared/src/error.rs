//! 统一错误处理模块
//!
//! 存储层与配置层共享的错误类型，API 层再映射为 HTTP 响应。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum ConsultorioError {
    // ==================== 数据库错误 ====================
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("记录已存在: {entity} {field}={value}")]
    AlreadyExists {
        entity: String,
        field: String,
        value: String,
    },

    // ==================== 配置错误 ====================
    #[error("配置错误: {0}")]
    Config(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, ConsultorioError>;

impl ConsultorioError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}
