//! 认证错误类型

use thiserror::Error;

/// 认证核心错误
///
/// 密码校验失败不是错误（返回 false），这里只包含前置条件、配置和 Token 问题
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("密码不能为空")]
    EmptyPassword,

    #[error("JWT 签名配置无效: {0}")]
    SigningConfig(String),

    #[error("JWT 生成失败: {0}")]
    TokenEncoding(String),

    #[error("Token 已过期")]
    TokenExpired,

    #[error("无效的 Token: {0}")]
    InvalidToken(String),
}
