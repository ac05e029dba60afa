//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use std::sync::Arc;

use crate::auth::TokenService;
use crate::repository::UsuarioRepository;
use crate::service::AuthService;

/// Axum 应用共享状态
///
/// 所有依赖以 trait 对象持有，测试时可替换为内存实现
#[derive(Clone)]
pub struct AppState {
    /// 登录与账号管理
    pub auth_service: Arc<AuthService>,
    /// Bearer Token 校验
    pub tokens: Arc<dyn TokenService>,
    /// 用户账号存储（就绪探针使用）
    pub usuarios: Arc<dyn UsuarioRepository>,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        tokens: Arc<dyn TokenService>,
        usuarios: Arc<dyn UsuarioRepository>,
    ) -> Self {
        Self {
            auth_service,
            tokens,
            usuarios,
        }
    }
}
