//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use consultorio_shared::error::Result;

use crate::models::{NewUsuario, Usuario};

/// 用户账号仓储接口
///
/// 所有 `correo` 参数均为已规范化的邮箱
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsuarioRepository: Send + Sync {
    async fn find_by_correo(&self, correo: &str) -> Result<Option<Usuario>>;
    async fn exists_by_correo(&self, correo: &str) -> Result<bool>;

    /// 创建账号，邮箱重复时返回 `ConsultorioError::AlreadyExists`
    async fn create(&self, nuevo: &NewUsuario) -> Result<Usuario>;

    async fn health_check(&self) -> Result<()>;
}
