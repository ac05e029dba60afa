//! 数据访问层
//!
//! 用户账号按规范化邮箱查找。PostgreSQL 实现用于生产，
//! 内存实现用于开发环境与测试。

mod memory;
mod traits;
mod usuario_repo;

pub use memory::{DemoAccount, InMemoryUsuarioRepository, demo_accounts};
pub use traits::UsuarioRepository;
pub use usuario_repo::PgUsuarioRepository;

#[cfg(test)]
pub use traits::MockUsuarioRepository;
