//! 用户账号模型
//!
//! 账号由用户存储持有，认证核心只读取其中的身份字段与凭据

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::auth::Credential;

/// 用户账号（对应 usuarios 表）
#[derive(Debug, Clone, FromRow)]
pub struct Usuario {
    pub id: i32,
    /// 规范化后的邮箱（去空白、小写）
    pub correo: String,
    pub nombre_completo: String,
    /// `base64(salt).base64(derived_key)` 格式的凭据
    pub password_hash: String,
    /// 关联的医生 ID
    pub medico_id: Option<i32>,
    pub activo: bool,
    pub fecha_creacion: DateTime<Utc>,
}

/// 待创建的用户账号
#[derive(Debug, Clone)]
pub struct NewUsuario {
    pub correo: String,
    pub nombre_completo: String,
    pub password_hash: Credential,
    pub medico_id: Option<i32>,
    pub activo: bool,
}

/// 邮箱规范化：去除首尾空白并转为小写
///
/// 登录与创建账号使用同一规则，保证查找键一致
pub fn normalize_correo(raw: &str) -> String {
    raw.trim().to_lowercase()
}
