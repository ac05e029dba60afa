//! 响应 DTO 定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Claims;
use crate::models::Usuario;

/// API 统一响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// 登录用户摘要
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioSummary {
    pub id: i32,
    pub correo: String,
    pub nombre_completo: String,
    pub medico_id: Option<i32>,
}

impl From<&Usuario> for UsuarioSummary {
    fn from(usuario: &Usuario) -> Self {
        Self {
            id: usuario.id,
            correo: usuario.correo.clone(),
            nombre_completo: usuario.nombre_completo.clone(),
            medico_id: usuario.medico_id,
        }
    }
}

/// 登录响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expiracion: DateTime<Utc>,
    pub usuario: UsuarioSummary,
}

/// 用户账号响应（不含凭据）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsuarioResponse {
    pub id: i32,
    pub correo: String,
    pub nombre_completo: String,
    pub medico_id: Option<i32>,
    pub activo: bool,
    pub fecha_creacion: DateTime<Utc>,
}

impl From<Usuario> for UsuarioResponse {
    fn from(usuario: Usuario) -> Self {
        Self {
            id: usuario.id,
            correo: usuario.correo,
            nombre_completo: usuario.nombre_completo,
            medico_id: usuario.medico_id,
            activo: usuario.activo,
            fecha_creacion: usuario.fecha_creacion,
        }
    }
}

/// 当前用户响应（来自已校验的 Token）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: String,
    pub correo: String,
    pub nombre_completo: String,
    pub medico_id: Option<String>,
    pub expiracion: i64,
}

impl From<Claims> for CurrentUserResponse {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            correo: claims.email,
            nombre_completo: claims.name,
            medico_id: claims.medico_id,
            expiracion: claims.exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usuario_response_omits_credential() {
        let usuario = Usuario {
            id: 3,
            correo: "a@b.com".to_string(),
            nombre_completo: "A B".to_string(),
            password_hash: "c2FsdA==.aGFzaA==".to_string(),
            medico_id: Some(2),
            activo: true,
            fecha_creacion: Utc::now(),
        };

        let json = serde_json::to_value(UsuarioResponse::from(usuario)).unwrap();
        assert_eq!(json["nombreCompleto"], "A B");
        assert_eq!(json["medicoId"], 2);
        assert!(json.get("passwordHash").is_none());
    }
}
