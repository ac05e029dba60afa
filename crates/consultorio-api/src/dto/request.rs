//! 请求 DTO 定义

use serde::Deserialize;
use validator::Validate;

/// 登录请求
///
/// 兼容旧前端的 `usuario` / `contrasena` 字段名
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "usuario")]
    #[validate(length(max = 254, message = "邮箱长度不能超过 254"))]
    pub correo: String,
    #[serde(alias = "contrasena")]
    #[validate(length(max = 128, message = "密码长度不能超过 128"))]
    pub password: String,
}

impl LoginRequest {
    /// 邮箱与密码均不能为空白
    pub fn has_blank_fields(&self) -> bool {
        self.correo.trim().is_empty() || self.password.trim().is_empty()
    }
}

/// 创建用户账号请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUsuarioRequest {
    #[validate(email(message = "邮箱格式无效"))]
    pub correo: String,
    #[validate(length(min = 8, max = 128, message = "密码长度必须在 8-128 之间"))]
    pub password: String,
    #[validate(length(min = 1, max = 150, message = "姓名长度必须在 1-150 之间"))]
    pub nombre_completo: String,
    pub medico_id: Option<i32>,
    #[serde(default = "default_activo")]
    pub activo: bool,
}

fn default_activo() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_accepts_legacy_field_names() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"usuario": "a@b.com", "contrasena": "x"}"#).unwrap();
        assert_eq!(req.correo, "a@b.com");
        assert_eq!(req.password, "x");
    }

    #[test]
    fn test_login_request_blank_fields() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"correo": "  ", "password": "x"}"#).unwrap();
        assert!(req.has_blank_fields());
    }

    #[test]
    fn test_create_usuario_request_validation() {
        let req: CreateUsuarioRequest = serde_json::from_str(
            r#"{"correo": "nuevo@consultorio.local", "password": "s3guro-2024", "nombreCompleto": "Ana Ruiz"}"#,
        )
        .unwrap();
        assert!(req.activo);
        assert!(req.medico_id.is_none());
        assert!(req.validate().is_ok());

        let bad: CreateUsuarioRequest = serde_json::from_str(
            r#"{"correo": "no-es-correo", "password": "corta", "nombreCompleto": ""}"#,
        )
        .unwrap();
        assert!(bad.validate().is_err());
    }
}
