//! 认证服务
//!
//! 串联账号查找、密码校验与 Token 签发，并负责账号创建时的凭据生成。

use std::sync::Arc;
use std::time::Instant;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use consultorio_shared::error::ConsultorioError;
use consultorio_shared::observability::metrics::record_login_attempt;
use rand::RngCore;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::auth::{Credential, PasswordHasher, TokenService};
use crate::dto::{CreateUsuarioRequest, LoginRequest, LoginResponse, UsuarioResponse, UsuarioSummary};
use crate::error::{ApiError, Result};
use crate::models::{NewUsuario, normalize_correo};
use crate::repository::{DemoAccount, UsuarioRepository};

/// 认证服务
///
/// 账号不存在时对占位凭据执行同样的密钥派生，
/// 使“账号不存在”与“密码错误”两条路径耗时相当
pub struct AuthService {
    usuarios: Arc<dyn UsuarioRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    dummy_credential: Credential,
}

impl AuthService {
    pub fn new(
        usuarios: Arc<dyn UsuarioRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Result<Self> {
        let mut seed = [0u8; 24];
        rand::rng().fill_bytes(&mut seed);
        let dummy_credential = hasher.hash(&STANDARD.encode(seed))?;

        Ok(Self {
            usuarios,
            hasher,
            tokens,
            dummy_credential,
        })
    }

    /// 用户登录
    #[instrument(skip(self, req))]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse> {
        req.validate()?;
        if req.has_blank_fields() {
            return Err(ApiError::Validation("邮箱和密码为必填项".to_string()));
        }

        let started = Instant::now();
        let correo = normalize_correo(&req.correo);

        let usuario = match self.usuarios.find_by_correo(&correo).await {
            Ok(usuario) => usuario,
            Err(e) => {
                record_login_attempt("error", started.elapsed().as_secs_f64());
                return Err(e.into());
            }
        };

        let stored = usuario
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_credential.as_str().to_string());

        let password_ok = self.verify_blocking(stored, req.password).await?;

        let usuario = match usuario {
            Some(usuario) if password_ok => usuario,
            found => {
                warn!(
                    correo = %correo,
                    user_found = found.is_some(),
                    "Login rejected: invalid credentials"
                );
                record_login_attempt("invalid_credentials", started.elapsed().as_secs_f64());
                return Err(ApiError::InvalidCredentials);
            }
        };

        if !usuario.activo {
            warn!(user_id = usuario.id, "Login rejected: user inactive");
            record_login_attempt("inactive", started.elapsed().as_secs_f64());
            return Err(ApiError::UserInactive);
        }

        let issued = self.tokens.issue(&usuario)?;

        info!(user_id = usuario.id, expires_at = %issued.expires_at, "Login succeeded");
        record_login_attempt("success", started.elapsed().as_secs_f64());

        Ok(LoginResponse {
            token: issued.token,
            expiracion: issued.expires_at,
            usuario: UsuarioSummary::from(&usuario),
        })
    }

    /// 创建用户账号
    ///
    /// 唯一生成凭据的入口，邮箱重复时返回冲突
    #[instrument(skip(self, req))]
    pub async fn create_usuario(&self, req: CreateUsuarioRequest) -> Result<UsuarioResponse> {
        req.validate()?;

        let correo = normalize_correo(&req.correo);
        if self.usuarios.exists_by_correo(&correo).await? {
            return Err(ConsultorioError::AlreadyExists {
                entity: "Usuario".to_string(),
                field: "correo".to_string(),
                value: correo,
            }
            .into());
        }

        let password_hash = self.hash_blocking(req.password).await?;

        let usuario = self
            .usuarios
            .create(&NewUsuario {
                correo,
                nombre_completo: req.nombre_completo.trim().to_string(),
                password_hash,
                medico_id: req.medico_id,
                activo: req.activo,
            })
            .await?;

        info!(user_id = usuario.id, "Usuario created");
        Ok(UsuarioResponse::from(usuario))
    }

    /// 写入演示账号，已存在的邮箱跳过
    pub async fn seed_demo_accounts(&self, accounts: &[DemoAccount]) -> Result<usize> {
        let mut created = 0;
        for account in accounts {
            let correo = normalize_correo(account.correo);
            if self.usuarios.exists_by_correo(&correo).await? {
                continue;
            }

            let password_hash = self.hash_blocking(account.password.to_string()).await?;
            self.usuarios
                .create(&NewUsuario {
                    correo,
                    nombre_completo: account.nombre_completo.to_string(),
                    password_hash,
                    medico_id: account.medico_id,
                    activo: account.activo,
                })
                .await?;
            created += 1;
        }

        info!(created, "Demo accounts seeded");
        Ok(created)
    }

    /// 密钥派生是 CPU 密集操作，移出异步运行时线程
    async fn verify_blocking(&self, stored: String, candidate: String) -> Result<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&stored, &candidate))
            .await
            .map_err(|e| ApiError::Internal(format!("密码校验任务失败: {}", e)))
    }

    async fn hash_blocking(&self, password: String) -> Result<Credential> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("密码哈希任务失败: {}", e)))?
            .map_err(ApiError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{
        AuthError, IssuedToken, JwtTokenService, MockPasswordHasher, MockTokenService,
        Pbkdf2PasswordHasher,
    };
    use crate::models::Usuario;
    use crate::repository::{InMemoryUsuarioRepository, MockUsuarioRepository, demo_accounts};
    use chrono::Utc;
    use consultorio_shared::test_utils::test_jwt_settings;

    fn usuario(activo: bool, password_hash: &str) -> Usuario {
        Usuario {
            id: 7,
            correo: "a@b.com".to_string(),
            nombre_completo: "A B".to_string(),
            password_hash: password_hash.to_string(),
            medico_id: None,
            activo,
            fecha_creacion: Utc::now(),
        }
    }

    fn login_request(correo: &str, password: &str) -> LoginRequest {
        LoginRequest {
            correo: correo.to_string(),
            password: password.to_string(),
        }
    }

    fn hasher_with_dummy() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .times(1)
            .returning(|_| Ok(Credential::from("ZHVtbXk=.ZHVtbXk=".to_string())));
        hasher
    }

    /// 使用真实实现（低迭代次数）组装服务
    fn real_service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryUsuarioRepository::new()),
            Arc::new(Pbkdf2PasswordHasher::with_iterations(1_000)),
            Arc::new(JwtTokenService::new(test_jwt_settings()).unwrap()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_user_still_runs_key_derivation() {
        let mut repo = MockUsuarioRepository::new();
        repo.expect_find_by_correo()
            .withf(|correo| correo == "nadie@b.com")
            .times(1)
            .returning(|_| Ok(None));

        let mut hasher = hasher_with_dummy();
        hasher
            .expect_verify()
            .withf(|stored, candidate| stored == "ZHVtbXk=.ZHVtbXk=" && candidate == "secret")
            .times(1)
            .return_const(false);

        let mut tokens = MockTokenService::new();
        tokens.expect_issue().never();

        let service =
            AuthService::new(Arc::new(repo), Arc::new(hasher), Arc::new(tokens)).unwrap();

        let err = service
            .login(login_request("  NADIE@b.com ", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_wrong_password_is_invalid_credentials() {
        let mut repo = MockUsuarioRepository::new();
        repo.expect_find_by_correo()
            .returning(|_| Ok(Some(usuario(true, "c2FsdA==.aGFzaA=="))));

        let mut hasher = hasher_with_dummy();
        hasher
            .expect_verify()
            .withf(|stored, _| stored == "c2FsdA==.aGFzaA==")
            .times(1)
            .return_const(false);

        let mut tokens = MockTokenService::new();
        tokens.expect_issue().never();

        let service =
            AuthService::new(Arc::new(repo), Arc::new(hasher), Arc::new(tokens)).unwrap();

        let err = service
            .login(login_request("a@b.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_inactive_user_is_rejected_after_password_check() {
        let mut repo = MockUsuarioRepository::new();
        repo.expect_find_by_correo()
            .returning(|_| Ok(Some(usuario(false, "stored"))));

        let mut hasher = hasher_with_dummy();
        hasher.expect_verify().times(1).return_const(true);

        let mut tokens = MockTokenService::new();
        tokens.expect_issue().never();

        let service =
            AuthService::new(Arc::new(repo), Arc::new(hasher), Arc::new(tokens)).unwrap();

        let err = service
            .login(login_request("a@b.com", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UserInactive));
    }

    #[tokio::test]
    async fn test_successful_login_issues_token() {
        let mut repo = MockUsuarioRepository::new();
        repo.expect_find_by_correo()
            .withf(|correo| correo == "a@b.com")
            .returning(|_| Ok(Some(usuario(true, "stored"))));

        let mut hasher = hasher_with_dummy();
        hasher.expect_verify().times(1).return_const(true);

        let expires_at = Utc::now();
        let mut tokens = MockTokenService::new();
        tokens
            .expect_issue()
            .withf(|u| u.id == 7)
            .times(1)
            .returning(move |_| {
                Ok(IssuedToken {
                    token: "h.c.s".to_string(),
                    expires_at,
                })
            });

        let service =
            AuthService::new(Arc::new(repo), Arc::new(hasher), Arc::new(tokens)).unwrap();

        let response = service.login(login_request("A@B.com", "secret")).await.unwrap();
        assert_eq!(response.token, "h.c.s");
        assert_eq!(response.expiracion, expires_at);
        assert_eq!(response.usuario.id, 7);
        assert_eq!(response.usuario.correo, "a@b.com");
        assert!(response.usuario.medico_id.is_none());
    }

    #[tokio::test]
    async fn test_token_failure_is_internal_error() {
        let mut repo = MockUsuarioRepository::new();
        repo.expect_find_by_correo()
            .returning(|_| Ok(Some(usuario(true, "stored"))));

        let mut hasher = hasher_with_dummy();
        hasher.expect_verify().return_const(true);

        let mut tokens = MockTokenService::new();
        tokens
            .expect_issue()
            .returning(|_| Err(AuthError::TokenEncoding("boom".to_string())));

        let service =
            AuthService::new(Arc::new(repo), Arc::new(hasher), Arc::new(tokens)).unwrap();

        let err = service
            .login(login_request("a@b.com", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected_before_lookup() {
        let mut repo = MockUsuarioRepository::new();
        repo.expect_find_by_correo().never();

        let service = AuthService::new(
            Arc::new(repo),
            Arc::new(hasher_with_dummy()),
            Arc::new(MockTokenService::new()),
        )
        .unwrap();

        let err = service.login(login_request("   ", "secret")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = service.login(login_request("a@b.com", "")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_repository_error_is_propagated() {
        let mut repo = MockUsuarioRepository::new();
        repo.expect_find_by_correo()
            .returning(|_| Err(ConsultorioError::Database(sqlx::Error::PoolTimedOut)));

        let service = AuthService::new(
            Arc::new(repo),
            Arc::new(hasher_with_dummy()),
            Arc::new(MockTokenService::new()),
        )
        .unwrap();

        let err = service
            .login(login_request("a@b.com", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Database(_)));
    }

    #[tokio::test]
    async fn test_create_then_login_with_real_components() {
        let service = real_service();

        let created = service
            .create_usuario(CreateUsuarioRequest {
                correo: "  Doctor@Consultorio.Local ".to_string(),
                password: "consulta2024".to_string(),
                nombre_completo: "Dr. Jorge Medina".to_string(),
                medico_id: Some(4),
                activo: true,
            })
            .await
            .unwrap();
        assert_eq!(created.correo, "doctor@consultorio.local");

        let response = service
            .login(login_request("doctor@consultorio.local", "consulta2024"))
            .await
            .unwrap();
        assert_eq!(response.usuario.id, created.id);
        assert_eq!(response.usuario.medico_id, Some(4));

        let err = service
            .login(login_request("doctor@consultorio.local", "consulta2025"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_create_duplicate_correo_is_conflict() {
        let service = real_service();
        let req = || CreateUsuarioRequest {
            correo: "recepcion@consultorio.local".to_string(),
            password: "recepcion123".to_string(),
            nombre_completo: "Laura Sánchez".to_string(),
            medico_id: None,
            activo: true,
        };

        service.create_usuario(req()).await.unwrap();
        let err = service.create_usuario(req()).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_seed_demo_accounts_is_idempotent() {
        let service = real_service();

        assert_eq!(service.seed_demo_accounts(&demo_accounts()).await.unwrap(), 3);
        assert_eq!(service.seed_demo_accounts(&demo_accounts()).await.unwrap(), 0);

        let response = service
            .login(login_request("recepcion@consultorio.local", "recepcion123"))
            .await
            .unwrap();
        assert_eq!(response.usuario.nombre_completo, "Laura Sánchez");

        let err = service
            .login(login_request("admin@consultorio.local", "admin2024"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UserInactive));
    }
}
