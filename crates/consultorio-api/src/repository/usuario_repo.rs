//! 用户账号仓储（PostgreSQL）

use async_trait::async_trait;
use consultorio_shared::error::{ConsultorioError, Result};
use sqlx::PgPool;
use tracing::instrument;

use super::traits::UsuarioRepository;
use crate::models::{NewUsuario, Usuario};

/// 基于 sqlx 的用户账号仓储
#[derive(Clone)]
pub struct PgUsuarioRepository {
    pool: PgPool,
}

impl PgUsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsuarioRepository for PgUsuarioRepository {
    #[instrument(skip(self))]
    async fn find_by_correo(&self, correo: &str) -> Result<Option<Usuario>> {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            SELECT id, correo, nombre_completo, password_hash, medico_id, activo, fecha_creacion
            FROM usuarios
            WHERE correo = $1
            "#,
        )
        .bind(correo)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usuario)
    }

    async fn exists_by_correo(&self, correo: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM usuarios WHERE correo = $1)")
                .bind(correo)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[instrument(skip(self, nuevo), fields(correo = %nuevo.correo))]
    async fn create(&self, nuevo: &NewUsuario) -> Result<Usuario> {
        let result = sqlx::query_as::<_, Usuario>(
            r#"
            INSERT INTO usuarios (correo, nombre_completo, password_hash, medico_id, activo, fecha_creacion)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, correo, nombre_completo, password_hash, medico_id, activo, fecha_creacion
            "#,
        )
        .bind(&nuevo.correo)
        .bind(&nuevo.nombre_completo)
        .bind(nuevo.password_hash.as_str())
        .bind(nuevo.medico_id)
        .bind(nuevo.activo)
        .fetch_one(&self.pool)
        .await;

        // 并发创建时由唯一索引兜底
        match result {
            Ok(usuario) => Ok(usuario),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ConsultorioError::AlreadyExists {
                    entity: "Usuario".to_string(),
                    field: "correo".to_string(),
                    value: nuevo.correo.clone(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(ConsultorioError::from)
    }
}
