//! PostgreSQL 连接池
//!
//! 账号存储使用 `storage.backend = "postgres"` 时才会建立连接。

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, instrument};

use crate::config::DatabaseConfig;
use crate::error::{ConsultorioError, Result};

/// 连接池句柄，克隆开销为引用计数
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 按配置建立连接池
    ///
    /// 建池时即尝试连接，数据库不可达会直接返回错误而不是延迟到首个请求
    #[instrument(skip(config), fields(target = %redact_url(&config.url)))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(ConsultorioError::Config(
                "database.url 未配置，请设置 CONSULTORIO_DATABASE__URL".to_string(),
            ));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await?;

        info!(
            max_connections = config.max_connections,
            "PostgreSQL pool ready"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 执行 `SELECT 1` 探测连接可用性
    pub async fn health_check(&self) -> Result<()> {
        let started = Instant::now();
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Database ping");
        Ok(())
    }

    /// 等待借出的连接归还后关闭
    pub async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
    }
}

/// 去掉连接串中的口令，只保留可安全写入日志的部分
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &url[..scheme_end], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
