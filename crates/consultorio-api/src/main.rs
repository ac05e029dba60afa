//! 诊所管理系统 API 服务
//!
//! 负责账号登录与 Token 签发，供前端与其他服务调用。

use std::sync::Arc;

use anyhow::{Context, bail};
use axum::http::HeaderValue;
use consultorio_api::{
    auth::{JwtTokenService, Pbkdf2PasswordHasher, PasswordHasher, TokenService},
    repository::{InMemoryUsuarioRepository, PgUsuarioRepository, UsuarioRepository, demo_accounts},
    routes,
    service::AuthService,
    state::AppState,
};
use consultorio_shared::{
    config::{AppConfig, CorsConfig, StorageBackend},
    database::Database,
    observability,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "consultorio-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME).context("加载配置失败")?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!(
        environment = %config.environment,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    // 签名密钥缺失时拒绝启动，不使用任何默认密钥
    if let Err(e) = config.jwt.validate() {
        error!(error = %e, "Invalid JWT configuration");
        bail!("JWT 配置无效: {}", e);
    }
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone())?);
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Pbkdf2PasswordHasher::new());

    let mut database = None;
    let usuarios: Arc<dyn UsuarioRepository> = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = Database::connect(&config.database).await?;
            let repo = Arc::new(PgUsuarioRepository::new(db.pool().clone()));
            database = Some(db);
            repo
        }
        StorageBackend::Memory => {
            if config.is_production() {
                bail!("生产环境不允许使用内存存储，请设置 storage.backend = \"postgres\"");
            }
            warn!("Using in-memory storage with demo accounts");
            Arc::new(InMemoryUsuarioRepository::new())
        }
    };

    let auth_service = Arc::new(AuthService::new(
        usuarios.clone(),
        hasher,
        tokens.clone(),
    )?);

    if config.storage.backend == StorageBackend::Memory {
        auth_service.seed_demo_accounts(&demo_accounts()).await?;
    }

    let state = AppState::new(auth_service, tokens, usuarios);
    let app = routes::build_router(state).layer(cors_layer(&config.cors, config.is_production()));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }
    info!("Server shutdown complete");

    Ok(())
}

/// 按配置构造 CORS 层
///
/// `*` 允许任意来源，否则按逗号分隔解析来源列表
fn cors_layer(cors: &CorsConfig, production: bool) -> CorsLayer {
    let allowed_origins = cors.allowed_origins.trim();

    if allowed_origins == "*" {
        if production {
            warn!("cors.allowed_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 监听关闭信号
///
/// SIGTERM 或 Ctrl+C 触发 axum 的优雅关闭流程
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "注册 Ctrl+C 处理器失败");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "注册 SIGTERM 处理器失败");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
