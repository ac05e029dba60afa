//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router, middleware,
    routing::{get, post},
};
use consultorio_shared::observability::middleware as obs_middleware;

use crate::{handlers, middleware::auth_middleware, middleware::security_headers, state::AppState};

/// 公开的认证路由
fn public_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(handlers::auth::login))
}

/// 需要 Bearer Token 的路由
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/usuarios", post(handlers::usuario::create_usuario))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// 构建 API 路由（挂载在 /api 下）
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state))
}

/// 构建完整应用路由
///
/// CORS 由调用方按部署配置追加
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes(state.clone()))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
