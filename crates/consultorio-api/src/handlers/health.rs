//! 服务信息与健康检查

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::state::AppState;

/// 服务信息
///
/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "nombre": "API Consultorio",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 存活探针：进程正常即返回 ok
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "consultorio-api"
    }))
}

/// 就绪探针：检查账号存储是否可用
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let storage_ok = state.usuarios.health_check().await.is_ok();
    let status = if storage_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if storage_ok { "ok" } else { "degraded" },
            "service": "consultorio-api",
            "checks": {
                "storage": if storage_ok { "ok" } else { "fail" }
            }
        })),
    )
}
