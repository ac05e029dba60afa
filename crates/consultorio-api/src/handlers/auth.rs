//! 认证相关的 HTTP 处理器
//!
//! 提供登录与获取当前用户的 API

use axum::{Extension, Json, extract::State};

use crate::auth::Claims;
use crate::dto::{ApiResponse, CurrentUserResponse, LoginRequest, LoginResponse};
use crate::error::Result;
use crate::state::AppState;

/// 用户登录
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    let response = state.auth_service.login(req).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// 获取当前用户
///
/// GET /api/auth/me
///
/// 直接从已校验的 Claims 构造，不查询存储
pub async fn me(Extension(claims): Extension<Claims>) -> Json<ApiResponse<CurrentUserResponse>> {
    Json(ApiResponse::success(CurrentUserResponse::from(claims)))
}
