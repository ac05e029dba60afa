//! 用户账号管理处理器

use axum::{Extension, Json, extract::State, http::StatusCode};
use tracing::info;

use crate::auth::Claims;
use crate::dto::{ApiResponse, CreateUsuarioRequest, UsuarioResponse};
use crate::error::Result;
use crate::state::AppState;

/// 创建用户账号
///
/// POST /api/usuarios
pub async fn create_usuario(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateUsuarioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UsuarioResponse>>)> {
    let usuario = state.auth_service.create_usuario(req).await?;
    info!(created_by = %claims.sub, user_id = usuario.id, "Usuario created via API");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(usuario, "用户创建成功")),
    ))
}
