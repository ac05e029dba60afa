//! JWT 认证中间件
//!
//! 验证请求中的 Bearer Token 并将 Claims 注入请求扩展

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use consultorio_shared::observability::metrics::record_token_validation;
use tracing::debug;

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::state::AppState;

/// 认证中间件
///
/// 仅挂载在受保护路由上（`route_layer`），公开路由不经过此中间件
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        record_token_validation("missing");
        return ApiError::Unauthorized("缺少认证 Token".to_string()).into_response();
    };

    match state.tokens.validate(token) {
        Ok(claims) => {
            record_token_validation("valid");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let outcome = match e {
                AuthError::TokenExpired => "expired",
                _ => "invalid",
            };
            debug!(outcome, error = %e, "Bearer token rejected");
            record_token_validation(outcome);
            ApiError::from(e).into_response()
        }
    }
}
