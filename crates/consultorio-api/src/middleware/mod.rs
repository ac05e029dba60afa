//! 中间件模块

mod auth;
mod security;

pub use auth::auth_middleware;
pub use security::security_headers;
