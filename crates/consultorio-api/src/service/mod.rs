//! 业务服务层

mod auth_service;

pub use auth_service::AuthService;
