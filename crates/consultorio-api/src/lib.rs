//! 诊所管理系统 API 服务
//!
//! 提供账号登录、Token 签发校验与用户账号管理。
//!
//! ## 核心功能
//!
//! - **凭据校验**：PBKDF2-HMAC-SHA256 加盐派生，定长时间比较
//! - **Token 签发**：HS256 JWT，携带用户标识与关联医生
//! - **账号管理**：创建账号时生成凭据，邮箱唯一
//!
//! ## 模块结构
//!
//! - `auth`: 密码哈希与 JWT
//! - `service`: 登录流程
//! - `repository`: 账号存储（PostgreSQL / 内存）
//! - `handlers` / `routes` / `middleware`: HTTP 层
//! - `dto` / `error`: 请求响应与错误映射

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
