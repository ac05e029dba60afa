//! 认证模块
//!
//! 提供密码哈希与校验、JWT Token 签发与校验功能。
//! 两部分均为无状态计算，可在任意线程并发调用。

mod error;
mod jwt;
mod password;

pub use error::AuthError;
pub use jwt::{Claims, IssuedToken, JwtTokenService, TokenService};
pub use password::{
    Credential, ITERATIONS, KEY_SIZE, Pbkdf2PasswordHasher, PasswordHasher, SALT_SIZE,
    hash_password, verify_password,
};

#[cfg(test)]
pub use jwt::MockTokenService;
#[cfg(test)]
pub use password::MockPasswordHasher;
