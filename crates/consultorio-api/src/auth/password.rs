//! 密码处理
//!
//! 使用 PBKDF2-HMAC-SHA256 对密码加盐派生，存储格式为
//! `base64(salt).base64(derived_key)`，校验时使用定长时间比较。

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::AuthError;

/// 盐长度（128 bit）
pub const SALT_SIZE: usize = 16;
/// 派生密钥长度（256 bit）
pub const KEY_SIZE: usize = 32;
/// PBKDF2 迭代次数
pub const ITERATIONS: u32 = 100_000;

const SEPARATOR: char = '.';

/// 无法解析凭据时用于补齐派生计算的固定盐
const PLACEHOLDER_SALT: [u8; SALT_SIZE] = [0u8; SALT_SIZE];

/// 已存储的密码凭据
///
/// 创建后不可变，修改密码会生成新的凭据
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Credential {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// 日志中不输出派生密钥
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

/// 密码哈希接口
///
/// 服务层依赖此接口而非具体实现，便于 mock 测试
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// 对明文密码加盐派生，空密码返回 `AuthError::EmptyPassword`
    fn hash(&self, password: &str) -> Result<Credential, AuthError>;

    /// 校验明文密码与已存储凭据是否匹配
    ///
    /// 凭据为空、格式错误或候选密码为空时返回 false，从不返回错误
    fn verify(&self, stored: &str, candidate: &str) -> bool;
}

/// PBKDF2-HMAC-SHA256 密码哈希实现
#[derive(Debug, Clone, Copy)]
pub struct Pbkdf2PasswordHasher {
    iterations: u32,
}

impl Default for Pbkdf2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Pbkdf2PasswordHasher {
    /// 使用标准迭代次数创建
    pub fn new() -> Self {
        Self {
            iterations: ITERATIONS,
        }
    }

    /// 使用自定义迭代次数创建
    ///
    /// 仅供测试缩短运行时间，生产凭据必须使用 [`ITERATIONS`]
    pub fn with_iterations(iterations: u32) -> Self {
        Self { iterations }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    fn derive(&self, password: &str, salt: &[u8]) -> [u8; KEY_SIZE] {
        let mut key = [0u8; KEY_SIZE];
        pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, self.iterations, &mut key);
        key
    }
}

impl PasswordHasher for Pbkdf2PasswordHasher {
    fn hash(&self, password: &str) -> Result<Credential, AuthError> {
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        let mut salt = [0u8; SALT_SIZE];
        rand::rng().fill_bytes(&mut salt);

        let key = self.derive(password, &salt);

        Ok(Credential(format!(
            "{}{}{}",
            STANDARD.encode(salt),
            SEPARATOR,
            STANDARD.encode(key)
        )))
    }

    fn verify(&self, stored: &str, candidate: &str) -> bool {
        // 凭据格式错误或候选密码为空时仍执行一次派生，所有拒绝路径耗时相当
        match decode_credential(stored) {
            Some((salt, expected)) if !candidate.is_empty() => {
                let computed = self.derive(candidate, &salt);
                constant_time_eq(&expected, &computed)
            }
            _ => {
                std::hint::black_box(self.derive(candidate, &PLACEHOLDER_SALT));
                false
            }
        }
    }
}

/// 拆分并解码凭据，格式不合法时返回 None
///
/// 空段会被忽略，因此 `a..b` 与 `a.b` 等价
fn decode_credential(stored: &str) -> Option<(Vec<u8>, Vec<u8>)> {
    if stored.trim().is_empty() {
        return None;
    }

    let parts: Vec<&str> = stored
        .split(SEPARATOR)
        .filter(|part| !part.is_empty())
        .collect();

    let [salt, key] = parts.as_slice() else {
        return None;
    };

    let salt = STANDARD.decode(salt).ok()?;
    let key = STANDARD.decode(key).ok()?;
    Some((salt, key))
}

/// 定长时间字节比较
///
/// 长度不同直接返回 false（长度本身不是秘密），
/// 长度相同时遍历全部字节，不在第一个差异处提前返回
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// 使用标准参数对密码进行哈希
pub fn hash_password(password: &str) -> Result<Credential, AuthError> {
    Pbkdf2PasswordHasher::new().hash(password)
}

/// 使用标准参数校验密码
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    Pbkdf2PasswordHasher::new().verify(stored, candidate)
}
