//! 请求与响应的数据传输对象

mod request;
mod response;

pub use request::{CreateUsuarioRequest, LoginRequest};
pub use response::{ApiResponse, CurrentUserResponse, LoginResponse, UsuarioResponse, UsuarioSummary};
