//! 领域模型

mod usuario;

pub use usuario::{NewUsuario, Usuario, normalize_correo};
