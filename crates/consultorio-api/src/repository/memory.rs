//! 内存用户仓储
//!
//! 使用 DashMap 实现的并发安全存储，适用于开发环境和测试。

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use consultorio_shared::error::{ConsultorioError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::traits::UsuarioRepository;
use crate::models::{NewUsuario, Usuario};

/// 内存用户仓储
///
/// 以规范化邮箱为 key，ID 由原子计数器分配
#[derive(Debug, Clone)]
pub struct InMemoryUsuarioRepository {
    usuarios: Arc<DashMap<String, Usuario>>,
    next_id: Arc<AtomicI32>,
}

impl Default for InMemoryUsuarioRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUsuarioRepository {
    pub fn new() -> Self {
        Self {
            usuarios: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI32::new(1)),
        }
    }

    /// 已存储账号数量
    pub fn count(&self) -> usize {
        self.usuarios.len()
    }
}

#[async_trait]
impl UsuarioRepository for InMemoryUsuarioRepository {
    async fn find_by_correo(&self, correo: &str) -> Result<Option<Usuario>> {
        Ok(self.usuarios.get(correo).map(|entry| entry.value().clone()))
    }

    async fn exists_by_correo(&self, correo: &str) -> Result<bool> {
        Ok(self.usuarios.contains_key(correo))
    }

    async fn create(&self, nuevo: &NewUsuario) -> Result<Usuario> {
        // entry 持有分片锁，检查与插入是原子的
        match self.usuarios.entry(nuevo.correo.clone()) {
            Entry::Occupied(_) => Err(ConsultorioError::AlreadyExists {
                entity: "Usuario".to_string(),
                field: "correo".to_string(),
                value: nuevo.correo.clone(),
            }),
            Entry::Vacant(slot) => {
                let usuario = Usuario {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    correo: nuevo.correo.clone(),
                    nombre_completo: nuevo.nombre_completo.clone(),
                    password_hash: nuevo.password_hash.as_str().to_string(),
                    medico_id: nuevo.medico_id,
                    activo: nuevo.activo,
                    fecha_creacion: Utc::now(),
                };
                slot.insert(usuario.clone());
                Ok(usuario)
            }
        }
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// 演示账号
#[derive(Debug, Clone)]
pub struct DemoAccount {
    pub correo: &'static str,
    pub nombre_completo: &'static str,
    pub password: &'static str,
    pub medico_id: Option<i32>,
    pub activo: bool,
}

/// 开发环境预置账号（明文密码在写入时哈希）
pub fn demo_accounts() -> Vec<DemoAccount> {
    vec![
        DemoAccount {
            correo: "recepcion@consultorio.local",
            nombre_completo: "Laura Sánchez",
            password: "recepcion123",
            medico_id: None,
            activo: true,
        },
        DemoAccount {
            correo: "doctor1@consultorio.local",
            nombre_completo: "Dr. Jorge Medina",
            password: "consulta2024",
            medico_id: Some(1),
            activo: true,
        },
        DemoAccount {
            correo: "admin@consultorio.local",
            nombre_completo: "Administración",
            password: "admin2024",
            medico_id: None,
            activo: false,
        },
    ]
}
