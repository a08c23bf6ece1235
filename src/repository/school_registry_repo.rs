// ==========================================
// 高校校舍面积缺口测算系统 - 学校类型登记
// ==========================================
// SchoolTypeResolver: 学校名称 → 学校类型（从不失败,未知名称返回默认类型）
// SchoolDirectory: 内存目录
// SchoolRegistryRepository: school_registry 表读写
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// 默认学校类型
pub const DEFAULT_SCHOOL_TYPE: &str = "综合院校";

// ==========================================
// SchoolTypeResolver Trait
// ==========================================
#[async_trait]
pub trait SchoolTypeResolver: Send + Sync {
    /// 解析学校类型（未知名称返回默认类型）
    async fn resolve(&self, school_name: &str) -> String;
}

// ==========================================
// SchoolDirectory - 学校类型内存目录
// ==========================================
pub struct SchoolDirectory {
    entries: RwLock<HashMap<String, String>>,
    default_type: RwLock<String>,
}

impl SchoolDirectory {
    pub fn new(default_type: impl Into<String>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_type: RwLock::new(default_type.into()),
        }
    }

    /// 整体替换目录内容
    pub fn load(&self, entries: HashMap<String, String>) {
        let normalized: HashMap<String, String> = entries
            .into_iter()
            .map(|(name, school_type)| (name.trim().to_string(), school_type.trim().to_string()))
            .filter(|(name, school_type)| !name.is_empty() && !school_type.is_empty())
            .collect();
        match self.entries.write() {
            Ok(mut guard) => *guard = normalized,
            Err(poisoned) => *poisoned.into_inner() = normalized,
        }
    }

    /// 登记单个学校
    pub fn register(&self, school_name: &str, school_type: &str) {
        let name = school_name.trim().to_string();
        let school_type = school_type.trim().to_string();
        if name.is_empty() || school_type.is_empty() {
            return;
        }
        match self.entries.write() {
            Ok(mut guard) => {
                guard.insert(name, school_type);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(name, school_type);
            }
        }
    }

    /// 设置默认类型（配置变更时调用）
    pub fn set_default_type(&self, default_type: &str) {
        let value = default_type.trim();
        if value.is_empty() {
            return;
        }
        match self.default_type.write() {
            Ok(mut guard) => *guard = value.to_string(),
            Err(poisoned) => *poisoned.into_inner() = value.to_string(),
        }
    }

    pub fn default_type(&self) -> String {
        match self.default_type.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lookup(&self, school_name: &str) -> Option<String> {
        let name = school_name.trim();
        match self.entries.read() {
            Ok(guard) => guard.get(name).cloned(),
            Err(poisoned) => poisoned.into_inner().get(name).cloned(),
        }
    }
}

impl Default for SchoolDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_SCHOOL_TYPE)
    }
}

#[async_trait]
impl SchoolTypeResolver for SchoolDirectory {
    async fn resolve(&self, school_name: &str) -> String {
        match self.lookup(school_name) {
            Some(school_type) => school_type,
            None => {
                let fallback = self.default_type();
                tracing::debug!(%school_name, %fallback, "学校未登记,使用默认学校类型");
                fallback
            }
        }
    }
}

// ==========================================
// SchoolRegistryRepository - 学校登记表仓储
// ==========================================
pub struct SchoolRegistryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SchoolRegistryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 全部登记（学校名称 → 学校类型）
    pub fn load_all(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT school_name, school_type FROM school_registry")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = HashMap::new();
        for row in rows {
            let (name, school_type) = row?;
            entries.insert(name, school_type);
        }
        Ok(entries)
    }

    /// 插入或更新学校登记
    pub fn upsert(&self, school_name: &str, school_type: &str) -> RepositoryResult<()> {
        let name = school_name.trim();
        if name.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "school_name".to_string(),
                message: "学校名称不能为空".to_string(),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO school_registry (school_name, school_type) VALUES (?1, ?2)
            ON CONFLICT(school_name) DO UPDATE SET school_type = ?2, updated_at = datetime('now')
            "#,
            params![name, school_type.trim()],
        )?;
        Ok(())
    }
}
