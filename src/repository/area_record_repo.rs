// ==========================================
// 高校校舍面积缺口测算系统 - 面积记录仓储
// ==========================================
// 红线: 记录只插入不更新（历史记录不可变）;删除需显式调用
// 红线: Repository 不含业务逻辑（读取后的归一化由 API 层负责）
// ==========================================

use crate::domain::area::AreaRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// 已持久化的面积记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAreaRecord {
    pub record_id: String,
    pub created_at: DateTime<Utc>,
    pub record: AreaRecord,
}

// ==========================================
// AreaRecordStore Trait
// ==========================================
// 用途: 测算结果持久化
// 实现者: AreaRecordRepository（使用 rusqlite）
#[async_trait]
pub trait AreaRecordStore: Send + Sync {
    /// 保存记录,返回新记录 ID
    async fn save(&self, record: &AreaRecord) -> RepositoryResult<String>;

    /// 按 ID 读取
    async fn fetch_by_id(&self, record_id: &str) -> RepositoryResult<Option<StoredAreaRecord>>;

    /// 按学校列出（新记录在前）
    async fn list_by_school(&self, school_name: &str) -> RepositoryResult<Vec<StoredAreaRecord>>;

    /// 删除记录
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 记录不存在
    async fn delete(&self, record_id: &str) -> RepositoryResult<bool>;
}

// ==========================================
// AreaRecordRepository - area_record 表仓储
// ==========================================
pub struct AreaRecordRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AreaRecordRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入新记录
    pub fn insert(&self, record: &AreaRecord) -> RepositoryResult<String> {
        let record_id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let record_json = serde_json::to_string(record)?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO area_record (
                record_id, school_name, year, school_type, record_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record_id,
                record.school_name,
                record.year,
                record.school_type,
                record_json,
                created_at.to_rfc3339(),
            ],
        )?;

        Ok(record_id)
    }

    /// 按 ID 查询
    pub fn find_by_id(&self, record_id: &str) -> RepositoryResult<Option<StoredAreaRecord>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                "SELECT record_id, record_json, created_at FROM area_record WHERE record_id = ?1",
                params![record_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, json, created_at)| Self::map_row(id, &json, &created_at))
            .transpose()
    }

    /// 按学校查询
    pub fn find_by_school(&self, school_name: &str) -> RepositoryResult<Vec<StoredAreaRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT record_id, record_json, created_at
            FROM area_record
            WHERE school_name = ?1
            ORDER BY created_at DESC, record_id
            "#,
        )?;
        let rows = stmt.query_map(params![school_name.trim()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, json, created_at) = row?;
            records.push(Self::map_row(id, &json, &created_at)?);
        }
        Ok(records)
    }

    /// 删除记录
    pub fn remove(&self, record_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM area_record WHERE record_id = ?1",
            params![record_id],
        )?;
        Ok(affected > 0)
    }

    fn map_row(record_id: String, json: &str, created_at: &str) -> RepositoryResult<StoredAreaRecord> {
        let record: AreaRecord = serde_json::from_str(json)
            .with_context(|| format!("面积记录(id={})内容无法解析", record_id))?;
        let created_at = DateTime::parse_from_rfc3339(created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::FieldValueError {
                field: "created_at".to_string(),
                message: e.to_string(),
            })?;
        Ok(StoredAreaRecord {
            record_id,
            created_at,
            record,
        })
    }
}

#[async_trait]
impl AreaRecordStore for AreaRecordRepository {
    async fn save(&self, record: &AreaRecord) -> RepositoryResult<String> {
        self.insert(record)
    }

    async fn fetch_by_id(&self, record_id: &str) -> RepositoryResult<Option<StoredAreaRecord>> {
        self.find_by_id(record_id)
    }

    async fn list_by_school(&self, school_name: &str) -> RepositoryResult<Vec<StoredAreaRecord>> {
        self.find_by_school(school_name)
    }

    async fn delete(&self, record_id: &str) -> RepositoryResult<bool> {
        self.remove(record_id)
    }
}
