// ==========================================
// 高校校舍面积缺口测算系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、写入
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::calc_config_trait::{CalculatorConfigReader, ConfigError};
use crate::domain::types::StudentTier;
use crate::repository::school_registry_repo::DEFAULT_SCHOOL_TYPE;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }
}

#[async_trait]
impl CalculatorConfigReader for ConfigManager {
    async fn get_default_school_type(&self) -> Result<String, ConfigError> {
        let value = self.get_config_or_default(config_keys::DEFAULT_SCHOOL_TYPE, DEFAULT_SCHOOL_TYPE)?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Ok(DEFAULT_SCHOOL_TYPE.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }

    async fn get_subsidy_tiers(&self) -> Result<Vec<StudentTier>, ConfigError> {
        let Some(value) = self.get_config_value(config_keys::SUBSIDY_TIERS)? else {
            return Ok(StudentTier::DEFAULT_ORDER.to_vec());
        };

        let codes: Vec<String> = match serde_json::from_str(&value) {
            Ok(codes) => codes,
            Err(e) => {
                tracing::warn!(
                    config_key = config_keys::SUBSIDY_TIERS,
                    error = %e,
                    "补助层次配置格式错误,使用默认层次"
                );
                return Ok(StudentTier::DEFAULT_ORDER.to_vec());
            }
        };

        let mut tiers = Vec::with_capacity(codes.len());
        for code in &codes {
            match StudentTier::parse(code) {
                Some(tier) if !tiers.contains(&tier) => tiers.push(tier),
                Some(_) => {}
                None => tracing::warn!(%code, "未知补助层次代码,已忽略"),
            }
        }
        Ok(tiers)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 学校类型
    pub const DEFAULT_SCHOOL_TYPE: &str = "default_school_type";

    // 补助层次 (JSON 数组)
    pub const SUBSIDY_TIERS: &str = "subsidy_tiers";
}
