// ==========================================
// 高校校舍面积缺口测算系统 - 面积标准仓储
// ==========================================
// StandardsRepository: 测算器读取标准的异步接口
// InMemoryStandardsRepository: 进程内快照,整体替换式重载
// StandardsTableRepository: area_standard / subsidy_standard 表读写
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::standards::{BaseStandards, StandardsSnapshot, SubsidyStandards};
use crate::domain::types::{RoomCategory, StudentTier};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, RwLock};

// ==========================================
// StandardsRepository Trait
// ==========================================
// 用途: 测算器读取标准（只读）
// 实现者: InMemoryStandardsRepository
// 测算器按子集读取（base_standards / subsidy_standards）;
// 单项查询 get_base_rate / get_subsidy_rate 供外部调用方查看单个标准值
#[async_trait]
pub trait StandardsRepository: Send + Sync {
    /// 基础生均面积标准（单项查询,不参与测算）
    async fn get_base_rate(&self, school_type: &str, category: RoomCategory) -> Option<f64>;

    /// 层次补助生均面积标准（单项查询,不参与测算）
    async fn get_subsidy_rate(
        &self,
        school_type: &str,
        category: RoomCategory,
        tier: StudentTier,
    ) -> Option<f64>;

    /// 某学校类型的基础标准子集（None = 该类型无标准）
    async fn base_standards(&self, school_type: &str) -> Option<BaseStandards>;

    /// 某学校类型的补助标准子集（None = 该类型无标准）
    async fn subsidy_standards(&self, school_type: &str) -> Option<SubsidyStandards>;

    /// 已加载的学校类型
    async fn school_types(&self) -> Vec<String>;
}

// ==========================================
// InMemoryStandardsRepository - 内存快照
// ==========================================
// 每次读取先克隆 Arc,单次查询内看到的是同一份快照;
// 重载与进行中的测算不做事务隔离
pub struct InMemoryStandardsRepository {
    snapshot: RwLock<Arc<StandardsSnapshot>>,
}

impl InMemoryStandardsRepository {
    pub fn new(snapshot: StandardsSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    pub fn empty() -> Self {
        Self::new(StandardsSnapshot::default())
    }

    /// 当前快照
    pub fn current(&self) -> Arc<StandardsSnapshot> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// 整体替换快照
    pub fn load_snapshot(&self, snapshot: StandardsSnapshot) {
        let school_types = snapshot.school_types().len();
        let next = Arc::new(snapshot);
        match self.snapshot.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        tracing::info!(school_types, "面积标准快照已替换");
    }
}

#[async_trait]
impl StandardsRepository for InMemoryStandardsRepository {
    async fn get_base_rate(&self, school_type: &str, category: RoomCategory) -> Option<f64> {
        self.current().base_rate(school_type, category)
    }

    async fn get_subsidy_rate(
        &self,
        school_type: &str,
        category: RoomCategory,
        tier: StudentTier,
    ) -> Option<f64> {
        self.current().subsidy_rate(school_type, category, tier)
    }

    async fn base_standards(&self, school_type: &str) -> Option<BaseStandards> {
        self.current().base_standards(school_type).cloned()
    }

    async fn subsidy_standards(&self, school_type: &str) -> Option<SubsidyStandards> {
        self.current().subsidy_standards(school_type).cloned()
    }

    async fn school_types(&self) -> Vec<String> {
        self.current().school_types()
    }
}

// ==========================================
// StandardsTableRepository - 标准表仓储
// ==========================================

/// 面积标准表仓储
/// 职责: 管理 area_standard / subsidy_standard 表
pub struct StandardsTableRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StandardsTableRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取两张标准表,组装为快照
    ///
    /// 无法识别的类别/层次代码会被跳过并告警;
    /// 只有基础标准的学校类型得到空的补助子集,可正常测算
    pub fn load_snapshot(&self) -> RepositoryResult<StandardsSnapshot> {
        let conn = self.get_conn()?;
        let mut snapshot = StandardsSnapshot::new();

        let mut stmt = conn.prepare(
            "SELECT school_type, category, base_rate FROM area_standard ORDER BY school_type, category",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?;
        for row in rows {
            let (school_type, category_code, rate) = row?;
            match RoomCategory::parse(&category_code) {
                Some(category) => snapshot.set_base_rate(&school_type, category, rate),
                None => tracing::warn!(%school_type, %category_code, "未知用房类别,已跳过"),
            }
        }

        let mut stmt = conn.prepare(
            "SELECT school_type, category, tier, rate FROM subsidy_standard ORDER BY school_type, category, tier",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
            ))
        })?;
        for row in rows {
            let (school_type, category_code, tier_code, rate) = row?;
            match (RoomCategory::parse(&category_code), StudentTier::parse(&tier_code)) {
                (Some(category), Some(tier)) => {
                    snapshot.set_subsidy_rate(&school_type, category, tier, rate)
                }
                _ => tracing::warn!(
                    %school_type,
                    %category_code,
                    %tier_code,
                    "未知用房类别或学生层次,已跳过"
                ),
            }
        }

        // 有基础标准但没有任何补助行的学校类型: 补助子集为空集而非缺失
        let base_types: Vec<String> = snapshot.base.keys().cloned().collect();
        for school_type in base_types {
            snapshot.ensure_subsidy_set(&school_type);
        }

        Ok(snapshot)
    }

    /// 用快照整体替换两张标准表（单事务）
    ///
    /// # 返回
    /// - Ok(usize): 写入的行数
    pub fn replace_all(&self, snapshot: &StandardsSnapshot) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute("DELETE FROM area_standard", [])?;
        tx.execute("DELETE FROM subsidy_standard", [])?;

        let mut written = 0;
        for (school_type, standards) in &snapshot.base {
            for (category, rate) in &standards.rates {
                written += tx.execute(
                    "INSERT INTO area_standard (school_type, category, base_rate) VALUES (?1, ?2, ?3)",
                    params![school_type, category.code(), rate],
                )?;
            }
        }
        for (school_type, standards) in &snapshot.subsidy {
            for (category, tiers) in &standards.rates {
                for (tier, rate) in tiers {
                    written += tx.execute(
                        "INSERT INTO subsidy_standard (school_type, category, tier, rate) VALUES (?1, ?2, ?3, ?4)",
                        params![school_type, category.code(), tier.code(), rate],
                    )?;
                }
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(written)
    }

    /// 插入或更新单条基础标准
    pub fn upsert_base_rate(
        &self,
        school_type: &str,
        category: RoomCategory,
        rate: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO area_standard (school_type, category, base_rate) VALUES (?1, ?2, ?3)",
            params![school_type, category.code(), rate],
        )?;
        Ok(())
    }

    /// 插入或更新单条补助标准
    pub fn upsert_subsidy_rate(
        &self,
        school_type: &str,
        category: RoomCategory,
        tier: StudentTier,
        rate: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO subsidy_standard (school_type, category, tier, rate) VALUES (?1, ?2, ?3, ?4)",
            params![school_type, category.code(), tier.code(), rate],
        )?;
        Ok(())
    }
}
