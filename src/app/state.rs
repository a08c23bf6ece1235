// ==========================================
// 高校校舍面积缺口测算系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约定: 全部仓储共享同一个 SQLite 连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CalculationApi, RecordApi, StandardsApi};
use crate::config::config_manager::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::calculator::AreaGapCalculator;
use crate::repository::{
    AreaRecordRepository, InMemoryStandardsRepository, SchoolDirectory,
    SchoolRegistryRepository, StandardsTableRepository, DEFAULT_SCHOOL_TYPE,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 测算API
    pub calculation_api: Arc<CalculationApi>,

    /// 面积记录API
    pub record_api: Arc<RecordApi>,

    /// 面积标准API
    pub standards_api: Arc<StandardsApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并初始化表结构
    /// 2. 初始化所有Repository与测算器
    /// 3. 从数据库加载面积标准、学校登记与测算配置
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let table_repo = Arc::new(StandardsTableRepository::new(conn.clone()));
        let snapshot_repo = Arc::new(InMemoryStandardsRepository::empty());
        let registry_repo = Arc::new(SchoolRegistryRepository::new(conn.clone()));
        let record_repo = Arc::new(AreaRecordRepository::new(conn.clone()));
        let directory = Arc::new(SchoolDirectory::new(DEFAULT_SCHOOL_TYPE));

        let config = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let calculator = Arc::new(AreaGapCalculator::new(
            snapshot_repo.clone(),
            directory.clone(),
        ));

        // ==========================================
        // 创建API实例
        // ==========================================
        let calculation_api = Arc::new(CalculationApi::new(calculator.clone(), record_repo.clone()));
        let record_api = Arc::new(RecordApi::new(record_repo));
        let standards_api = Arc::new(StandardsApi::new(
            table_repo,
            snapshot_repo,
            registry_repo,
            directory,
            config,
            calculator,
        ));

        standards_api
            .reload()
            .await
            .map_err(|e| format!("加载面积标准失败: {}", e))?;

        tracing::info!(school_types = standards_api.list_school_types().len(), "AppState初始化完成");

        Ok(Self {
            db_path,
            calculation_api,
            record_api,
            standards_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 CAMPUS_AREA_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("CAMPUS_AREA_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./campus_area_gap.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("campus-area-gap");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("campus_area_gap.db");
        }
    }

    path.to_string_lossy().to_string()
}
