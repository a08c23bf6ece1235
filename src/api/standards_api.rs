// ==========================================
// 高校校舍面积缺口测算系统 - 面积标准 API
// ==========================================
// 职责: 标准表重载 / 标准文件导入 / 学校类型登记
// 红线: 快照整体替换,进行中的测算只会看到替换前或替换后的完整快照
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::calc_config_trait::CalculatorConfigReader;
use crate::config::config_manager::ConfigManager;
use crate::engine::calculator::AreaGapCalculator;
use crate::importer::standards_importer::StandardsImporter;
use crate::repository::school_registry_repo::{SchoolDirectory, SchoolRegistryRepository};
use crate::repository::standards_repo::{InMemoryStandardsRepository, StandardsTableRepository};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// 导入结果摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardsImportSummary {
    /// 写入的标准行数（基础 + 补助）
    pub rows_written: usize,
    pub school_types: Vec<String>,
}

/// 面积标准API
pub struct StandardsApi {
    table_repo: Arc<StandardsTableRepository>,
    snapshot_repo: Arc<InMemoryStandardsRepository>,
    registry_repo: Arc<SchoolRegistryRepository>,
    directory: Arc<SchoolDirectory>,
    config: Arc<ConfigManager>,
    calculator: Arc<AreaGapCalculator>,
    importer: StandardsImporter,
}

impl StandardsApi {
    pub fn new(
        table_repo: Arc<StandardsTableRepository>,
        snapshot_repo: Arc<InMemoryStandardsRepository>,
        registry_repo: Arc<SchoolRegistryRepository>,
        directory: Arc<SchoolDirectory>,
        config: Arc<ConfigManager>,
        calculator: Arc<AreaGapCalculator>,
    ) -> Self {
        Self {
            table_repo,
            snapshot_repo,
            registry_repo,
            directory,
            config,
            calculator,
            importer: StandardsImporter::new(),
        }
    }

    /// 从数据库重新加载标准、学校登记与测算配置
    #[instrument(skip(self))]
    pub async fn reload(&self) -> ApiResult<()> {
        let snapshot = self.table_repo.load_snapshot()?;
        self.snapshot_repo.load_snapshot(snapshot);

        let registry = self.registry_repo.load_all()?;
        self.directory.load(registry);

        let default_type = self
            .config
            .get_default_school_type()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        self.directory.set_default_type(&default_type);

        let tiers = self
            .config
            .get_subsidy_tiers()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        tracing::debug!(?tiers, default_type = %default_type, "测算配置已加载");
        self.calculator.set_tiers(tiers);

        Ok(())
    }

    /// 导入标准文件（CSV / Excel）: 写库并替换内存快照
    ///
    /// 文件中任一行不合法时整批失败,数据库与内存快照均保持不变
    #[instrument(skip(self), fields(path = %file_path.display()))]
    pub async fn import_file(&self, file_path: &Path) -> ApiResult<StandardsImportSummary> {
        let snapshot = self.importer.import_file(file_path)?;
        let rows_written = self.table_repo.replace_all(&snapshot)?;
        let school_types = snapshot.school_types();
        self.snapshot_repo.load_snapshot(snapshot);

        tracing::info!(rows_written, school_types = school_types.len(), "面积标准导入完成");
        Ok(StandardsImportSummary {
            rows_written,
            school_types,
        })
    }

    /// 当前快照中的学校类型
    pub fn list_school_types(&self) -> Vec<String> {
        self.snapshot_repo.current().school_types()
    }

    /// 登记学校类型（写库并立即生效）
    pub fn register_school(&self, school_name: &str, school_type: &str) -> ApiResult<()> {
        let school_name = school_name.trim();
        let school_type = school_type.trim();
        if school_name.is_empty() {
            return Err(ApiError::InvalidInput("学校名称不能为空".to_string()));
        }
        if school_type.is_empty() {
            return Err(ApiError::InvalidInput("学校类型不能为空".to_string()));
        }

        self.registry_repo.upsert(school_name, school_type)?;
        self.directory.register(school_name, school_type);
        Ok(())
    }
}
