// ==========================================
// 高校校舍面积缺口测算系统 - 测算配置读取 Trait
// ==========================================
// 职责: 定义测算器所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::StudentTier;
use async_trait::async_trait;
use std::error::Error;

/// 配置读取错误
pub type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// CalculatorConfigReader Trait
// ==========================================
// 用途: 测算器 / 学校类型解析所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait CalculatorConfigReader: Send + Sync {
    /// 获取默认学校类型（未登记学校的回退分类）
    ///
    /// # 默认值
    /// - 综合院校
    async fn get_default_school_type(&self) -> Result<String, ConfigError>;

    /// 获取补助公式求和的层次列表
    ///
    /// # 返回
    /// - Vec<StudentTier>: 按配置顺序
    ///
    /// # 默认值
    /// - [FULL_TIME_MASTER, FULL_TIME_DOCTOR, INTERNATIONAL_ALL,
    ///    INTERNATIONAL_MASTER, INTERNATIONAL_DOCTOR]
    ///
    /// # 说明
    /// - INTERNATIONAL_ALL 与留学生硕士/博士同时求和会重复计入,
    ///   调整口径只需修改配置
    async fn get_subsidy_tiers(&self) -> Result<Vec<StudentTier>, ConfigError>;
}
