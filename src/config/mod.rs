// ==========================================
// 高校校舍面积缺口测算系统 - 配置层
// ==========================================
// 职责: 测算相关配置的读取与写入
// 存储: config_kv 表 (scope_id = 'global')
// ==========================================

pub mod calc_config_trait;
pub mod config_manager;

// 重导出核心配置管理器
pub use calc_config_trait::CalculatorConfigReader;
pub use config_manager::{config_keys, ConfigManager};
