// ==========================================
// 高校校舍面积缺口测算系统 - 应用层
// ==========================================
// 职责: 组装仓储、测算器与 API,供命令行 / HTTP 层共用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
