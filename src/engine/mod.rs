// ==========================================
// 高校校舍面积缺口测算系统 - 引擎层
// ==========================================
// 职责: 测算与归一化规则,不拼 SQL
// 红线: Engine 不访问数据库,标准与学校类型经注入的仓储读取
// ==========================================

pub mod calculator;
pub mod reconciler;

// 重导出核心引擎
pub use calculator::AreaGapCalculator;
pub use reconciler::{FieldReconciler, FieldSource, ReconcileInput};
