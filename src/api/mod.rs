// ==========================================
// 高校校舍面积缺口测算系统 - API 层
// ==========================================
// 职责: 测算边界接口,供 HTTP 层 / 命令行调用
// ==========================================

pub mod calculation_api;
pub mod error;
pub mod record_api;
pub mod standards_api;

// 重导出核心类型
pub use calculation_api::{CalculationApi, CalculationRequest, CalculationResponse};
pub use error::{ApiError, ApiResult};
pub use record_api::RecordApi;
pub use standards_api::{StandardsApi, StandardsImportSummary};
