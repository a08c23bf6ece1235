// ==========================================
// 高校校舍面积缺口测算系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 按生均面积标准测算校舍应有面积与缺口,
//           并把历史填报归一化为一致的宽记录
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 测算与归一化
pub mod engine;

// 导入层 - 面积标准文件
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AreaRecord, CalculationFailure, Field, RawSubmission, RecordCategory, Requirement,
    RoomCategory, SpecialSubsidyItem, Stage, StudentCohort, StudentGroup, StudentTier,
};

// 引擎
pub use engine::{AreaGapCalculator, FieldReconciler, ReconcileInput};

// API
pub use api::{CalculationApi, CalculationRequest, CalculationResponse, RecordApi, StandardsApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "高校校舍面积缺口测算系统";
