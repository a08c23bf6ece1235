// ==========================================
// 高校校舍面积缺口测算系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod area_record_repo;
pub mod error;
pub mod school_registry_repo;
pub mod standards_repo;

// 重导出核心仓储
pub use area_record_repo::{AreaRecordRepository, AreaRecordStore, StoredAreaRecord};
pub use error::{RepositoryError, RepositoryResult};
pub use school_registry_repo::{
    SchoolDirectory, SchoolRegistryRepository, SchoolTypeResolver, DEFAULT_SCHOOL_TYPE,
};
pub use standards_repo::{
    InMemoryStandardsRepository, StandardsRepository, StandardsTableRepository,
};
