// ==========================================
// 高校校舍面积缺口测算系统 - 领域层
// ==========================================
// 职责: 实体、值对象、字段目录
// 红线: 领域层不访问数据库
// ==========================================

pub mod area;
pub mod cohort;
pub mod fields;
pub mod numeric;
pub mod requirement;
pub mod standards;
pub mod submission;
pub mod types;

// 重导出核心类型
pub use area::{AreaRecord, CurrentAreas, SpecialSubsidyItem, StageAreas};
pub use cohort::StudentCohort;
pub use fields::Field;
pub use requirement::{CalculationFailure, CategoryRequirement, Requirement};
pub use standards::{BaseStandards, StandardsSnapshot, SubsidyStandards};
pub use submission::RawSubmission;
pub use types::{RecordCategory, RoomCategory, Stage, StudentGroup, StudentTier};
