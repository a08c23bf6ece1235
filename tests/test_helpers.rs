// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、标准种子数据、测算器与请求构造
// ==========================================

#![allow(dead_code)]

use campus_area_gap::api::CalculationRequest;
use campus_area_gap::app::AppState;
use campus_area_gap::db::{init_schema, open_sqlite_connection};
use campus_area_gap::domain::{RawSubmission, RoomCategory, StandardsSnapshot, StudentTier};
use campus_area_gap::engine::AreaGapCalculator;
use campus_area_gap::repository::{
    InMemoryStandardsRepository, SchoolDirectory, StandardsTableRepository,
};
use serde_json::json;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 种子数据中的学校类型
pub const SCIENCE_TYPE: &str = "理工院校";
/// 登记为理工院校的学校
pub const SCIENCE_SCHOOL: &str = "示范理工大学";

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_string_lossy().to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 理工院校标准: 五类基础标准 + 教学用房博士补助
pub fn science_snapshot() -> StandardsSnapshot {
    let mut snapshot = StandardsSnapshot::new();
    snapshot.set_base_rate(SCIENCE_TYPE, RoomCategory::Teaching, 14.0);
    snapshot.set_base_rate(SCIENCE_TYPE, RoomCategory::Office, 3.0);
    snapshot.set_base_rate(SCIENCE_TYPE, RoomCategory::Dormitory, 6.5);
    snapshot.set_base_rate(SCIENCE_TYPE, RoomCategory::OtherLiving, 1.0);
    snapshot.set_base_rate(SCIENCE_TYPE, RoomCategory::Logistics, 1.5);
    snapshot.set_subsidy_rate(
        SCIENCE_TYPE,
        RoomCategory::Teaching,
        StudentTier::FullTimeDoctor,
        5.0,
    );
    snapshot
}

/// 写入标准种子数据
pub fn seed_standards(db_path: &str) -> Result<(), Box<dyn Error>> {
    let conn = Arc::new(Mutex::new(open_sqlite_connection(db_path)?));
    StandardsTableRepository::new(conn).replace_all(&science_snapshot())?;
    Ok(())
}

/// 纯内存测算器: 示范理工大学 → 理工院校,其余学校 → 综合院校（无标准）
pub fn science_calculator() -> AreaGapCalculator {
    let directory = SchoolDirectory::new("综合院校");
    directory.register(SCIENCE_SCHOOL, SCIENCE_TYPE);
    AreaGapCalculator::new(
        Arc::new(InMemoryStandardsRepository::new(science_snapshot())),
        Arc::new(directory),
    )
}

/// 已播种标准并登记示范理工大学的应用状态
pub async fn seeded_state() -> Result<(NamedTempFile, AppState), Box<dyn Error>> {
    let (temp_file, db_path) = create_test_db()?;
    seed_standards(&db_path)?;

    let state = AppState::new(db_path).await?;
    state
        .standards_api
        .register_school(SCIENCE_SCHOOL, SCIENCE_TYPE)?;
    Ok((temp_file, state))
}

/// 1000 名本科生,五类现有面积齐全的填报
///
/// 应有: 14000 + 3000 + 6500 + 1000 + 1500 = 26000
/// 现有: 10000 + 2000 + 6000 + 500 + 1000 = 19500
pub fn standard_submission(school_name: &str) -> RawSubmission {
    RawSubmission::new(school_name, 2024)
        .with_field("full_time_undergraduate", json!(1000))
        .with_field("teaching_current_area", json!(10000))
        .with_field("office_current_area", json!("2000"))
        .with_field("dormitory_current_area", json!(6000))
        .with_field("total_living_current_area", json!(6500))
        .with_field("logistics_current_area", json!(1000))
}

pub fn standard_request(school_name: &str) -> CalculationRequest {
    CalculationRequest::new(standard_submission(school_name))
}
