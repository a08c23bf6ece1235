// ==========================================
// 测算 API 端到端测试
// ==========================================
// 测试目标: 填报 → 测算 → 归一化 → 持久化 → 查询 / 重新测算 / 删除
// ==========================================

mod test_helpers;

use async_trait::async_trait;
use campus_area_gap::api::{ApiError, CalculationApi, CalculationRequest};
use campus_area_gap::app::AppState;
use campus_area_gap::config::{config_keys, ConfigManager};
use campus_area_gap::db::open_sqlite_connection;
use campus_area_gap::domain::{AreaRecord, CalculationFailure, SpecialSubsidyItem};
use campus_area_gap::repository::{
    AreaRecordStore, RepositoryError, RepositoryResult, StoredAreaRecord,
};
use serde_json::{json, Map};
use std::sync::{Arc, Mutex};
use test_helpers::{
    create_test_db, science_calculator, seed_standards, seeded_state, standard_request,
    standard_submission, SCIENCE_SCHOOL, SCIENCE_TYPE,
};

/// 保存总是失败的存储
struct FailingStore;

#[async_trait]
impl AreaRecordStore for FailingStore {
    async fn save(&self, _record: &AreaRecord) -> RepositoryResult<String> {
        Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()))
    }

    async fn fetch_by_id(&self, _record_id: &str) -> RepositoryResult<Option<StoredAreaRecord>> {
        Ok(None)
    }

    async fn list_by_school(&self, _school_name: &str) -> RepositoryResult<Vec<StoredAreaRecord>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _record_id: &str) -> RepositoryResult<bool> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_calculate_persists_normalized_record() {
    let (_temp_file, state) = seeded_state().await.expect("初始化失败");

    let response = state
        .calculation_api
        .calculate(&standard_request(SCIENCE_SCHOOL))
        .await
        .expect("测算应成功");

    let record = &response.record;
    assert_eq!(record.school_type, SCIENCE_TYPE);
    assert_eq!(record.teaching.required, 14000.0);
    assert_eq!(record.other_living.current, 500.0);
    assert_eq!(record.total_living.current, 6500.0);
    assert_eq!(record.building.current, 19500.0);
    assert_eq!(record.building.required, 26000.0);
    assert_eq!(record.building.gap, 6500.0);
    assert_eq!(record.gap_without_subsidy, 6500.0);
    assert_eq!(record.gap_with_subsidy, 6500.0);
    assert_eq!(record.cohort.total_students, 1000.0);

    let record_id = response.record_id.clone().expect("应返回记录ID");
    assert!(response.persistence_error.is_none());

    // 读出的记录与测算结果一致（归一化幂等）
    let stored = state.record_api.get_record(&record_id).await.unwrap();
    assert_eq!(stored.record_id, record_id);
    assert_eq!(&stored.record, record);
}

#[tokio::test]
async fn test_calculate_gaps_count_planned_area() {
    let (_temp_file, state) = seeded_state().await.expect("初始化失败");

    let submission = standard_submission(SCIENCE_SCHOOL)
        .with_field("teaching_preliminary_area", json!(1000))
        .with_field("dormitory_under_construction_area", json!(500));
    let request = CalculationRequest::new(submission)
        .with_subsidies(vec![SpecialSubsidyItem::new("重点实验室", 300.0)]);

    let response = state
        .calculation_api
        .calculate(&request)
        .await
        .expect("测算应成功");
    let record = &response.record;

    assert_eq!(record.teaching.total, 11000.0);
    assert_eq!(record.teaching.gap, 3000.0);
    assert_eq!(record.dormitory.gap, 0.0);
    assert_eq!(record.other_living.gap, 500.0);
    assert_eq!(record.building.planned, 1500.0);
    assert_eq!(record.building.total, 21000.0);
    assert_eq!(record.building.gap, 5000.0);
    assert_eq!(
        record.gap_without_subsidy,
        record.building.required - record.building.total
    );
    assert_eq!(record.gap_without_subsidy, record.building.gap);
    assert_eq!(record.gap_with_subsidy, 5300.0);

    let category_gaps = record.teaching.gap
        + record.office.gap
        + record.dormitory.gap
        + record.other_living.gap
        + record.logistics.gap;
    assert_eq!(category_gaps, record.building.gap);

    // 保存后读回不改变缺口
    let record_id = response.record_id.clone().expect("应返回记录ID");
    let stored = state.record_api.get_record(&record_id).await.unwrap();
    assert_eq!(&stored.record, record);
}

#[tokio::test]
async fn test_persistence_failure_is_annotated_not_fatal() {
    let api = CalculationApi::new(Arc::new(science_calculator()), Arc::new(FailingStore));

    let response = api
        .calculate(&standard_request(SCIENCE_SCHOOL))
        .await
        .expect("保存失败不影响测算");

    assert!(response.record_id.is_none());
    let message = response.persistence_error.expect("应附带保存错误");
    assert!(message.contains("disk I/O error"));
    assert_eq!(response.record.building.gap, 6500.0);
}

#[tokio::test]
async fn test_calculate_failure_is_tagged() {
    let (_temp_file, state) = seeded_state().await.unwrap();

    let failure = state
        .calculation_api
        .calculate(&standard_request("未登记学院"))
        .await
        .unwrap_err();

    assert_eq!(
        failure,
        CalculationFailure::StandardsNotFound {
            school_type: "综合院校".to_string()
        }
    );
    let tagged = serde_json::to_value(&failure).unwrap();
    assert_eq!(tagged["kind"], json!("StandardsNotFound"));
}

#[tokio::test]
async fn test_batch_results_keep_request_order() {
    let (_temp_file, state) = seeded_state().await.unwrap();

    let with_subsidies = standard_request(SCIENCE_SCHOOL).with_subsidies(vec![
        SpecialSubsidyItem::new("重点实验室", 500.0),
        SpecialSubsidyItem::new("体育馆", 300.0),
    ]);
    let requests = vec![
        standard_request(SCIENCE_SCHOOL),
        standard_request("未登记学院"),
        with_subsidies,
    ];

    let results = state.calculation_api.calculate_batch(&requests).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().record.gap_with_subsidy, 6500.0);
    assert!(matches!(
        results[1],
        Err(CalculationFailure::StandardsNotFound { .. })
    ));
    let third = results[2].as_ref().unwrap();
    assert_eq!(third.record.special_subsidy_total, 800.0);
    assert_eq!(third.record.special_subsidy_count, 2);
    assert_eq!(third.record.gap_with_subsidy, 7300.0);

    let stored = state.record_api.list_records(SCIENCE_SCHOOL).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_request_json_shape() {
    let (_temp_file, state) = seeded_state().await.unwrap();

    let request: CalculationRequest = serde_json::from_value(json!({
        "school_name": SCIENCE_SCHOOL,
        "year": 2024,
        "fields": {
            "full_time_undergraduate": "1000",
            "teaching_current_area": 10000
        },
        "special_subsidies": [{"name": "体育馆", "area": "300"}, {"name": "空项", "area": ""}]
    }))
    .unwrap();

    let response = state.calculation_api.calculate(&request).await.unwrap();

    assert_eq!(response.record.teaching.gap, 4000.0);
    assert_eq!(response.record.special_subsidy_total, 300.0);
    assert_eq!(response.record.special_subsidy_count, 2);
}

#[tokio::test]
async fn test_recalculate_saves_new_record() {
    let (_temp_file, state) = seeded_state().await.unwrap();

    let first = state
        .calculation_api
        .calculate(&standard_request(SCIENCE_SCHOOL))
        .await
        .unwrap();
    let first_id = first.record_id.unwrap();

    let mut overrides = Map::new();
    overrides.insert("teaching_current_area".to_string(), json!(12000));
    let second = state
        .calculation_api
        .recalculate(&first_id, &overrides, None)
        .await
        .expect("重新测算应成功");
    let second_id = second.record_id.clone().unwrap();

    assert_ne!(first_id, second_id);
    assert_eq!(second.record.teaching.current, 12000.0);
    assert_eq!(second.record.teaching.gap, 2000.0);
    // 未覆写的填报值沿用历史记录
    assert_eq!(second.record.other_living.current, 500.0);
    assert_eq!(second.record.cohort.full_time_undergraduate, 1000.0);
    assert_eq!(second.record.building.gap, 4500.0);
    assert_eq!(second.record.gap_with_subsidy, 4500.0);

    // 历史记录不变
    let original = state.record_api.get_record(&first_id).await.unwrap();
    assert_eq!(original.record.teaching.current, 10000.0);
    assert_eq!(original.record.building.gap, 6500.0);

    let all = state.record_api.list_records(SCIENCE_SCHOOL).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_recalculate_with_new_subsidies_and_missing_record() {
    let (_temp_file, state) = seeded_state().await.unwrap();

    let first = state
        .calculation_api
        .calculate(&standard_request(SCIENCE_SCHOOL))
        .await
        .unwrap();

    let response = state
        .calculation_api
        .recalculate(
            first.record_id.as_deref().unwrap(),
            &Map::new(),
            Some(vec![SpecialSubsidyItem::new("图书馆", 1000.0)]),
        )
        .await
        .unwrap();
    assert_eq!(response.record.gap_without_subsidy, 6500.0);
    assert_eq!(response.record.gap_with_subsidy, 7500.0);
    assert_eq!(response.record.special_subsidies.len(), 1);

    let err = state
        .calculation_api
        .recalculate("no-such-record", &Map::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_record() {
    let (_temp_file, state) = seeded_state().await.unwrap();

    let response = state
        .calculation_api
        .calculate(&standard_request(SCIENCE_SCHOOL))
        .await
        .unwrap();
    let record_id = response.record_id.unwrap();

    state.record_api.delete_record(&record_id).await.unwrap();

    assert!(matches!(
        state.record_api.get_record(&record_id).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        state.record_api.delete_record(&record_id).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        state.record_api.list_records("  ").await,
        Err(ApiError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_subsidy_tiers_read_from_config() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    seed_standards(&db_path).unwrap();
    {
        let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));
        let config = ConfigManager::from_connection(conn).unwrap();
        config
            .set_global_config_value(config_keys::SUBSIDY_TIERS, r#"["FULL_TIME_MASTER"]"#)
            .unwrap();
        config
            .set_global_config_value(config_keys::DEFAULT_SCHOOL_TYPE, SCIENCE_TYPE)
            .unwrap();
    }

    let state = AppState::new(db_path).await.unwrap();
    let request = CalculationRequest::new(
        standard_submission("任意学院")
            .with_field("full_time_undergraduate", json!(990))
            .with_field("full_time_doctor", json!(10)),
    );

    let response = state.calculation_api.calculate(&request).await.unwrap();

    // 默认类型来自配置;博士补助不在配置的层次列表中
    assert_eq!(response.record.school_type, SCIENCE_TYPE);
    assert_eq!(response.record.teaching.required, 14000.0);
}
