use super::*;
use crate::domain::area::{AreaRecord, SpecialSubsidyItem};
use crate::domain::cohort::StudentCohort;
use crate::domain::numeric::round2;
use crate::domain::requirement::{CategoryRequirement, Requirement};
use crate::domain::submission::RawSubmission;
use crate::domain::types::{RecordCategory, RoomCategory, Stage};
use serde_json::json;

// ==========================================
// 测试辅助函数
// ==========================================

const ROOM_CATEGORIES: [RecordCategory; 5] = [
    RecordCategory::Teaching,
    RecordCategory::Office,
    RecordCategory::Dormitory,
    RecordCategory::OtherLiving,
    RecordCategory::Logistics,
];

const PARTS: [RecordCategory; 4] = [
    RecordCategory::Teaching,
    RecordCategory::Office,
    RecordCategory::TotalLiving,
    RecordCategory::Logistics,
];

fn reconcile_raw(raw: &RawSubmission) -> AreaRecord {
    let mut cohort = StudentCohort::default();
    FieldReconciler::new().reconcile(&ReconcileInput::new(raw), &mut cohort)
}

fn assert_two_decimals(value: f64, what: &str) {
    let scaled = value * 100.0;
    assert!(
        (scaled - scaled.round()).abs() < 1e-6,
        "{} 超过两位小数: {}",
        what,
        value
    );
}

/// 校验全部求和不变式
fn assert_invariants(record: &AreaRecord) {
    for category in RecordCategory::ALL {
        let areas = record.areas(category);
        assert_eq!(
            areas.total,
            round2(areas.current + areas.planned),
            "{} 合计 != 现有 + 规划",
            category
        );
        for stage in Stage::ALL {
            assert_two_decimals(areas.get(stage), &format!("{}_{}", category, stage));
        }
    }

    for category in ROOM_CATEGORIES {
        let areas = record.areas(category);
        assert_eq!(
            areas.planned,
            round2(areas.preliminary + areas.under_construction),
            "{} 规划 != 前期 + 在建",
            category
        );
    }

    for stage in [
        Stage::Current,
        Stage::Preliminary,
        Stage::UnderConstruction,
        Stage::Planned,
        Stage::Total,
    ] {
        assert_eq!(
            record.total_living.get(stage),
            round2(record.dormitory.get(stage) + record.other_living.get(stage)),
            "生活用房合计 ({})",
            stage
        );
        let building: f64 = PARTS.iter().map(|c| record.areas(*c).get(stage)).sum();
        assert_eq!(record.building.get(stage), round2(building), "校舍合计 ({})", stage);
    }

    let cohort = &record.cohort;
    assert_eq!(
        cohort.total_students,
        round2(cohort.full_time_total + cohort.international_total)
    );

    assert_gap_invariants(record);
}

/// 缺口不变式（仅适用于未显式覆盖任何缺口的记录）
fn assert_gap_invariants(record: &AreaRecord) {
    for category in ROOM_CATEGORIES {
        let areas = record.areas(category);
        assert_eq!(
            areas.gap,
            round2(areas.required - areas.total),
            "{} 缺口 != 需求 - 合计",
            category
        );
    }
    assert_eq!(
        record.total_living.gap,
        round2(record.dormitory.gap + record.other_living.gap)
    );
    assert_eq!(
        record.building.gap,
        round2(record.building.required - record.building.total),
        "校舍缺口 != 校舍需求 - 校舍合计"
    );
    assert_eq!(record.gap_without_subsidy, record.building.gap);
    assert_eq!(
        record.gap_with_subsidy,
        round2(record.gap_without_subsidy + record.special_subsidy_total)
    );
}

fn messy_submission() -> RawSubmission {
    RawSubmission::new("示范理工大学", 2024)
        // 规范字段名 / 历史别名 / 中文表头混用
        .with_field("teaching_current_area", json!("12,345.678"))
        .with_field("teaching_preliminary", json!(100.004))
        .with_field("under_construction_teaching_area", json!("200.5"))
        .with_field("行政办公用房现有面积", json!(3000))
        .with_field("dormitory_current_area", json!(""))
        .with_field("dormitory_under_construction_area", json!(1500.125))
        .with_field("other_living_current_area", json!("N/A"))
        .with_field("other_living_area", json!(800))
        .with_field("logistics_current_area", json!(null))
        .with_field("logistics_preliminary_area", json!("  250  "))
        // 会被重算覆盖的派生值
        .with_field("teaching_planned_area", json!(99999))
        .with_field("total_living_current_area", json!(123456))
        .with_field("building_total_area", json!(1))
        // 人数
        .with_field("full_time_undergraduate", json!("8000"))
        .with_field("doctor_count", json!(120))
        .with_field("international_master", json!("abc"))
        .with_field("total_students", json!(1))
}

fn sample_requirement() -> Requirement {
    let categories = [
        (RoomCategory::Teaching, 14000.0, 10000.0),
        (RoomCategory::Office, 3000.0, 2500.0),
        (RoomCategory::Dormitory, 6500.0, 6000.0),
        (RoomCategory::OtherLiving, 1000.0, 400.0),
        (RoomCategory::Logistics, 2000.0, 2200.0),
    ]
    .into_iter()
    .map(|(category, total_required, current_area)| CategoryRequirement {
        category,
        base_rate: 0.0,
        basic_required: total_required,
        subsidized_required: 0.0,
        total_required,
        current_area,
        gap: round2(total_required - current_area),
    })
    .collect();

    Requirement {
        school_name: "示范理工大学".to_string(),
        year: 2024,
        school_type: "理工院校".to_string(),
        cohort: StudentCohort {
            full_time_undergraduate: 1000.0,
            full_time_total: 1000.0,
            total_students: 1000.0,
            ..Default::default()
        },
        categories,
        total_required: 26500.0,
        total_current: 21100.0,
        total_gap_before_subsidy: 5400.0,
        special_subsidy_total: 800.0,
        total_gap_with_subsidy: 6200.0,
        special_subsidies: vec![
            SpecialSubsidyItem::new("重点实验室", 500.0),
            SpecialSubsidyItem::new("体育馆", 300.0),
        ],
        special_subsidy_count: 2,
    }
}

// ==========================================
// 叶子字段容错与取整
// ==========================================

#[test]
fn test_coercion_and_rounding_of_leaf_fields() {
    let record = reconcile_raw(&messy_submission());

    assert_eq!(record.teaching.current, 12345.68);
    assert_eq!(record.teaching.preliminary, 100.0);
    assert_eq!(record.teaching.under_construction, 200.5);
    assert_eq!(record.office.current, 3000.0);
    assert_eq!(record.dormitory.current, 0.0);
    assert_eq!(record.dormitory.under_construction, 1500.13);
    // 非数值的规范字段被跳过,历史别名胜出
    assert_eq!(record.other_living.current, 800.0);
    assert_eq!(record.logistics.current, 0.0);
    assert_eq!(record.logistics.preliminary, 250.0);

    assert_invariants(&record);
}

#[test]
fn test_derived_inputs_are_overridden() {
    let record = reconcile_raw(&messy_submission());

    assert_eq!(record.teaching.planned, 300.5);
    assert_eq!(record.total_living.current, 800.0);
    assert_eq!(
        record.building.current,
        round2(12345.68 + 3000.0 + 800.0 + 0.0)
    );
    assert_eq!(record.building.total, round2(record.building.current + record.building.planned));
}

#[test]
fn test_other_living_derived_from_living_total_when_absent() {
    let raw = RawSubmission::new("示范大学", 2024)
        .with_field("living_area", json!(100))
        .with_field("dormitory_current_area", json!(60));
    let record = reconcile_raw(&raw);
    assert_eq!(record.other_living.current, 40.0);
    assert_eq!(record.total_living.current, 100.0);

    let raw = raw.with_field("dormitory_current_area", json!(120));
    let record = reconcile_raw(&raw);
    assert_eq!(record.other_living.current, 0.0);
    assert_eq!(record.total_living.current, 120.0);
}

// ==========================================
// 应有面积与缺口
// ==========================================

#[test]
fn test_required_prefers_calculator_over_raw_override() {
    let requirement = sample_requirement();
    let raw = RawSubmission::new("示范理工大学", 2024)
        .with_field("required_teaching_area", json!(99))
        .with_field("office_required_area", json!(42));
    let mut cohort = StudentCohort::default();

    let record = FieldReconciler::new().reconcile(
        &ReconcileInput::new(&raw).with_requirement(&requirement),
        &mut cohort,
    );
    assert_eq!(record.teaching.required, 14000.0);
    assert_eq!(record.office.required, 3000.0);
    assert_eq!(record.building.required, 26500.0);

    let record = reconcile_raw(&raw);
    assert_eq!(record.teaching.required, 99.0);
    assert_eq!(record.office.required, 42.0);
    assert_eq!(record.dormitory.required, 0.0);
    assert_eq!(record.building.required, 141.0);
}

#[test]
fn test_gap_without_subsidy_equals_building_required_minus_total() {
    let raw = RawSubmission::new("示范大学", 2024)
        .with_field("teaching_current_area", json!(1000.25))
        .with_field("teaching_preliminary_area", json!(50))
        .with_field("teaching_required_area", json!(2000))
        .with_field("dormitory_current_area", json!(300.1))
        .with_field("dormitory_required_area", json!(250.2))
        .with_field("logistics_required_area", json!(80.35));
    let record = reconcile_raw(&raw);

    assert_eq!(record.teaching.gap, round2(2000.0 - 1050.25));
    assert_eq!(record.dormitory.gap, round2(250.2 - 300.1));
    assert_eq!(
        record.gap_without_subsidy,
        round2(record.building.required - record.building.total)
    );
    assert_eq!(record.gap_with_subsidy, record.gap_without_subsidy);
    assert_invariants(&record);
}

#[test]
fn test_building_gap_uses_explicit_building_required() {
    let raw = RawSubmission::new("示范大学", 2024)
        .with_field("teaching_current_area", json!(100))
        .with_field("teaching_gap", json!(7))
        .with_field("total_required_area", json!(500));
    let record = reconcile_raw(&raw);

    assert_eq!(record.building.required, 500.0);
    assert_eq!(record.teaching.gap, 7.0);
    assert_eq!(record.building.gap, 400.0);
    assert_eq!(record.gap_without_subsidy, 400.0);
}

#[test]
fn test_building_gap_falls_back_to_category_gap_sum() {
    let raw = RawSubmission::new("示范大学", 2024)
        .with_field("teaching_current_area", json!(100))
        .with_field("teaching_gap", json!(7))
        .with_field("office_gap_area", json!(3.5));
    let record = reconcile_raw(&raw);

    assert_eq!(record.building.gap, 10.5);
    assert_eq!(record.gap_without_subsidy, 10.5);
}

#[test]
fn test_living_gap_fallback_and_override() {
    let raw = RawSubmission::new("示范大学", 2024)
        .with_field("dormitory_gap", json!(12.5))
        .with_field("other_living_gap", json!(7.25));
    assert_eq!(reconcile_raw(&raw).total_living.gap, 19.75);

    let raw = raw.with_field("living_gap", json!(1));
    assert_eq!(reconcile_raw(&raw).total_living.gap, 1.0);
}

#[test]
fn test_building_gap_canonical_key_and_aliases() {
    let raw = RawSubmission::new("示范大学", 2024).with_field("total_area_gap", json!(88));
    assert_eq!(reconcile_raw(&raw).building.gap, 88.0);

    let raw = raw.with_field("building_area_gap", json!(66));
    assert_eq!(reconcile_raw(&raw).building.gap, 66.0);
}

// ==========================================
// 特殊补助与汇总缺口
// ==========================================

#[test]
fn test_special_subsidy_from_calculator() {
    let requirement = sample_requirement();
    let raw = RawSubmission::new("示范理工大学", 2024).with_field("special_subsidy_total", json!(1));
    let mut cohort = StudentCohort::default();

    let record = FieldReconciler::new().reconcile(
        &ReconcileInput::new(&raw).with_requirement(&requirement),
        &mut cohort,
    );
    assert_eq!(record.special_subsidy_total, 800.0);
    assert_eq!(record.special_subsidy_count, 2);
    assert_eq!(record.special_subsidies.len(), 2);
    assert_eq!(record.gap_without_subsidy, 5400.0);
    assert_eq!(record.gap_with_subsidy, 6200.0);
    assert_eq!(record.school_type, "理工院校");
}

#[test]
fn test_calculator_gaps_include_planned_area() {
    let requirement = sample_requirement();
    let raw = RawSubmission::new("示范理工大学", 2024)
        .with_field("teaching_preliminary_area", json!(1234.5))
        .with_field("dormitory_under_construction_area", json!(321.05));
    let mut cohort = StudentCohort::default();

    let record = FieldReconciler::new().reconcile(
        &ReconcileInput::new(&raw).with_requirement(&requirement),
        &mut cohort,
    );

    assert_eq!(record.teaching.total, 11234.5);
    assert_eq!(record.teaching.gap, 2765.5);
    assert_eq!(record.dormitory.gap, 178.95);
    assert_eq!(record.building.required, 26500.0);
    assert_eq!(record.building.total, 22655.55);
    assert_eq!(record.building.gap, 3844.45);
    // 测算器按现有面积给出的缺口不进入记录
    assert_ne!(record.gap_without_subsidy, requirement.total_gap_before_subsidy);
    assert_eq!(record.gap_without_subsidy, 3844.45);
    assert_eq!(record.gap_with_subsidy, 4644.45);
    assert_invariants(&record);
}

#[test]
fn test_gap_with_subsidy_defaults_to_sum() {
    let raw = RawSubmission::new("示范大学", 2024)
        .with_field("gap_without_subsidy", json!("1,000"))
        .with_field("special_subsidy_area", json!(250.125));
    let record = reconcile_raw(&raw);

    assert_eq!(record.special_subsidy_total, 250.13);
    assert_eq!(record.gap_without_subsidy, 1000.0);
    assert_eq!(record.gap_with_subsidy, 1250.13);

    let raw = raw.with_field("含特殊补助缺口", json!(5));
    assert_eq!(reconcile_raw(&raw).gap_with_subsidy, 5.0);
}

#[test]
fn test_special_subsidy_total_from_raw_items() {
    let raw = RawSubmission::new("示范大学", 2024).with_field(
        "special_subsidies",
        json!([{"name": "A", "area": "500"}, {"name": "B", "area": -3}, {"name": "C", "area": 300}]),
    );
    let record = reconcile_raw(&raw);
    assert_eq!(record.special_subsidy_total, 800.0);
    assert_eq!(record.special_subsidy_count, 3);
    assert_eq!(record.special_subsidies[1].area, 0.0);
}

// ==========================================
// 学生规模
// ==========================================

#[test]
fn test_cohort_totals_recomputed_and_written_back() {
    let raw = messy_submission();
    let mut cohort = StudentCohort {
        international_doctor: 4.0,
        total_students: 999999.0,
        ..Default::default()
    };

    let record = FieldReconciler::new().reconcile(&ReconcileInput::new(&raw), &mut cohort);

    assert_eq!(cohort.full_time_undergraduate, 8000.0);
    assert_eq!(cohort.full_time_doctor, 120.0);
    assert_eq!(cohort.international_master, 0.0);
    // 调用方人数作为最后一级回退
    assert_eq!(cohort.international_doctor, 4.0);
    assert_eq!(cohort.full_time_total, 8120.0);
    assert_eq!(cohort.international_total, 4.0);
    assert_eq!(cohort.total_students, 8124.0);
    assert_eq!(record.cohort, cohort);
}

// ==========================================
// 历史记录来源
// ==========================================

#[test]
fn test_stored_record_supplies_leaves_not_derived_values() {
    let mut previous = reconcile_raw(&messy_submission());
    previous.school_type = "理工院校".to_string();
    previous.building.gap = 123456.0;
    previous.gap_without_subsidy = 123456.0;
    previous.total_living.required = 99999.0;

    let overrides =
        RawSubmission::new("", 0).with_field("teaching_current_area", json!(20000));
    let mut cohort = StudentCohort::default();
    let record = FieldReconciler::new().reconcile(
        &ReconcileInput::new(&overrides).with_previous(&previous),
        &mut cohort,
    );

    assert_eq!(record.school_name, "示范理工大学");
    assert_eq!(record.year, 2024);
    assert_eq!(record.school_type, "理工院校");
    assert_eq!(record.teaching.current, 20000.0);
    assert_eq!(record.office.current, previous.office.current);
    assert_eq!(record.cohort.full_time_undergraduate, 8000.0);
    assert_ne!(record.building.gap, 123456.0);
    assert_ne!(record.gap_without_subsidy, 123456.0);
    assert_eq!(
        record.total_living.required,
        round2(record.dormitory.required + record.other_living.required)
    );
    assert_invariants(&record);
}

// ==========================================
// 幂等性
// ==========================================

#[test]
fn test_reconcile_is_idempotent_for_raw_input() {
    let reconciler = FieldReconciler::new();
    let once = reconcile_raw(&messy_submission());
    let twice = reconciler.normalize(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_reconcile_is_idempotent_with_calculator_output() {
    let requirement = sample_requirement();
    let raw = RawSubmission::new("示范理工大学", 2024)
        .with_field("teaching_preliminary_area", json!(1234.5))
        .with_field("dormitory_under_construction_area", json!(321.05));
    let mut cohort = StudentCohort::default();

    let reconciler = FieldReconciler::new();
    let once = reconciler.reconcile(
        &ReconcileInput::new(&raw).with_requirement(&requirement),
        &mut cohort,
    );
    assert_invariants(&once);

    let twice = reconciler.normalize(&once);
    assert_eq!(once, twice);
    assert_eq!(reconciler.normalize(&twice), twice);
}

#[test]
fn test_first_present_skips_missing_sources() {
    let empty = RawSubmission::new("示范大学", 2024);
    let filled = RawSubmission::new("示范大学", 2024).with_field("teaching_area", json!(5));
    let sources = [
        FieldSource::RawSubmission(&empty),
        FieldSource::RawSubmission(&filled),
    ];
    let field = crate::domain::fields::Field::Area(RecordCategory::Teaching, Stage::Current);
    assert_eq!(first_present(&sources, field), Some(5.0));
    assert_eq!(first_present(&sources[..1], field), None);
}
