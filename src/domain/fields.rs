// ==========================================
// 高校校舍面积缺口测算系统 - 宽记录字段目录
// ==========================================
// 职责: 语义字段 → 可接受的来源字段名 (有序)
// - 第一个为规范字段名,其后为历史别名
// - 历史别名集中声明在本表,不在业务代码中散落
// ==========================================

use crate::domain::types::{RecordCategory, Stage, StudentGroup};
use std::collections::HashMap;
use std::sync::OnceLock;

/// 宽记录语义字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// 类别 × 阶段 面积单元格
    Area(RecordCategory, Stage),
    /// 七类学生人数
    Students(StudentGroup),
    /// 全日制合计（只写）
    FullTimeTotal,
    /// 留学生合计（只写）
    InternationalTotal,
    /// 学生总数（只写）
    TotalStudents,
    GapWithoutSubsidy,
    GapWithSubsidy,
    SpecialSubsidyTotal,
    SpecialSubsidyCount,
}

impl Field {
    /// 全部语义字段（宽记录输出顺序）
    pub fn all() -> Vec<Field> {
        let mut fields = Vec::with_capacity(64);
        for category in RecordCategory::ALL {
            for stage in Stage::ALL {
                fields.push(Field::Area(category, stage));
            }
        }
        fields.extend([
            Field::GapWithoutSubsidy,
            Field::GapWithSubsidy,
            Field::SpecialSubsidyTotal,
            Field::SpecialSubsidyCount,
        ]);
        fields.extend(StudentGroup::ALL.into_iter().map(Field::Students));
        fields.extend([
            Field::FullTimeTotal,
            Field::InternationalTotal,
            Field::TotalStudents,
        ]);
        fields
    }

    /// 规范字段名
    pub fn canonical_key(&self) -> String {
        match self {
            Field::Area(RecordCategory::Building, Stage::Gap) => "building_area_gap".to_string(),
            Field::Area(category, stage) => format!("{}_{}", category.key(), stage.key()),
            Field::Students(group) => group.key().to_string(),
            Field::FullTimeTotal => "full_time_total".to_string(),
            Field::InternationalTotal => "international_total".to_string(),
            Field::TotalStudents => "total_students".to_string(),
            Field::GapWithoutSubsidy => "gap_without_subsidy".to_string(),
            Field::GapWithSubsidy => "gap_with_subsidy".to_string(),
            Field::SpecialSubsidyTotal => "special_subsidy_total".to_string(),
            Field::SpecialSubsidyCount => "special_subsidy_count".to_string(),
        }
    }

    /// 是否只写字段（派生合计,从不信任输入）
    pub fn is_write_only(&self) -> bool {
        matches!(
            self,
            Field::FullTimeTotal | Field::InternationalTotal | Field::TotalStudents
        )
    }

    /// 可接受的来源字段名（规范名在前,历史别名按优先级在后）
    pub fn accepted_keys(&self) -> &'static [String] {
        alias_table()
            .get(self)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// ==========================================
// 历史别名
// ==========================================

/// 按阶段的历史命名模式,`{cat}` 替换为类别前缀
const STAGE_LEGACY_PATTERNS: &[(Stage, &[&str])] = &[
    (Stage::Current, &["{cat}_area", "current_{cat}_area"]),
    (Stage::Preliminary, &["{cat}_preliminary", "preliminary_{cat}_area"]),
    (
        Stage::UnderConstruction,
        &["{cat}_under_construction", "under_construction_{cat}_area"],
    ),
    (Stage::Planned, &["{cat}_planned", "planned_{cat}_area"]),
    (Stage::Total, &["{cat}_total", "total_{cat}_area"]),
    (
        Stage::Required,
        &["required_{cat}_area", "{cat}_area_required", "{cat}_required"],
    ),
    (Stage::Gap, &["{cat}_gap", "{cat}_area_gap", "{cat}_gap_area"]),
];

/// 逐字段的额外别名（旧接口字段名 / 填报表中文表头）
const EXTRA_ALIASES: &[(Field, &[&str])] = &[
    (
        Field::Area(RecordCategory::Teaching, Stage::Current),
        &["教学及辅助用房现有面积"],
    ),
    (
        Field::Area(RecordCategory::Office, Stage::Current),
        &["行政办公用房现有面积"],
    ),
    (
        Field::Area(RecordCategory::Dormitory, Stage::Current),
        &["学生宿舍现有面积"],
    ),
    (
        Field::Area(RecordCategory::OtherLiving, Stage::Current),
        &["其他生活用房现有面积"],
    ),
    (
        Field::Area(RecordCategory::TotalLiving, Stage::Current),
        &["living_area", "current_living_area", "生活用房现有面积"],
    ),
    (
        Field::Area(RecordCategory::Logistics, Stage::Current),
        &["后勤辅助用房现有面积"],
    ),
    (
        Field::Area(RecordCategory::TotalLiving, Stage::Gap),
        &["living_gap", "living_area_gap"],
    ),
    (
        Field::Area(RecordCategory::Building, Stage::Gap),
        &["total_area_gap"],
    ),
    (
        Field::Area(RecordCategory::Building, Stage::Required),
        &["total_required_area", "required_total_area"],
    ),
    (
        Field::GapWithoutSubsidy,
        &[
            "total_gap_without_subsidy",
            "total_gap_before_subsidy",
            "area_gap_before_subsidy",
            "不含特殊补助缺口",
        ],
    ),
    (
        Field::GapWithSubsidy,
        &[
            "total_gap_with_subsidy",
            "area_gap_after_subsidy",
            "含特殊补助缺口",
        ],
    ),
    (
        Field::SpecialSubsidyTotal,
        &[
            "special_subsidy_area",
            "special_subsidy_total_area",
            "特殊补助面积",
        ],
    ),
    (Field::SpecialSubsidyCount, &["special_subsidy_items"]),
    (
        Field::Students(StudentGroup::FullTimeSpecialist),
        &["specialist_count", "全日制专科生人数"],
    ),
    (
        Field::Students(StudentGroup::FullTimeUndergraduate),
        &["undergraduate_count", "全日制本科生人数"],
    ),
    (
        Field::Students(StudentGroup::FullTimeMaster),
        &["master_count", "全日制硕士生人数"],
    ),
    (
        Field::Students(StudentGroup::FullTimeDoctor),
        &["doctor_count", "全日制博士生人数"],
    ),
    (
        Field::Students(StudentGroup::InternationalUndergraduate),
        &["intl_undergraduate_count", "留学生本科人数"],
    ),
    (
        Field::Students(StudentGroup::InternationalMaster),
        &["intl_master_count", "留学生硕士人数"],
    ),
    (
        Field::Students(StudentGroup::InternationalDoctor),
        &["intl_doctor_count", "留学生博士人数"],
    ),
];

fn alias_table() -> &'static HashMap<Field, Vec<String>> {
    static TABLE: OnceLock<HashMap<Field, Vec<String>>> = OnceLock::new();
    TABLE.get_or_init(build_alias_table)
}

fn build_alias_table() -> HashMap<Field, Vec<String>> {
    let mut table = HashMap::new();

    for field in Field::all() {
        let mut keys = vec![field.canonical_key()];

        if field.is_write_only() {
            table.insert(field, keys);
            continue;
        }

        if let Field::Area(category, stage) = field {
            let patterns = STAGE_LEGACY_PATTERNS
                .iter()
                .find(|(s, _)| *s == stage)
                .map(|(_, patterns)| *patterns)
                .unwrap_or(&[]);
            for pattern in patterns {
                push_unique(&mut keys, pattern.replace("{cat}", category.key()));
            }
        }

        for (aliased, aliases) in EXTRA_ALIASES {
            if *aliased == field {
                for alias in *aliases {
                    push_unique(&mut keys, (*alias).to_string());
                }
            }
        }

        table.insert(field, keys);
    }

    table
}

fn push_unique(keys: &mut Vec<String>, key: String) {
    if !keys.contains(&key) {
        keys.push(key);
    }
}
