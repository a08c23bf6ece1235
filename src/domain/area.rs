// ==========================================
// 高校校舍面积缺口测算系统 - 面积记录领域模型
// ==========================================
// AreaRecord: 归一化后的宽记录,持久化的唯一形态
// 不变式（由 FieldReconciler 保证）:
// - Planned = Preliminary + UnderConstruction
// - Total = Current + Planned
// - TotalLiving = Dormitory + OtherLiving (逐阶段)
// - Building = Teaching + Office + TotalLiving + Logistics (逐阶段)
// - gap_with_subsidy = gap_without_subsidy + special_subsidy_total (无显式覆写时)
// ==========================================

use crate::domain::cohort::StudentCohort;
use crate::domain::fields::Field;
use crate::domain::numeric::{lenient_f64, round2};
use crate::domain::submission::RawSubmission;
use crate::domain::types::{RecordCategory, Stage, StudentGroup};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// ==========================================
// StageAreas - 单个类别的各阶段面积
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StageAreas {
    pub current: f64,
    pub preliminary: f64,
    pub under_construction: f64,
    pub planned: f64,
    pub total: f64,
    pub required: f64,
    pub gap: f64,
}

impl StageAreas {
    pub fn get(&self, stage: Stage) -> f64 {
        match stage {
            Stage::Current => self.current,
            Stage::Preliminary => self.preliminary,
            Stage::UnderConstruction => self.under_construction,
            Stage::Planned => self.planned,
            Stage::Total => self.total,
            Stage::Required => self.required,
            Stage::Gap => self.gap,
        }
    }

    pub fn set(&mut self, stage: Stage, value: f64) {
        let slot = match stage {
            Stage::Current => &mut self.current,
            Stage::Preliminary => &mut self.preliminary,
            Stage::UnderConstruction => &mut self.under_construction,
            Stage::Planned => &mut self.planned,
            Stage::Total => &mut self.total,
            Stage::Required => &mut self.required,
            Stage::Gap => &mut self.gap,
        };
        *slot = value;
    }
}

// ==========================================
// SpecialSubsidyItem - 特殊补助
// ==========================================
// 面积 ≥ 0;容错反序列化（数值 / 数值字符串 / 空值）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialSubsidyItem {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub area: f64,
}

impl SpecialSubsidyItem {
    pub fn new(name: impl Into<String>, area: f64) -> Self {
        Self {
            name: name.into(),
            area,
        }
    }

    /// 名称去空白,面积负值 / 非有限值置 0 并保留两位小数
    pub fn sanitized(&self) -> Self {
        let area = if self.area.is_finite() && self.area > 0.0 {
            round2(self.area)
        } else {
            0.0
        };
        Self {
            name: self.name.trim().to_string(),
            area,
        }
    }
}

// ==========================================
// CurrentAreas - 测算输入的现有面积
// ==========================================
// 其他生活用房不直接取填报值,由测算器按 max(0, 生活用房 - 宿舍) 派生
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentAreas {
    pub teaching: f64,
    pub office: f64,
    pub total_living: f64,
    pub dormitory: f64,
    pub logistics: f64,
}

impl CurrentAreas {
    /// 从原始填报容错解析
    ///
    /// 生活用房合计缺失时,用 宿舍 + 其他生活用房 回填（新版填报表只报分项）
    pub fn from_submission(raw: &RawSubmission) -> Self {
        let current = |category: RecordCategory| raw.number(Field::Area(category, Stage::Current));

        let dormitory = current(RecordCategory::Dormitory).unwrap_or(0.0);
        let total_living = current(RecordCategory::TotalLiving)
            .or_else(|| current(RecordCategory::OtherLiving).map(|other| dormitory + other))
            .unwrap_or(0.0);

        Self {
            teaching: round2(current(RecordCategory::Teaching).unwrap_or(0.0)),
            office: round2(current(RecordCategory::Office).unwrap_or(0.0)),
            total_living: round2(total_living),
            dormitory: round2(dormitory),
            logistics: round2(current(RecordCategory::Logistics).unwrap_or(0.0)),
        }
    }
}

// ==========================================
// AreaRecord - 归一化宽记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    // ===== 标识 =====
    pub school_name: String,
    pub year: i32,
    pub school_type: String,

    // ===== 类别 × 阶段 =====
    pub teaching: StageAreas,
    pub office: StageAreas,
    pub dormitory: StageAreas,
    pub other_living: StageAreas,
    pub logistics: StageAreas,
    pub total_living: StageAreas,
    pub building: StageAreas,

    // ===== 缺口汇总 =====
    pub gap_without_subsidy: f64,
    pub gap_with_subsidy: f64,

    // ===== 特殊补助 =====
    #[serde(default)]
    pub special_subsidies: Vec<SpecialSubsidyItem>,
    pub special_subsidy_total: f64,
    pub special_subsidy_count: u32,

    // ===== 学生规模 =====
    pub cohort: StudentCohort,
}

impl AreaRecord {
    pub fn areas(&self, category: RecordCategory) -> &StageAreas {
        match category {
            RecordCategory::Teaching => &self.teaching,
            RecordCategory::Office => &self.office,
            RecordCategory::Dormitory => &self.dormitory,
            RecordCategory::OtherLiving => &self.other_living,
            RecordCategory::Logistics => &self.logistics,
            RecordCategory::TotalLiving => &self.total_living,
            RecordCategory::Building => &self.building,
        }
    }

    pub fn areas_mut(&mut self, category: RecordCategory) -> &mut StageAreas {
        match category {
            RecordCategory::Teaching => &mut self.teaching,
            RecordCategory::Office => &mut self.office,
            RecordCategory::Dormitory => &mut self.dormitory,
            RecordCategory::OtherLiving => &mut self.other_living,
            RecordCategory::Logistics => &mut self.logistics,
            RecordCategory::TotalLiving => &mut self.total_living,
            RecordCategory::Building => &mut self.building,
        }
    }

    /// 按语义字段取值
    pub fn value(&self, field: Field) -> f64 {
        match field {
            Field::Area(category, stage) => self.areas(category).get(stage),
            Field::GapWithoutSubsidy => self.gap_without_subsidy,
            Field::GapWithSubsidy => self.gap_with_subsidy,
            Field::SpecialSubsidyTotal => self.special_subsidy_total,
            Field::SpecialSubsidyCount => self.special_subsidy_count as f64,
            other => self.cohort.total(other).unwrap_or(0.0),
        }
    }

    /// 展开为规范字段名的宽表（导出 / 存储 / 回灌归一化）
    pub fn to_wide(&self) -> Map<String, Value> {
        let mut wide = Map::new();
        wide.insert("school_name".to_string(), json!(self.school_name));
        wide.insert("year".to_string(), json!(self.year));
        wide.insert("school_type".to_string(), json!(self.school_type));

        for field in Field::all() {
            let value = match field {
                Field::SpecialSubsidyCount => json!(self.special_subsidy_count),
                other => json!(self.value(other)),
            };
            wide.insert(field.canonical_key(), value);
        }

        wide.insert(
            "special_subsidies".to_string(),
            json!(self.special_subsidies),
        );
        wide
    }

    /// 以规范宽表作为原始填报（用于再次归一化）
    pub fn to_submission(&self) -> RawSubmission {
        RawSubmission {
            school_name: self.school_name.clone(),
            year: self.year,
            fields: self.to_wide(),
        }
    }

    /// 只含填报类字段的原始填报（五类用房的现有 / 前期 / 在建面积 + 七类人数）
    ///
    /// 用于基于历史记录重新测算: 派生值不带入,由测算与归一化重新得出
    pub fn to_reported_submission(&self) -> RawSubmission {
        let mut fields = Map::new();
        for category in RecordCategory::ALL {
            if category.room().is_none() {
                continue;
            }
            for stage in Stage::REPORTED {
                let field = Field::Area(category, stage);
                fields.insert(field.canonical_key(), json!(self.value(field)));
            }
        }
        for group in StudentGroup::ALL {
            let field = Field::Students(group);
            fields.insert(field.canonical_key(), json!(self.value(field)));
        }
        if !self.school_type.is_empty() {
            fields.insert("school_type".to_string(), json!(self.school_type));
        }

        RawSubmission {
            school_name: self.school_name.clone(),
            year: self.year,
            fields,
        }
    }
}
