// ==========================================
// 高校校舍面积缺口测算系统 - 测算结果
// ==========================================
// Requirement: AreaGapCalculator 的结构化输出
// CalculationFailure: 测算器唯一的失败类型（带标签,不抛出）
// ==========================================

use crate::domain::area::SpecialSubsidyItem;
use crate::domain::cohort::StudentCohort;
use crate::domain::fields::Field;
use crate::domain::types::{RecordCategory, RoomCategory, Stage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 单个用房类别的测算结果（均已保留两位小数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRequirement {
    pub category: RoomCategory,
    /// 基础生均面积标准 (m²/生)
    pub base_rate: f64,
    /// 基础应有面积 = 基础标准 × 学生总数
    pub basic_required: f64,
    /// 补助面积 = Σ 层次补助标准 × 层次人数
    pub subsidized_required: f64,
    /// 应有面积合计
    pub total_required: f64,
    /// 现有面积（其他生活用房为派生值）
    pub current_area: f64,
    /// 缺口 = 应有 - 现有（正数为不足）
    pub gap: f64,
}

/// 测算结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub school_name: String,
    pub year: i32,
    /// 解析后的学校类型
    pub school_type: String,
    /// 规范化后的学生规模（含重算合计）
    pub cohort: StudentCohort,
    /// 五类用房测算明细（按 RoomCategory::ALL 顺序）
    pub categories: Vec<CategoryRequirement>,

    // ===== 汇总 =====
    pub total_required: f64,
    pub total_current: f64,
    /// 不含特殊补助的总缺口 = Σ 应有 - Σ 现有
    pub total_gap_before_subsidy: f64,
    pub special_subsidy_total: f64,
    /// 含特殊补助的总缺口 = 不含补助缺口 + 特殊补助合计
    pub total_gap_with_subsidy: f64,

    // ===== 特殊补助明细 =====
    pub special_subsidies: Vec<SpecialSubsidyItem>,
    pub special_subsidy_count: u32,
}

impl Requirement {
    pub fn category(&self, category: RoomCategory) -> Option<&CategoryRequirement> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// 测算器对语义字段给出的值（不覆盖的字段返回 None）
    ///
    /// 缺口不在此给出: 记录中的缺口一律由归并后的 需求 − 合计 推出,
    /// 合计含前期与在建面积
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Area(category, stage) => match (category.room(), stage) {
                (Some(room), Stage::Current) => self.category(room).map(|c| c.current_area),
                (Some(room), Stage::Required) => self.category(room).map(|c| c.total_required),
                (None, Stage::Required) if category == RecordCategory::Building => {
                    Some(self.total_required)
                }
                _ => None,
            },
            Field::Students(group) => Some(self.cohort.count(group)),
            Field::SpecialSubsidyTotal => Some(self.special_subsidy_total),
            Field::SpecialSubsidyCount => Some(self.special_subsidy_count as f64),
            Field::GapWithoutSubsidy
            | Field::GapWithSubsidy
            | Field::FullTimeTotal
            | Field::InternationalTotal
            | Field::TotalStudents => None,
        }
    }
}

/// 测算失败（测算器唯一的内部失败模式）
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CalculationFailure {
    #[error("未找到面积标准: school_type={school_type}")]
    StandardsNotFound { school_type: String },
}
