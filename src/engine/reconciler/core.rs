// ==========================================
// 字段归一化 - 核心流程
// ==========================================

use super::source::{first_present, FieldSource};
use crate::domain::area::{AreaRecord, SpecialSubsidyItem};
use crate::domain::cohort::StudentCohort;
use crate::domain::fields::Field;
use crate::domain::numeric::round2;
use crate::domain::requirement::Requirement;
use crate::domain::submission::RawSubmission;
use crate::domain::types::{RecordCategory, Stage, StudentGroup};
use tracing::instrument;

/// 参与求和的五个基本类别
const ROOM_CATEGORIES: [RecordCategory; 5] = [
    RecordCategory::Teaching,
    RecordCategory::Office,
    RecordCategory::Dormitory,
    RecordCategory::OtherLiving,
    RecordCategory::Logistics,
];

/// 校舍合计 = 教学 + 办公 + 生活用房合计 + 后勤
const BUILDING_PARTS: [RecordCategory; 4] = [
    RecordCategory::Teaching,
    RecordCategory::Office,
    RecordCategory::TotalLiving,
    RecordCategory::Logistics,
];

/// 阶段合计的组成阶段（规划 / 合计 / 应有 / 缺口另行处理）
const SUMMED_STAGES: [Stage; 4] = [
    Stage::Current,
    Stage::Preliminary,
    Stage::UnderConstruction,
    Stage::Planned,
];

/// 归一化输入
///
/// 取值优先级: 测算器输出 → 原始填报 → 历史记录
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub submission: &'a RawSubmission,
    pub requirement: Option<&'a Requirement>,
    pub previous: Option<&'a AreaRecord>,
}

impl<'a> ReconcileInput<'a> {
    pub fn new(submission: &'a RawSubmission) -> Self {
        Self {
            submission,
            requirement: None,
            previous: None,
        }
    }

    pub fn with_requirement(mut self, requirement: &'a Requirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    pub fn with_previous(mut self, previous: &'a AreaRecord) -> Self {
        self.previous = Some(previous);
        self
    }

    fn sources(&self) -> Vec<FieldSource<'a>> {
        let mut sources = Vec::with_capacity(3);
        if let Some(requirement) = self.requirement {
            sources.push(FieldSource::CalculatorOutput(requirement));
        }
        sources.push(FieldSource::RawSubmission(self.submission));
        if let Some(previous) = self.previous {
            sources.push(FieldSource::StoredRecord(previous));
        }
        sources
    }
}

// ==========================================
// FieldReconciler - 宽记录归一化
// ==========================================
// 纯函数,无 I/O;从不失败,缺失数据按 0 处理
// 所有派生字段总是由已取整的分项重新计算,因此结果幂等
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldReconciler;

impl FieldReconciler {
    pub fn new() -> Self {
        Self
    }

    /// 合并各来源并重算全部派生字段
    ///
    /// `cohort` 作为最后一级人数回退来源,并被原地写回规范化后的人数与合计
    #[instrument(skip_all, fields(
        school_name = %input.submission.school_name,
        has_requirement = input.requirement.is_some(),
        has_previous = input.previous.is_some()
    ))]
    pub fn reconcile(&self, input: &ReconcileInput<'_>, cohort: &mut StudentCohort) -> AreaRecord {
        let sources = input.sources();
        let mut record = Self::identity(input);

        // 1-2. 填报类叶子字段: 容错取值 + 两位小数
        Self::resolve_reported(&sources, &mut record);

        // 3-6. 阶段与类别合计
        Self::recompute_planned(&mut record);
        Self::recompute_total_living(&mut record);
        Self::recompute_building(&mut record);
        Self::recompute_totals(&mut record);

        // 7-9. 应有面积与缺口
        let building_required_explicit = Self::resolve_required(&sources, &mut record);
        Self::resolve_gaps(&sources, &mut record, building_required_explicit);

        // 10. 特殊补助
        Self::resolve_special_subsidy(input, &sources, &mut record);

        // 11. 汇总缺口
        Self::resolve_gap_aggregates(&sources, &mut record);

        // 12. 学生规模
        Self::resolve_cohort(&sources, cohort);
        record.cohort = cohort.clone();

        record
    }

    /// 对已有记录重新归一化（读取历史记录时使用）
    pub fn normalize(&self, record: &AreaRecord) -> AreaRecord {
        let submission = record.to_submission();
        let mut cohort = record.cohort.clone();
        self.reconcile(&ReconcileInput::new(&submission), &mut cohort)
    }

    // ==========================================
    // 步骤实现
    // ==========================================

    fn identity(input: &ReconcileInput<'_>) -> AreaRecord {
        let raw = input.submission;
        let previous = input.previous;

        let school_name = match raw.school_name.trim() {
            "" => previous.map(|p| p.school_name.clone()).unwrap_or_default(),
            name => name.to_string(),
        };
        let year = match (raw.year, previous) {
            (0, Some(p)) => p.year,
            (year, _) => year,
        };
        let school_type = input
            .requirement
            .map(|r| r.school_type.clone())
            .or_else(|| raw.text("school_type").map(str::to_string))
            .or_else(|| previous.map(|p| p.school_type.clone()))
            .unwrap_or_default();

        AreaRecord {
            school_name,
            year,
            school_type,
            ..Default::default()
        }
    }

    fn resolve_reported(sources: &[FieldSource<'_>], record: &mut AreaRecord) {
        for stage in Stage::REPORTED {
            for category in ROOM_CATEGORIES {
                let value = first_present(sources, Field::Area(category, stage))
                    .or_else(|| Self::other_living_from_total(sources, category, stage))
                    .unwrap_or(0.0);
                record.areas_mut(category).set(stage, round2(value));
            }
        }
    }

    /// 只填了生活用房合计时,其他生活用房 = max(0, 合计 - 宿舍)
    fn other_living_from_total(
        sources: &[FieldSource<'_>],
        category: RecordCategory,
        stage: Stage,
    ) -> Option<f64> {
        if category != RecordCategory::OtherLiving {
            return None;
        }
        let total_living = first_present(sources, Field::Area(RecordCategory::TotalLiving, stage))?;
        let dormitory =
            first_present(sources, Field::Area(RecordCategory::Dormitory, stage)).unwrap_or(0.0);
        Some((round2(total_living) - round2(dormitory)).max(0.0))
    }

    fn recompute_planned(record: &mut AreaRecord) {
        for category in ROOM_CATEGORIES {
            let areas = record.areas_mut(category);
            areas.planned = round2(areas.preliminary + areas.under_construction);
        }
    }

    fn recompute_total_living(record: &mut AreaRecord) {
        for stage in SUMMED_STAGES {
            let value = round2(record.dormitory.get(stage) + record.other_living.get(stage));
            record.total_living.set(stage, value);
        }
    }

    fn recompute_building(record: &mut AreaRecord) {
        for stage in SUMMED_STAGES {
            let value: f64 = BUILDING_PARTS
                .iter()
                .map(|category| record.areas(*category).get(stage))
                .sum();
            record.building.set(stage, round2(value));
        }
    }

    fn recompute_totals(record: &mut AreaRecord) {
        for category in RecordCategory::ALL {
            let areas = record.areas_mut(category);
            areas.total = round2(areas.current + areas.planned);
        }
    }

    /// 返回校舍合计应有面积是否来自显式取值
    fn resolve_required(sources: &[FieldSource<'_>], record: &mut AreaRecord) -> bool {
        for category in ROOM_CATEGORIES {
            let value = first_present(sources, Field::Area(category, Stage::Required)).unwrap_or(0.0);
            record.areas_mut(category).required = round2(value);
        }

        record.total_living.required =
            match first_present(sources, Field::Area(RecordCategory::TotalLiving, Stage::Required)) {
                Some(value) => round2(value),
                None => round2(record.dormitory.required + record.other_living.required),
            };

        match first_present(sources, Field::Area(RecordCategory::Building, Stage::Required)) {
            Some(value) => {
                record.building.required = round2(value);
                true
            }
            None => {
                let sum: f64 = ROOM_CATEGORIES
                    .iter()
                    .map(|category| record.areas(*category).required)
                    .sum();
                record.building.required = round2(sum);
                false
            }
        }
    }

    fn resolve_gaps(
        sources: &[FieldSource<'_>],
        record: &mut AreaRecord,
        building_required_explicit: bool,
    ) {
        for category in ROOM_CATEGORIES {
            let areas = record.areas(category);
            let derived = areas.required - areas.total;
            let value = first_present(sources, Field::Area(category, Stage::Gap)).unwrap_or(derived);
            record.areas_mut(category).gap = round2(value);
        }

        record.total_living.gap =
            match first_present(sources, Field::Area(RecordCategory::TotalLiving, Stage::Gap)) {
                Some(value) => round2(value),
                None => round2(record.dormitory.gap + record.other_living.gap),
            };

        record.building.gap =
            match first_present(sources, Field::Area(RecordCategory::Building, Stage::Gap)) {
                Some(value) => round2(value),
                None if building_required_explicit => {
                    round2(record.building.required - record.building.total)
                }
                None => {
                    let sum: f64 = ROOM_CATEGORIES
                        .iter()
                        .map(|category| record.areas(*category).gap)
                        .sum();
                    round2(sum)
                }
            };
    }

    fn resolve_special_subsidy(
        input: &ReconcileInput<'_>,
        sources: &[FieldSource<'_>],
        record: &mut AreaRecord,
    ) {
        let items: Vec<SpecialSubsidyItem> = match input.requirement {
            Some(requirement) => requirement.special_subsidies.clone(),
            None => Self::raw_subsidy_items(input.submission)
                .or_else(|| input.previous.map(|p| p.special_subsidies.clone()))
                .unwrap_or_default(),
        };
        record.special_subsidies = items.iter().map(SpecialSubsidyItem::sanitized).collect();

        let total = first_present(sources, Field::SpecialSubsidyTotal)
            .unwrap_or_else(|| record.special_subsidies.iter().map(|s| s.area).sum());
        record.special_subsidy_total = round2(total.max(0.0));

        record.special_subsidy_count = match first_present(sources, Field::SpecialSubsidyCount) {
            Some(count) if count > 0.0 => count.round() as u32,
            Some(_) => 0,
            None => record.special_subsidies.len() as u32,
        };
    }

    fn raw_subsidy_items(raw: &RawSubmission) -> Option<Vec<SpecialSubsidyItem>> {
        let value = raw.fields.get("special_subsidies")?;
        match serde_json::from_value(value.clone()) {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::debug!(error = %e, "特殊补助明细格式不正确,已忽略");
                None
            }
        }
    }

    fn resolve_gap_aggregates(sources: &[FieldSource<'_>], record: &mut AreaRecord) {
        let without = first_present(sources, Field::GapWithoutSubsidy).unwrap_or(record.building.gap);
        record.gap_without_subsidy = round2(without);

        let with = first_present(sources, Field::GapWithSubsidy)
            .unwrap_or(record.gap_without_subsidy + record.special_subsidy_total);
        record.gap_with_subsidy = round2(with);
    }

    fn resolve_cohort(sources: &[FieldSource<'_>], cohort: &mut StudentCohort) {
        for group in StudentGroup::ALL {
            let value = first_present(sources, Field::Students(group)).unwrap_or(cohort.count(group));
            let value = if value.is_finite() { value } else { 0.0 };
            cohort.set_count(group, round2(value));
        }
        cohort.recompute_totals();
    }
}

