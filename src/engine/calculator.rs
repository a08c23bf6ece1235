// ==========================================
// 高校校舍面积缺口测算系统 - 面积缺口测算器
// ==========================================
// 红线: 只有 StandardsNotFound 是测算失败;其余不规范输入一律按 0 处理
// 红线: 不按学生层次对基础标准加权,层次差异只体现在补助标准表
// ==========================================
// 输入: 学校名称 + 学生规模 + 现有面积 + 特殊补助
// 输出: Requirement（各类别应有面积 / 缺口 + 汇总）
// ==========================================

use crate::domain::area::{CurrentAreas, SpecialSubsidyItem};
use crate::domain::cohort::StudentCohort;
use crate::domain::numeric::round2;
use crate::domain::requirement::{CalculationFailure, CategoryRequirement, Requirement};
use crate::domain::standards::{BaseStandards, SubsidyStandards};
use crate::domain::types::{RoomCategory, StudentTier};
use crate::repository::school_registry_repo::SchoolTypeResolver;
use crate::repository::standards_repo::StandardsRepository;
use std::sync::{Arc, RwLock};
use tracing::instrument;

// ==========================================
// AreaGapCalculator - 面积缺口测算器
// ==========================================
pub struct AreaGapCalculator {
    standards: Arc<dyn StandardsRepository>,
    resolver: Arc<dyn SchoolTypeResolver>,
    // 补助公式求和的层次（配置驱动）
    tiers: RwLock<Vec<StudentTier>>,
}

impl AreaGapCalculator {
    /// 创建测算器（默认层次列表）
    pub fn new(
        standards: Arc<dyn StandardsRepository>,
        resolver: Arc<dyn SchoolTypeResolver>,
    ) -> Self {
        Self {
            standards,
            resolver,
            tiers: RwLock::new(StudentTier::DEFAULT_ORDER.to_vec()),
        }
    }

    /// 指定补助层次列表
    pub fn with_tiers(self, tiers: Vec<StudentTier>) -> Self {
        self.set_tiers(tiers);
        self
    }

    /// 替换补助层次列表（配置重载时调用）
    pub fn set_tiers(&self, tiers: Vec<StudentTier>) {
        match self.tiers.write() {
            Ok(mut guard) => *guard = tiers,
            Err(poisoned) => *poisoned.into_inner() = tiers,
        }
    }

    pub fn tiers(&self) -> Vec<StudentTier> {
        match self.tiers.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 测算应有面积与缺口
    ///
    /// # 返回
    /// - Ok(Requirement): 全部数值已保留两位小数
    /// - Err(CalculationFailure::StandardsNotFound): 学校类型缺少基础或补助标准
    #[instrument(skip(self, cohort, current, subsidies), fields(
        school_name = %school_name,
        year = year,
        subsidy_count = subsidies.len()
    ))]
    pub async fn compute(
        &self,
        school_name: &str,
        year: i32,
        cohort: &StudentCohort,
        current: &CurrentAreas,
        subsidies: &[SpecialSubsidyItem],
    ) -> Result<Requirement, CalculationFailure> {
        // 1. 学校类型（未知学校回退默认类型,从不失败）
        let school_type = self.resolver.resolve(school_name).await;

        // 2. 标准子集,任一缺失即失败
        let base = self.standards.base_standards(&school_type).await;
        let subsidy = self.standards.subsidy_standards(&school_type).await;
        let (Some(base), Some(subsidy)) = (base, subsidy) else {
            tracing::warn!(%school_type, "未找到面积标准");
            return Err(CalculationFailure::StandardsNotFound { school_type });
        };

        // 3. 学生规模规范化（合计为各层次简单求和）
        let mut cohort = cohort.clone();
        cohort.normalize();

        // 4-8. 逐类别测算
        let tiers = self.tiers();
        let categories: Vec<CategoryRequirement> = RoomCategory::ALL
            .into_iter()
            .map(|category| {
                self.compute_category(category, &base, &subsidy, &tiers, &cohort, current)
            })
            .collect();

        // 9. 汇总
        let total_required = round2(categories.iter().map(|c| c.total_required).sum());
        let total_current = round2(categories.iter().map(|c| c.current_area).sum());
        let total_gap_before_subsidy = round2(total_required - total_current);

        let special_subsidies: Vec<SpecialSubsidyItem> =
            subsidies.iter().map(SpecialSubsidyItem::sanitized).collect();
        let special_subsidy_total = round2(special_subsidies.iter().map(|s| s.area).sum());
        // 特殊补助扩大缺口（额外认定的需求,不抵扣缺口）
        let total_gap_with_subsidy = round2(total_gap_before_subsidy + special_subsidy_total);

        tracing::debug!(
            %school_type,
            total_students = cohort.total_students,
            total_required,
            total_gap_before_subsidy,
            "测算完成"
        );

        Ok(Requirement {
            school_name: school_name.to_string(),
            year,
            school_type,
            cohort,
            categories,
            total_required,
            total_current,
            total_gap_before_subsidy,
            special_subsidy_total,
            total_gap_with_subsidy,
            special_subsidy_count: special_subsidies.len() as u32,
            special_subsidies,
        })
    }

    /// 单个类别: 基础 + 补助 = 应有;缺口 = 应有 - 现有
    fn compute_category(
        &self,
        category: RoomCategory,
        base: &BaseStandards,
        subsidy: &SubsidyStandards,
        tiers: &[StudentTier],
        cohort: &StudentCohort,
        current: &CurrentAreas,
    ) -> CategoryRequirement {
        let base_rate = base.rate(category).unwrap_or(0.0);
        let basic_required = round2(base_rate * cohort.total_students);

        // InternationalAll 与留学生硕士/博士同时在列时会重复计入,口径由配置决定
        let subsidized_required = round2(
            tiers
                .iter()
                .map(|&tier| subsidy.rate(category, tier).unwrap_or(0.0) * cohort.tier_count(tier))
                .sum(),
        );

        let total_required = round2(basic_required + subsidized_required);
        let current_area = Self::current_area(category, current);

        CategoryRequirement {
            category,
            base_rate,
            basic_required,
            subsidized_required,
            total_required,
            current_area,
            gap: round2(total_required - current_area),
        }
    }

    /// 类别现有面积;其他生活用房 = max(0, 生活用房合计 - 宿舍)
    fn current_area(category: RoomCategory, current: &CurrentAreas) -> f64 {
        let value = match category {
            RoomCategory::Teaching => current.teaching,
            RoomCategory::Office => current.office,
            RoomCategory::Dormitory => current.dormitory,
            RoomCategory::OtherLiving => (current.total_living - current.dormitory).max(0.0),
            RoomCategory::Logistics => current.logistics,
        };
        round2(value)
    }
}
