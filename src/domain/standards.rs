// ==========================================
// 高校校舍面积缺口测算系统 - 面积标准快照
// ==========================================
// AreaStandardSet:    学校类型 → 用房类别 → 基础生均面积
// SubsidyStandardSet: 学校类型 → 用房类别 → 补助层次 → 补助生均面积
// 快照只读;重载时整体替换
// ==========================================

use crate::domain::types::{RoomCategory, StudentTier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 某学校类型的基础标准
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseStandards {
    pub rates: BTreeMap<RoomCategory, f64>,
}

impl BaseStandards {
    pub fn rate(&self, category: RoomCategory) -> Option<f64> {
        self.rates.get(&category).copied()
    }
}

/// 某学校类型的补助标准
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubsidyStandards {
    pub rates: BTreeMap<RoomCategory, BTreeMap<StudentTier, f64>>,
}

impl SubsidyStandards {
    pub fn rate(&self, category: RoomCategory, tier: StudentTier) -> Option<f64> {
        self.rates
            .get(&category)
            .and_then(|tiers| tiers.get(&tier))
            .copied()
    }
}

/// 标准快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardsSnapshot {
    pub base: BTreeMap<String, BaseStandards>,
    pub subsidy: BTreeMap<String, SubsidyStandards>,
}

impl StandardsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_base_rate(&mut self, school_type: &str, category: RoomCategory, rate: f64) {
        self.base
            .entry(school_type.to_string())
            .or_default()
            .rates
            .insert(category, rate);
    }

    pub fn set_subsidy_rate(
        &mut self,
        school_type: &str,
        category: RoomCategory,
        tier: StudentTier,
        rate: f64,
    ) {
        self.subsidy
            .entry(school_type.to_string())
            .or_default()
            .rates
            .entry(category)
            .or_default()
            .insert(tier, rate);
    }

    /// 登记一个没有任何补助项的学校类型（补助子集存在但为空）
    pub fn ensure_subsidy_set(&mut self, school_type: &str) {
        self.subsidy.entry(school_type.to_string()).or_default();
    }

    pub fn base_standards(&self, school_type: &str) -> Option<&BaseStandards> {
        self.base.get(school_type)
    }

    pub fn subsidy_standards(&self, school_type: &str) -> Option<&SubsidyStandards> {
        self.subsidy.get(school_type)
    }

    pub fn base_rate(&self, school_type: &str, category: RoomCategory) -> Option<f64> {
        self.base_standards(school_type)
            .and_then(|standards| standards.rate(category))
    }

    pub fn subsidy_rate(
        &self,
        school_type: &str,
        category: RoomCategory,
        tier: StudentTier,
    ) -> Option<f64> {
        self.subsidy_standards(school_type)
            .and_then(|standards| standards.rate(category, tier))
    }

    /// 全部学校类型（基础或补助任一存在即列出）
    pub fn school_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .base
            .keys()
            .chain(self.subsidy.keys())
            .cloned()
            .collect();
        types.sort();
        types.dedup();
        types
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.subsidy.is_empty()
    }
}
