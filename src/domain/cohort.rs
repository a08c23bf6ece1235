// ==========================================
// 高校校舍面积缺口测算系统 - 学生规模
// ==========================================
// 红线: 合计字段只由分项重新求和,从不信任输入
// ==========================================

use crate::domain::fields::Field;
use crate::domain::numeric::round2;
use crate::domain::submission::RawSubmission;
use crate::domain::types::{StudentGroup, StudentTier};
use serde::{Deserialize, Serialize};

/// 学生规模（七类人数 + 三个派生合计）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentCohort {
    // ===== 全日制 =====
    #[serde(default)]
    pub full_time_specialist: f64,
    #[serde(default)]
    pub full_time_undergraduate: f64,
    #[serde(default)]
    pub full_time_master: f64,
    #[serde(default)]
    pub full_time_doctor: f64,

    // ===== 留学生 =====
    #[serde(default)]
    pub international_undergraduate: f64,
    #[serde(default)]
    pub international_master: f64,
    #[serde(default)]
    pub international_doctor: f64,

    // ===== 派生合计 =====
    #[serde(default)]
    pub full_time_total: f64,
    #[serde(default)]
    pub international_total: f64,
    #[serde(default)]
    pub total_students: f64,
}

impl StudentCohort {
    /// 从原始填报容错解析（缺失 / 空值 / 非数值 → 0）,并重算合计
    pub fn from_submission(raw: &RawSubmission) -> Self {
        let mut cohort = Self::default();
        for group in StudentGroup::ALL {
            let count = raw.number(Field::Students(group)).unwrap_or(0.0);
            cohort.set_count(group, count);
        }
        cohort.normalize();
        cohort
    }

    pub fn count(&self, group: StudentGroup) -> f64 {
        match group {
            StudentGroup::FullTimeSpecialist => self.full_time_specialist,
            StudentGroup::FullTimeUndergraduate => self.full_time_undergraduate,
            StudentGroup::FullTimeMaster => self.full_time_master,
            StudentGroup::FullTimeDoctor => self.full_time_doctor,
            StudentGroup::InternationalUndergraduate => self.international_undergraduate,
            StudentGroup::InternationalMaster => self.international_master,
            StudentGroup::InternationalDoctor => self.international_doctor,
        }
    }

    pub fn set_count(&mut self, group: StudentGroup, value: f64) {
        let slot = match group {
            StudentGroup::FullTimeSpecialist => &mut self.full_time_specialist,
            StudentGroup::FullTimeUndergraduate => &mut self.full_time_undergraduate,
            StudentGroup::FullTimeMaster => &mut self.full_time_master,
            StudentGroup::FullTimeDoctor => &mut self.full_time_doctor,
            StudentGroup::InternationalUndergraduate => &mut self.international_undergraduate,
            StudentGroup::InternationalMaster => &mut self.international_master,
            StudentGroup::InternationalDoctor => &mut self.international_doctor,
        };
        *slot = value;
    }

    /// 规范化: 非有限值置 0,分项两位小数,合计按分项重算
    pub fn normalize(&mut self) {
        for group in StudentGroup::ALL {
            self.set_count(group, round2(self.count(group)));
        }
        self.recompute_totals();
    }

    /// 按分项重算三个合计（不加权,简单求和）
    pub fn recompute_totals(&mut self) {
        let full_time: f64 = StudentGroup::ALL
            .iter()
            .filter(|g| !g.is_international())
            .map(|g| self.count(*g))
            .sum();
        let international: f64 = StudentGroup::ALL
            .iter()
            .filter(|g| g.is_international())
            .map(|g| self.count(*g))
            .sum();

        self.full_time_total = round2(full_time);
        self.international_total = round2(international);
        self.total_students = round2(self.full_time_total + self.international_total);
    }

    /// 补助层次对应的人数
    ///
    /// InternationalAll = 三类留学生之和
    pub fn tier_count(&self, tier: StudentTier) -> f64 {
        match tier {
            StudentTier::FullTimeMaster => self.full_time_master,
            StudentTier::FullTimeDoctor => self.full_time_doctor,
            StudentTier::InternationalAll => round2(
                self.international_undergraduate
                    + self.international_master
                    + self.international_doctor,
            ),
            StudentTier::InternationalMaster => self.international_master,
            StudentTier::InternationalDoctor => self.international_doctor,
        }
    }

    /// 合计字段的值（宽记录输出用）
    pub fn total(&self, field: Field) -> Option<f64> {
        match field {
            Field::FullTimeTotal => Some(self.full_time_total),
            Field::InternationalTotal => Some(self.international_total),
            Field::TotalStudents => Some(self.total_students),
            Field::Students(group) => Some(self.count(group)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_submission_coerces_and_totals() {
        let raw = RawSubmission::new("测试大学", 2024)
            .with_field("full_time_undergraduate", json!("900"))
            .with_field("full_time_master", json!(60))
            .with_field("full_time_doctor", json!(""))
            .with_field("doctor_count", json!(10))
            .with_field("international_master", json!("abc"))
            .with_field("international_doctor", json!(5))
            .with_field("total_students", json!(999999));

        let cohort = StudentCohort::from_submission(&raw);
        assert_eq!(cohort.full_time_undergraduate, 900.0);
        assert_eq!(cohort.full_time_doctor, 10.0);
        assert_eq!(cohort.international_master, 0.0);
        assert_eq!(cohort.full_time_total, 970.0);
        assert_eq!(cohort.international_total, 5.0);
        assert_eq!(cohort.total_students, 975.0);
    }

    #[test]
    fn test_recompute_totals_ignores_supplied_totals() {
        let mut cohort = StudentCohort {
            full_time_undergraduate: 100.0,
            international_undergraduate: 20.0,
            total_students: 1.0,
            full_time_total: 2.0,
            international_total: 3.0,
            ..Default::default()
        };
        cohort.recompute_totals();
        assert_eq!(cohort.full_time_total, 100.0);
        assert_eq!(cohort.international_total, 20.0);
        assert_eq!(cohort.total_students, 120.0);
    }

    #[test]
    fn test_normalize_clears_non_finite() {
        let mut cohort = StudentCohort {
            full_time_master: f64::NAN,
            full_time_doctor: 3.0,
            ..Default::default()
        };
        cohort.normalize();
        assert_eq!(cohort.full_time_master, 0.0);
        assert_eq!(cohort.total_students, 3.0);
    }

    #[test]
    fn test_tier_count_international_all() {
        let cohort = StudentCohort {
            international_undergraduate: 7.0,
            international_master: 2.0,
            international_doctor: 1.0,
            ..Default::default()
        };
        assert_eq!(cohort.tier_count(StudentTier::InternationalAll), 10.0);
        assert_eq!(cohort.tier_count(StudentTier::InternationalMaster), 2.0);
    }
}
