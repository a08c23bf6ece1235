// ==========================================
// 高校校舍面积缺口测算系统 - 领域类型定义
// ==========================================
// 用房类别 / 面积阶段 / 学生层次 / 学生分组
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 用房类别 (Room Category)
// ==========================================
// 标准表按这五类给出生均面积
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomCategory {
    Teaching,    // 教学及辅助用房
    Office,      // 行政办公用房
    Dormitory,   // 学生宿舍
    OtherLiving, // 其他生活用房
    Logistics,   // 后勤辅助用房
}

impl RoomCategory {
    pub const ALL: [RoomCategory; 5] = [
        RoomCategory::Teaching,
        RoomCategory::Office,
        RoomCategory::Dormitory,
        RoomCategory::OtherLiving,
        RoomCategory::Logistics,
    ];

    /// 数据库/标准表中使用的代码
    pub fn code(&self) -> &'static str {
        match self {
            RoomCategory::Teaching => "TEACHING",
            RoomCategory::Office => "OFFICE",
            RoomCategory::Dormitory => "DORMITORY",
            RoomCategory::OtherLiving => "OTHER_LIVING",
            RoomCategory::Logistics => "LOGISTICS",
        }
    }

    /// 中文名称
    pub fn label(&self) -> &'static str {
        match self {
            RoomCategory::Teaching => "教学及辅助用房",
            RoomCategory::Office => "行政办公用房",
            RoomCategory::Dormitory => "学生宿舍",
            RoomCategory::OtherLiving => "其他生活用房",
            RoomCategory::Logistics => "后勤辅助用房",
        }
    }

    /// 解析代码或中文名称（导入标准表时使用）
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL.into_iter().find(|category| {
            category.code().eq_ignore_ascii_case(trimmed) || category.label() == trimmed
        })
    }
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 记录类别 (Record Category)
// ==========================================
// 宽记录中的类别 = 五类用房 + 两个派生汇总
// - TotalLiving = Dormitory + OtherLiving
// - Building = Teaching + Office + TotalLiving + Logistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordCategory {
    Teaching,
    Office,
    Dormitory,
    OtherLiving,
    Logistics,
    TotalLiving,
    Building,
}

impl RecordCategory {
    pub const ALL: [RecordCategory; 7] = [
        RecordCategory::Teaching,
        RecordCategory::Office,
        RecordCategory::Dormitory,
        RecordCategory::OtherLiving,
        RecordCategory::Logistics,
        RecordCategory::TotalLiving,
        RecordCategory::Building,
    ];

    /// 宽记录字段名前缀
    pub fn key(&self) -> &'static str {
        match self {
            RecordCategory::Teaching => "teaching",
            RecordCategory::Office => "office",
            RecordCategory::Dormitory => "dormitory",
            RecordCategory::OtherLiving => "other_living",
            RecordCategory::Logistics => "logistics",
            RecordCategory::TotalLiving => "total_living",
            RecordCategory::Building => "building",
        }
    }

    /// 对应的基础用房类别（派生汇总返回 None）
    pub fn room(&self) -> Option<RoomCategory> {
        match self {
            RecordCategory::Teaching => Some(RoomCategory::Teaching),
            RecordCategory::Office => Some(RoomCategory::Office),
            RecordCategory::Dormitory => Some(RoomCategory::Dormitory),
            RecordCategory::OtherLiving => Some(RoomCategory::OtherLiving),
            RecordCategory::Logistics => Some(RoomCategory::Logistics),
            RecordCategory::TotalLiving | RecordCategory::Building => None,
        }
    }
}

impl From<RoomCategory> for RecordCategory {
    fn from(category: RoomCategory) -> Self {
        match category {
            RoomCategory::Teaching => RecordCategory::Teaching,
            RoomCategory::Office => RecordCategory::Office,
            RoomCategory::Dormitory => RecordCategory::Dormitory,
            RoomCategory::OtherLiving => RecordCategory::OtherLiving,
            RoomCategory::Logistics => RecordCategory::Logistics,
        }
    }
}

impl fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ==========================================
// 面积阶段 (Lifecycle Stage)
// ==========================================
// Planned = Preliminary + UnderConstruction
// Total = Current + Planned
// Gap = Required - Total (可被显式值覆盖)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Current,           // 现有面积
    Preliminary,       // 前期手续中
    UnderConstruction, // 在建
    Planned,           // 规划 (派生)
    Total,             // 合计 (派生)
    Required,          // 应有面积 (标准测算)
    Gap,               // 缺口
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Current,
        Stage::Preliminary,
        Stage::UnderConstruction,
        Stage::Planned,
        Stage::Total,
        Stage::Required,
        Stage::Gap,
    ];

    /// 直接来自填报的阶段（不做派生）
    pub const REPORTED: [Stage; 3] = [Stage::Current, Stage::Preliminary, Stage::UnderConstruction];

    /// 宽记录字段名后缀
    pub fn key(&self) -> &'static str {
        match self {
            Stage::Current => "current_area",
            Stage::Preliminary => "preliminary_area",
            Stage::UnderConstruction => "under_construction_area",
            Stage::Planned => "planned_area",
            Stage::Total => "total_area",
            Stage::Required => "required_area",
            Stage::Gap => "gap",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ==========================================
// 补助层次 (Student Tier)
// ==========================================
// 补助标准按层次给出,InternationalAll 为全部留学生合计
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentTier {
    FullTimeMaster,      // 全日制硕士
    FullTimeDoctor,      // 全日制博士
    InternationalAll,    // 留学生(合计)
    InternationalMaster, // 留学生硕士
    InternationalDoctor, // 留学生博士
}

impl StudentTier {
    /// 补助公式默认求和的层次顺序
    pub const DEFAULT_ORDER: [StudentTier; 5] = [
        StudentTier::FullTimeMaster,
        StudentTier::FullTimeDoctor,
        StudentTier::InternationalAll,
        StudentTier::InternationalMaster,
        StudentTier::InternationalDoctor,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            StudentTier::FullTimeMaster => "FULL_TIME_MASTER",
            StudentTier::FullTimeDoctor => "FULL_TIME_DOCTOR",
            StudentTier::InternationalAll => "INTERNATIONAL_ALL",
            StudentTier::InternationalMaster => "INTERNATIONAL_MASTER",
            StudentTier::InternationalDoctor => "INTERNATIONAL_DOCTOR",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StudentTier::FullTimeMaster => "全日制硕士",
            StudentTier::FullTimeDoctor => "全日制博士",
            StudentTier::InternationalAll => "留学生",
            StudentTier::InternationalMaster => "留学生硕士",
            StudentTier::InternationalDoctor => "留学生博士",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::DEFAULT_ORDER
            .into_iter()
            .find(|tier| tier.code().eq_ignore_ascii_case(trimmed) || tier.label() == trimmed)
    }
}

impl fmt::Display for StudentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 学生分组 (Student Group)
// ==========================================
// 填报口径的七类学生人数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StudentGroup {
    FullTimeSpecialist,         // 全日制专科
    FullTimeUndergraduate,      // 全日制本科
    FullTimeMaster,             // 全日制硕士
    FullTimeDoctor,             // 全日制博士
    InternationalUndergraduate, // 留学生本科
    InternationalMaster,        // 留学生硕士
    InternationalDoctor,        // 留学生博士
}

impl StudentGroup {
    pub const ALL: [StudentGroup; 7] = [
        StudentGroup::FullTimeSpecialist,
        StudentGroup::FullTimeUndergraduate,
        StudentGroup::FullTimeMaster,
        StudentGroup::FullTimeDoctor,
        StudentGroup::InternationalUndergraduate,
        StudentGroup::InternationalMaster,
        StudentGroup::InternationalDoctor,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            StudentGroup::FullTimeSpecialist => "full_time_specialist",
            StudentGroup::FullTimeUndergraduate => "full_time_undergraduate",
            StudentGroup::FullTimeMaster => "full_time_master",
            StudentGroup::FullTimeDoctor => "full_time_doctor",
            StudentGroup::InternationalUndergraduate => "international_undergraduate",
            StudentGroup::InternationalMaster => "international_master",
            StudentGroup::InternationalDoctor => "international_doctor",
        }
    }

    pub fn is_international(&self) -> bool {
        matches!(
            self,
            StudentGroup::InternationalUndergraduate
                | StudentGroup::InternationalMaster
                | StudentGroup::InternationalDoctor
        )
    }
}

impl fmt::Display for StudentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
