// ==========================================
// 字段归一化 - 取值来源
// ==========================================
// 三类来源统一为带标签的枚举,按调用方给出的顺序逐个尝试
// ==========================================

use crate::domain::area::AreaRecord;
use crate::domain::fields::Field;
use crate::domain::requirement::Requirement;
use crate::domain::submission::RawSubmission;
use crate::domain::types::{RecordCategory, Stage};

/// 宽记录字段的取值来源
#[derive(Debug, Clone, Copy)]
pub enum FieldSource<'a> {
    /// 调用方原始填报（含历史别名）
    RawSubmission(&'a RawSubmission),
    /// 测算器输出
    CalculatorOutput(&'a Requirement),
    /// 已存储的历史记录（只提供填报类字段,派生合计与缺口一律重算）
    StoredRecord(&'a AreaRecord),
}

impl FieldSource<'_> {
    /// 该来源对语义字段给出的数值（非有限值视为缺失）
    pub fn lookup(&self, field: Field) -> Option<f64> {
        let value = match self {
            FieldSource::RawSubmission(raw) => raw.number(field),
            FieldSource::CalculatorOutput(requirement) => requirement.value(field),
            FieldSource::StoredRecord(record) => {
                if is_recomputed(field) {
                    None
                } else {
                    Some(record.value(field))
                }
            }
        };
        value.filter(|v| v.is_finite())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldSource::RawSubmission(_) => "raw_submission",
            FieldSource::CalculatorOutput(_) => "calculator_output",
            FieldSource::StoredRecord(_) => "stored_record",
        }
    }
}

/// 按顺序取第一个给出数值的来源
pub fn first_present(sources: &[FieldSource<'_>], field: Field) -> Option<f64> {
    sources.iter().find_map(|source| {
        let value = source.lookup(field)?;
        tracing::trace!(field = ?field, source = source.kind(), value, "字段取值");
        Some(value)
    })
}

/// 历史记录中不作为来源的字段: 缺口、汇总缺口、两个合计类别的全部阶段
fn is_recomputed(field: Field) -> bool {
    match field {
        Field::Area(_, Stage::Gap) => true,
        Field::Area(RecordCategory::TotalLiving | RecordCategory::Building, _) => true,
        Field::Area(_, Stage::Planned | Stage::Total) => true,
        Field::GapWithoutSubsidy | Field::GapWithSubsidy => true,
        Field::FullTimeTotal | Field::InternationalTotal | Field::TotalStudents => true,
        _ => false,
    }
}
