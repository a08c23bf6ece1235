// ==========================================
// 高校校舍面积缺口测算系统 - 面积标准导入
// ==========================================
// 输入: 标准表（每行一条标准）
//   学校类型 | 用房类别 | 学生层次（空 = 基础标准） | 标准 (m²/生)
// 输出: StandardsSnapshot（整体替换用）
// 红线: 任一行不合法则整批失败,不产生部分快照
// ==========================================

use crate::domain::numeric::parse_number_text;
use crate::domain::standards::StandardsSnapshot;
use crate::domain::types::{RoomCategory, StudentTier};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRow, UniversalFileParser};
use std::path::Path;
use tracing::instrument;

// 列名别名（首个存在且非空的列胜出）
const SCHOOL_TYPE_COLUMNS: &[&str] = &["学校类型", "school_type"];
const CATEGORY_COLUMNS: &[&str] = &["用房类别", "category"];
const TIER_COLUMNS: &[&str] = &["学生层次", "tier"];
const RATE_COLUMNS: &[&str] = &["标准", "rate", "生均面积标准"];

/// 面积标准导入器
pub struct StandardsImporter {
    parser: UniversalFileParser,
}

impl StandardsImporter {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
        }
    }

    /// 从 CSV / Excel 文件导入
    #[instrument(skip(self), fields(path = %file_path.display()))]
    pub fn import_file(&self, file_path: &Path) -> ImportResult<StandardsSnapshot> {
        let rows = self.parser.parse(file_path)?;
        let snapshot = self.build_snapshot(&rows)?;
        tracing::info!(
            rows = rows.len(),
            school_types = snapshot.school_types().len(),
            "面积标准文件解析完成"
        );
        Ok(snapshot)
    }

    /// 由已解析的行构建快照
    pub fn build_snapshot(&self, rows: &[(usize, RawRow)]) -> ImportResult<StandardsSnapshot> {
        if rows.is_empty() {
            return Err(ImportError::EmptyImport);
        }

        let mut snapshot = StandardsSnapshot::new();
        for (row_number, row) in rows {
            self.apply_row(&mut snapshot, *row_number, row)?;
        }

        // 只有基础标准的学校类型: 补助子集为空集
        let base_types: Vec<String> = snapshot.base.keys().cloned().collect();
        for school_type in base_types {
            snapshot.ensure_subsidy_set(&school_type);
        }

        Ok(snapshot)
    }

    fn apply_row(
        &self,
        snapshot: &mut StandardsSnapshot,
        row_number: usize,
        row: &RawRow,
    ) -> ImportResult<()> {
        let school_type = column(row, SCHOOL_TYPE_COLUMNS).ok_or_else(|| {
            ImportError::FieldMappingError {
                row: row_number,
                message: "学校类型为空".to_string(),
            }
        })?;

        let category_text = column(row, CATEGORY_COLUMNS).ok_or_else(|| {
            ImportError::FieldMappingError {
                row: row_number,
                message: "用房类别为空".to_string(),
            }
        })?;
        let category = RoomCategory::parse(category_text).ok_or_else(|| ImportError::UnknownCode {
            row: row_number,
            field: "用房类别".to_string(),
            value: category_text.to_string(),
        })?;

        let tier = match column(row, TIER_COLUMNS) {
            None => None,
            Some(text) => Some(StudentTier::parse(text).ok_or_else(|| ImportError::UnknownCode {
                row: row_number,
                field: "学生层次".to_string(),
                value: text.to_string(),
            })?),
        };

        let rate = parse_rate(row, row_number)?;

        match tier {
            None => snapshot.set_base_rate(school_type, category, rate),
            Some(tier) => snapshot.set_subsidy_rate(school_type, category, tier, rate),
        }
        Ok(())
    }
}

impl Default for StandardsImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// 按别名取第一个非空列
fn column<'a>(row: &'a RawRow, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .filter_map(|alias| row.get(*alias))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

fn parse_rate(row: &RawRow, row_number: usize) -> ImportResult<f64> {
    let text = column(row, RATE_COLUMNS).ok_or_else(|| ImportError::TypeConversionError {
        row: row_number,
        field: "标准".to_string(),
        message: "标准为空".to_string(),
    })?;

    match parse_number_text(text) {
        Some(rate) if rate.is_finite() && rate >= 0.0 => Ok(rate),
        Some(rate) => Err(ImportError::TypeConversionError {
            row: row_number,
            field: "标准".to_string(),
            message: format!("标准不能为负数: {}", rate),
        }),
        None => Err(ImportError::TypeConversionError {
            row: row_number,
            field: "标准".to_string(),
            message: format!("无法解析为数值: {}", text),
        }),
    }
}
