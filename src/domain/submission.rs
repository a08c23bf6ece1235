// ==========================================
// 高校校舍面积缺口测算系统 - 原始填报
// ==========================================
// 原始填报 = 学校标识 + 年度 + 宽字段表 (字段名可能是历史别名)
// 宽字段表原样保留,字段解析统一走 domain::fields 的别名表
// ==========================================

use crate::domain::fields::Field;
use crate::domain::numeric::coerce_number;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 学校原始填报
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSubmission {
    pub school_name: String,
    #[serde(default)]
    pub year: i32,
    /// 宽字段表（面积 / 人数 / 覆写值,字段名允许历史别名）
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl RawSubmission {
    pub fn new(school_name: impl Into<String>, year: i32) -> Self {
        Self {
            school_name: school_name.into(),
            year,
            fields: Map::new(),
        }
    }

    /// 链式写入字段（测试与命令行构造请求时使用）
    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// 按语义字段查找数值: 依次尝试规范字段名与历史别名,
    /// 第一个存在且可解析为数值的候选胜出
    pub fn number(&self, field: Field) -> Option<f64> {
        for key in field.accepted_keys() {
            let Some(value) = self.fields.get(key.as_str()) else {
                continue;
            };
            match coerce_number(value) {
                Some(number) => return Some(number),
                None => {
                    tracing::debug!(field = %key, ?value, "非数值字段,继续尝试下一个别名");
                }
            }
        }
        None
    }

    /// 读取文本字段（如 school_type）
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// 合并覆写: `overrides` 中的字段覆盖当前字段
    pub fn merged_with(&self, overrides: &Map<String, Value>) -> Self {
        let mut merged = self.clone();
        for (key, value) in overrides {
            merged.fields.insert(key.clone(), value.clone());
        }
        merged
    }
}
