// ==========================================
// 高校校舍面积缺口测算系统 - 数值容错与舍入
// ==========================================
// 口径:
// - 缺失 / 空串 / 非数值 → None (由调用方按 0 处理)
// - 所有面积与人数保留两位小数,四舍五入(远离零)
// ==========================================

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 两位小数舍入（x100 后四舍五入,远离零）
///
/// 非有限值（NaN / ±inf）按 0 处理;结果中的 -0.0 统一为 0.0,
/// 保证对已舍入的值再次舍入结果不变。
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// 容错解析 JSON 值为数值
///
/// - Number: 有限值直接返回
/// - String: 去空白、去千分位逗号后解析
/// - 其他（null / bool / array / object）: None
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number_text(s),
        _ => None,
    }
}

/// 容错解析文本数值（导入文件单元格同样走这里）
pub fn parse_number_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '，')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 容错解析后的两位小数值,缺失按 0
pub fn coerce_or_zero(value: Option<&Value>) -> f64 {
    value.and_then(coerce_number).map(round2).unwrap_or(0.0)
}

/// serde 容错反序列化: 任意 JSON 值 → f64 (无法解析按 0)
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(coerce_or_zero(raw.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(1.375), 1.38);
        assert_eq!(round2(-1.375), -1.38);
        assert_eq!(round2(2.5), 2.5);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(10.004), 10.0);
        assert_eq!(round2(-0.001), 0.0);
        assert!(round2(-0.001).is_sign_positive());
    }

    #[test]
    fn test_round2_is_idempotent() {
        for value in [0.1 + 0.2, 1234.5678, -98.765, 1e-9, 14050.0, 333.335] {
            let once = round2(value);
            assert_eq!(round2(once), once);
        }
    }

    #[test]
    fn test_round2_non_finite_is_zero() {
        assert_eq!(round2(f64::NAN), 0.0);
        assert_eq!(round2(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_coerce_number_variants() {
        assert_eq!(coerce_number(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_number(&json!(" 1,200.5 ")), Some(1200.5));
        assert_eq!(coerce_number(&json!("3，000")), Some(3000.0));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("N/A")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }

    #[test]
    fn test_coerce_or_zero() {
        assert_eq!(coerce_or_zero(None), 0.0);
        assert_eq!(coerce_or_zero(Some(&json!("abc"))), 0.0);
        assert_eq!(coerce_or_zero(Some(&json!("10.456"))), 10.46);
    }

    #[test]
    fn test_lenient_f64_deserialize() {
        #[derive(Deserialize)]
        struct Probe {
            #[serde(default, deserialize_with = "lenient_f64")]
            value: f64,
        }

        let probe: Probe = serde_json::from_str(r#"{"value": "42.129"}"#).unwrap();
        assert_eq!(probe.value, 42.13);
        let probe: Probe = serde_json::from_str(r#"{"value": ""}"#).unwrap();
        assert_eq!(probe.value, 0.0);
        let probe: Probe = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(probe.value, 0.0);
        let probe: Probe = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(probe.value, 0.0);
    }
}
