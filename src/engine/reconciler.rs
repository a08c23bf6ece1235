// ==========================================
// 高校校舍面积缺口测算系统 - 宽记录字段归一化
// ==========================================
// 红线: 派生字段总是由分项重算,从不仅做校验
// 红线: 从不失败,缺失 / 非数值输入按 0 处理
// ==========================================
// 输入: 原始填报 + 测算器输出 + 历史记录（可选）
// 输出: 满足全部求和不变式的 AreaRecord
// ==========================================

mod core;
mod source;

#[cfg(test)]
mod tests;

pub use core::{FieldReconciler, ReconcileInput};
pub use source::{first_present, FieldSource};
