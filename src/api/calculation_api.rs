// ==========================================
// 高校校舍面积缺口测算系统 - 测算 API
// ==========================================
// 职责: 单校测算 / 批量测算 / 基于历史记录重新测算
// 流程: 原始填报 → AreaGapCalculator → FieldReconciler → AreaRecordStore
// 红线: 持久化失败不影响测算结果,只在响应中附带错误说明
// 红线: 历史记录只增不改,重新测算保存为新记录
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::area::{AreaRecord, CurrentAreas, SpecialSubsidyItem};
use crate::domain::cohort::StudentCohort;
use crate::domain::requirement::CalculationFailure;
use crate::domain::submission::RawSubmission;
use crate::engine::calculator::AreaGapCalculator;
use crate::engine::reconciler::{FieldReconciler, ReconcileInput};
use crate::repository::area_record_repo::AreaRecordStore;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// 请求 / 响应
// ==========================================

/// 测算请求: {school_name, year, fields, special_subsidies}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationRequest {
    #[serde(flatten)]
    pub submission: RawSubmission,
    #[serde(default)]
    pub special_subsidies: Vec<SpecialSubsidyItem>,
}

impl CalculationRequest {
    pub fn new(submission: RawSubmission) -> Self {
        Self {
            submission,
            special_subsidies: Vec::new(),
        }
    }

    pub fn with_subsidies(mut self, special_subsidies: Vec<SpecialSubsidyItem>) -> Self {
        self.special_subsidies = special_subsidies;
        self
    }
}

/// 测算响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    /// 归一化后的宽记录
    pub record: AreaRecord,
    /// 保存成功时的记录ID
    pub record_id: Option<String>,
    /// 保存失败时的错误说明
    pub persistence_error: Option<String>,
}

// ==========================================
// CalculationApi
// ==========================================
pub struct CalculationApi {
    calculator: Arc<AreaGapCalculator>,
    reconciler: FieldReconciler,
    store: Arc<dyn AreaRecordStore>,
}

impl CalculationApi {
    pub fn new(calculator: Arc<AreaGapCalculator>, store: Arc<dyn AreaRecordStore>) -> Self {
        Self {
            calculator,
            reconciler: FieldReconciler::new(),
            store,
        }
    }

    /// 单校测算并保存
    ///
    /// # 返回
    /// - Ok(CalculationResponse): 测算成功（保存失败时 persistence_error 有值）
    /// - Err(CalculationFailure): 学校类型缺少面积标准
    #[instrument(skip(self, request), fields(
        school_name = %request.submission.school_name,
        year = request.submission.year
    ))]
    pub async fn calculate(
        &self,
        request: &CalculationRequest,
    ) -> Result<CalculationResponse, CalculationFailure> {
        let record = self
            .compute_record(&request.submission, &request.special_subsidies, None)
            .await?;
        Ok(self.persist(record).await)
    }

    /// 批量测算: 并发执行,结果顺序与请求顺序一致
    #[instrument(skip_all, fields(count = requests.len()))]
    pub async fn calculate_batch(
        &self,
        requests: &[CalculationRequest],
    ) -> Vec<Result<CalculationResponse, CalculationFailure>> {
        let results = join_all(requests.iter().map(|request| self.calculate(request))).await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::info!(total = results.len(), failed, "批量测算完成");
        results
    }

    /// 基于历史记录重新测算
    ///
    /// 历史记录的填报值作为底稿,`overrides` 中的字段覆盖底稿;
    /// `special_subsidies` 为 None 时沿用历史记录的特殊补助明细
    #[instrument(skip(self, overrides, special_subsidies), fields(record_id = %record_id))]
    pub async fn recalculate(
        &self,
        record_id: &str,
        overrides: &Map<String, Value>,
        special_subsidies: Option<Vec<SpecialSubsidyItem>>,
    ) -> ApiResult<CalculationResponse> {
        if record_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("记录ID不能为空".to_string()));
        }

        let stored = self
            .store
            .fetch_by_id(record_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("面积记录(id={})不存在", record_id)))?;
        let previous = self.reconciler.normalize(&stored.record);

        let subsidies = special_subsidies.unwrap_or_else(|| previous.special_subsidies.clone());
        let mut calc_input = previous.to_reported_submission().merged_with(overrides);
        if calc_input.school_name.trim().is_empty() {
            calc_input.school_name = previous.school_name.clone();
        }

        let record = self
            .compute_record(&calc_input, &subsidies, Some(&previous))
            .await?;

        tracing::info!(
            previous_gap = previous.gap_with_subsidy,
            gap = record.gap_with_subsidy,
            "重新测算完成"
        );
        Ok(self.persist(record).await)
    }

    // ==========================================
    // 内部流程
    // ==========================================

    async fn compute_record(
        &self,
        submission: &RawSubmission,
        subsidies: &[SpecialSubsidyItem],
        previous: Option<&AreaRecord>,
    ) -> Result<AreaRecord, CalculationFailure> {
        let mut cohort = StudentCohort::from_submission(submission);
        let current = CurrentAreas::from_submission(submission);

        let requirement = self
            .calculator
            .compute(
                &submission.school_name,
                submission.year,
                &cohort,
                &current,
                subsidies,
            )
            .await?;

        let mut input = ReconcileInput::new(submission).with_requirement(&requirement);
        if let Some(previous) = previous {
            input = input.with_previous(previous);
        }
        Ok(self.reconciler.reconcile(&input, &mut cohort))
    }

    async fn persist(&self, record: AreaRecord) -> CalculationResponse {
        match self.store.save(&record).await {
            Ok(record_id) => CalculationResponse {
                record,
                record_id: Some(record_id),
                persistence_error: None,
            },
            Err(e) => {
                tracing::error!(
                    school_name = %record.school_name,
                    year = record.year,
                    error = %e,
                    "面积记录保存失败"
                );
                CalculationResponse {
                    record,
                    record_id: None,
                    persistence_error: Some(e.to_string()),
                }
            }
        }
    }
}
