// ==========================================
// 高校校舍面积缺口测算系统 - 面积记录 API
// ==========================================
// 职责: 历史记录查询、删除
// 红线: 读出的记录一律重新归一化后返回
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::engine::reconciler::FieldReconciler;
use crate::repository::area_record_repo::{AreaRecordStore, StoredAreaRecord};
use std::sync::Arc;

/// 面积记录API
pub struct RecordApi {
    store: Arc<dyn AreaRecordStore>,
    reconciler: FieldReconciler,
}

impl RecordApi {
    pub fn new(store: Arc<dyn AreaRecordStore>) -> Self {
        Self {
            store,
            reconciler: FieldReconciler::new(),
        }
    }

    /// 按ID查询记录
    ///
    /// # 返回
    /// - Ok(StoredAreaRecord): 归一化后的记录
    /// - Err(ApiError::NotFound): 记录不存在
    pub async fn get_record(&self, record_id: &str) -> ApiResult<StoredAreaRecord> {
        if record_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("记录ID不能为空".to_string()));
        }

        let stored = self
            .store
            .fetch_by_id(record_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("面积记录(id={})不存在", record_id)))?;
        Ok(self.normalized(stored))
    }

    /// 查询学校的全部记录（最新在前）
    pub async fn list_records(&self, school_name: &str) -> ApiResult<Vec<StoredAreaRecord>> {
        let school_name = school_name.trim();
        if school_name.is_empty() {
            return Err(ApiError::InvalidInput("学校名称不能为空".to_string()));
        }

        let records = self.store.list_by_school(school_name).await?;
        Ok(records.into_iter().map(|r| self.normalized(r)).collect())
    }

    /// 删除记录
    pub async fn delete_record(&self, record_id: &str) -> ApiResult<()> {
        if record_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("记录ID不能为空".to_string()));
        }

        if !self.store.delete(record_id).await? {
            return Err(ApiError::NotFound(format!("面积记录(id={})不存在", record_id)));
        }
        tracing::info!(record_id = %record_id, "面积记录已删除");
        Ok(())
    }

    fn normalized(&self, stored: StoredAreaRecord) -> StoredAreaRecord {
        StoredAreaRecord {
            record: self.reconciler.normalize(&stored.record),
            ..stored
        }
    }
}
