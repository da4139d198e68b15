use serde::Deserialize;
use ts_rs::TS;

use crate::errors::{EvalSystemError, Result};
use crate::models::reviews::entities::{DeadlineWindow, FacultyType};
use crate::models::rubrics::entities::RubricComponent;
use crate::utils::validate::{validate_component, validate_deadline};

/// 创建评审请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct CreateReviewRequest {
    pub display_name: String,
    pub faculty_type: FacultyType,
    pub order: i32,
    pub deadline: DeadlineWindow, // ISO 8601 格式，如 "2026-01-24T12:00:00Z"
    pub ppt_required: Option<bool>,
    pub draft_required: Option<bool>,
    pub components: Vec<RubricComponent>,
}

impl CreateReviewRequest {
    /// 创作时校验
    ///
    /// 非法截止窗口和与档位上限不一致的 `max_marks` 都在这里拒绝，
    /// 后续的锁定状态机与评分会话只会观察到合法数据。
    pub fn validate(&self) -> Result<()> {
        if self.display_name.trim().is_empty() {
            return Err(EvalSystemError::validation("评审名称不能为空"));
        }
        validate_deadline(&self.deadline).map_err(EvalSystemError::validation)?;
        for component in &self.components {
            validate_component(component).map_err(EvalSystemError::validation)?;
        }
        Ok(())
    }
}

/// 更新评审请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct UpdateReviewRequest {
    pub display_name: Option<String>,
    pub order: Option<i32>,
    pub deadline: Option<DeadlineWindow>, // ISO 8601 格式
    pub ppt_required: Option<bool>,
    pub draft_required: Option<bool>,
}

impl UpdateReviewRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.display_name
            && name.trim().is_empty()
        {
            return Err(EvalSystemError::validation("评审名称不能为空"));
        }
        if let Some(deadline) = &self.deadline {
            validate_deadline(deadline).map_err(EvalSystemError::validation)?;
        }
        Ok(())
    }
}
