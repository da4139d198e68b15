//! 外部协作方接口
//!
//! 核心只消费、不实现这些操作：评审/团队拉取、逐学生成绩写入、
//! 修改申请提交。REST 传输与 Excel 导入导出等由宿主实现。

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::Result;
use crate::models::common::response::ApiAck;
use crate::models::marks::entities::MarkRecord;
use crate::models::marks::requests::EditRequestPayload;
use crate::models::marks::responses::MarkAck;
use crate::models::reviews::entities::{FacultyType, ReviewDefinition};
use crate::models::teams::entities::{ExceptionRecord, Team};

pub mod cached;

/// 评审/团队列表筛选条件
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct ReviewFilter {
    pub year: Option<i32>,
    pub school: Option<String>,
    pub programme: Option<String>,
    pub role: Option<FacultyType>,
}

impl ReviewFilter {
    /// 缓存键
    pub fn cache_key(&self) -> String {
        format!(
            "reviews:{}:{}:{}:{}",
            self.year.map_or_else(|| "*".to_string(), |y| y.to_string()),
            self.school.as_deref().unwrap_or("*"),
            self.programme.as_deref().unwrap_or("*"),
            self.role.map_or("*", |r| match r {
                FacultyType::Guide => "guide",
                FacultyType::Panel => "panel",
                FacultyType::Both => "both",
            }),
        )
    }
}

/// 一次评审及其下的团队与例外记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct ReviewBundle {
    pub review: ReviewDefinition,
    pub teams: Vec<Team>,
    pub exceptions: Vec<ExceptionRecord>,
}

impl ReviewBundle {
    /// 查找某团队在本评审下的例外记录
    pub fn exception_for(&self, team_id: i64) -> Option<&ExceptionRecord> {
        self.exceptions
            .iter()
            .find(|e| e.team_id == team_id && e.review_id == self.review.id)
    }
}

#[async_trait::async_trait]
pub trait EvaluationApi: Send + Sync {
    /// 按筛选条件拉取评审列表（含团队、例外记录）
    async fn fetch_reviews(&self, filter: &ReviewFilter) -> Result<Vec<ReviewBundle>>;

    /// 写入单个学生的成绩记录
    ///
    /// 服务端是锁定判断的唯一权威：截止后被拒绝的写入返回
    /// `EvalSystemError::StaleLock`，与一般失败可区分。
    async fn submit_student_mark(&self, record: &MarkRecord) -> Result<MarkAck>;

    /// 提交截止后修改申请
    async fn submit_edit_request(&self, payload: &EditRequestPayload) -> Result<ApiAck>;
}
