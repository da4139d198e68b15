use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::rubrics::entities::RubricComponent;

/// 评审面向的教师角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub enum FacultyType {
    // 指导教师
    Guide,
    // 评审小组
    Panel,
    // 两者皆可
    Both,
}

/// 评审时间窗口
///
/// 创作时校验 `from <= to`，锁定状态机永远不会观察到非法窗口。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct DeadlineWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DeadlineWindow {
    /// 当前时间是否仍在窗口内（含截止时刻）
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.to
    }
}

/// 评审定义
///
/// 一次具名的评审事件（如 "Review 1"），由管理员或协调员创建。
/// 截止时间可以后续修改；评分维度列表在开始录入后应保持稳定，
/// 会话打开时会对其做快照（见 services::session）。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct ReviewDefinition {
    // 唯一 ID
    pub id: i64,
    // 显示名称，如 "Review 1"
    pub display_name: String,
    // 面向的教师角色
    pub faculty_type: FacultyType,
    // 展示/排序序号
    pub order: i32,
    // 录入时间窗口
    pub deadline: DeadlineWindow,
    // 是否要求答辩 PPT
    pub ppt_required: bool,
    // 是否要求论文草稿
    pub draft_required: bool,
    // 评分维度列表
    pub components: Vec<RubricComponent>,
}

impl ReviewDefinition {
    /// 所有维度满分之和
    pub fn max_total_marks(&self) -> f64 {
        self.components.iter().map(|c| c.max_marks).sum()
    }
}
