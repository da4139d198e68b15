use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::reviews::entities::FacultyType;

/// 修改申请状态
///
/// 与锁定状态正交的子状态：`Pending` 即使在已解锁的情况下
/// 也会阻止录入入口（见 services::lock）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub enum RequestStatus {
    None,
    Pending,
    Approved,
    Denied,
}

/// 学生
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct Student {
    // 唯一 ID
    pub student_id: i64,
    // 姓名
    pub name: String,
    // 学号
    pub roll_no: String,
    // 评分完成后填充
    pub total_marks: Option<f64>,
    pub max_total_marks: Option<f64>,
}

/// PPT 审批记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct PptApproval {
    // 对应的评审 ID
    pub review_id: i64,
    pub is_approved: bool,
}

/// 截止后例外解锁记录
///
/// 由管理端审批产生；锁定状态机只读取，不写入。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct ExceptionRecord {
    pub review_id: i64,
    pub team_id: i64,
    pub approved: bool,
    pub reason: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// 项目团队
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub struct Team {
    // 唯一 ID
    pub id: i64,
    // 团队名称
    pub name: String,
    // 成员列表
    pub students: Vec<Student>,
    // 评审小组名称
    pub panel_name: Option<String>,
    // 评审地点
    pub venue: Option<String>,
    // 当前教师相对该团队的角色
    pub role: FacultyType,
    // 各评审的 PPT 审批记录
    pub ppt_approvals: Vec<PptApproval>,
    // 是否已录入成绩（不影响锁定状态）
    pub marks_entered: bool,
    // 服务端结论：截止后例外是否已批准
    pub is_unlocked: bool,
    // 修改申请状态
    pub request_status: RequestStatus,
}

impl Team {
    /// 指定评审的 PPT 是否已批准
    pub fn ppt_approved_for(&self, review_id: i64) -> bool {
        self.ppt_approvals
            .iter()
            .any(|a| a.review_id == review_id && a.is_approved)
    }
}
