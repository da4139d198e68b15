//! 团队锁定状态机与 PPT 闸门
//!
//! 锁定状态是 (截止窗口, 当前时间, 例外记录) 的纯函数，每次渲染时
//! 重新计算，不保留任何可变的 "is locked" 标志，避免与时钟漂移。
//!
//! 注意：这里的判断只是客户端的引导性 UX，服务端才是提交是否被
//! 接受的唯一权威（见 api 模块的 StaleLock 语义）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::{EvalSystemError, Result};
use crate::models::reviews::entities::{DeadlineWindow, FacultyType, ReviewDefinition};
use crate::models::teams::entities::{ExceptionRecord, RequestStatus, Team};

/// 锁定状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub enum LockState {
    // 截止前，可正常录入
    Open,
    // 已过截止且无例外
    Locked,
    // 已过截止但例外已批准
    Unlocked,
}

/// 呈现给评审教师的唯一操作
///
/// 判定优先级：PPT 闸门 → 待处理申请 → 锁定状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/team.ts")]
pub enum EvaluatorAction {
    // PPT 尚未获指导教师批准，录入被阻断
    PptPending,
    // 修改申请待处理，操作不可用
    RequestPending,
    // 已锁定，仅可发起修改申请
    RequestEdit,
    // 可录入/编辑成绩；unlocked 为真时展示 "已解锁" 徽标
    EnterMarks { unlocked: bool },
}

/// 计算锁定状态
pub fn compute_lock_state(
    deadline: &DeadlineWindow,
    now: DateTime<Utc>,
    exception: Option<&ExceptionRecord>,
) -> LockState {
    if deadline.is_open_at(now) {
        LockState::Open
    } else if exception.is_some_and(|e| e.approved) {
        LockState::Unlocked
    } else {
        LockState::Locked
    }
}

/// 计算修改申请状态
pub fn compute_request_state(team: &Team) -> RequestStatus {
    team.request_status
}

/// PPT 闸门
///
/// 评审小组角色在指导教师批准 PPT 之前被阻断；指导教师本人不受限。
/// 与锁定状态相互独立，可同时成立。
pub fn is_blocked_by_artifact(team: &Team, review: &ReviewDefinition) -> bool {
    review.ppt_required && team.role == FacultyType::Panel && !team.ppt_approved_for(review.id)
}

/// 判定呈现给评审教师的操作
///
/// PPT 闸门在锁定状态之前求值（视觉优先级），待处理申请覆盖
/// 其余一切入口。
pub fn resolve_action(
    review: &ReviewDefinition,
    team: &Team,
    now: DateTime<Utc>,
    exception: Option<&ExceptionRecord>,
) -> EvaluatorAction {
    if is_blocked_by_artifact(team, review) {
        return EvaluatorAction::PptPending;
    }
    if compute_request_state(team) == RequestStatus::Pending {
        return EvaluatorAction::RequestPending;
    }
    match compute_lock_state(&review.deadline, now, exception) {
        LockState::Locked => EvaluatorAction::RequestEdit,
        LockState::Open => EvaluatorAction::EnterMarks { unlocked: false },
        LockState::Unlocked => EvaluatorAction::EnterMarks { unlocked: true },
    }
}

/// 录入前置校验
///
/// 两道闸门都必须通过才允许打开评分会话。
pub fn ensure_entry_allowed(
    review: &ReviewDefinition,
    team: &Team,
    now: DateTime<Utc>,
    exception: Option<&ExceptionRecord>,
) -> Result<()> {
    match resolve_action(review, team, now, exception) {
        EvaluatorAction::EnterMarks { .. } => Ok(()),
        EvaluatorAction::PptPending => Err(EvalSystemError::artifact_pending(format!(
            "团队 {} 的 PPT 尚未获指导教师批准",
            team.name
        ))),
        EvaluatorAction::RequestPending => Err(EvalSystemError::request_pending(format!(
            "团队 {} 的修改申请待处理",
            team.name
        ))),
        EvaluatorAction::RequestEdit => Err(EvalSystemError::entry_locked(format!(
            "评审 {} 已过截止时间",
            review.display_name
        ))),
    }
}
