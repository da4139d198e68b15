//! 截止后修改申请
//!
//! 团队被锁定后，评审教师可以发起一次修改申请以重新获得录入
//! 入口。乐观更新走影子副本：绝不就地修改传入的共享团队对象，
//! 协作方确认后由调用方安装副本，失败则原对象保持原样。

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::EvaluationApi;
use crate::errors::{EvalSystemError, Result};
use crate::models::marks::requests::EditRequestPayload;
use crate::models::teams::entities::{RequestStatus, Team};
use crate::utils::validate::validate_edit_reason;

pub struct EditRequestService {
    api: Arc<dyn EvaluationApi>,
}

impl EditRequestService {
    pub fn new(api: Arc<dyn EvaluationApi>) -> Self {
        Self { api }
    }

    /// 发起修改申请
    ///
    /// 从 UI 视角这是一次性、非幂等的动作：已处于 `Pending` 时
    /// 直接拒绝（操作按钮应当已被禁用，申请不发往网络）。失败时
    /// 返回协作方的原始错误消息，状态不变，由调用方手动重试；
    /// 终态 `Approved`/`Denied` 由管理端决定，本组件只产生 `Pending`。
    pub async fn request_edit(
        &self,
        team: &Team,
        review_id: i64,
        reason: &str,
    ) -> Result<Team> {
        validate_edit_reason(reason).map_err(EvalSystemError::validation)?;

        if team.request_status == RequestStatus::Pending {
            return Err(EvalSystemError::request_pending(format!(
                "团队 {} 已有待处理的修改申请",
                team.name
            )));
        }

        // 影子副本：服务端确认前不触碰调用方的团队对象
        let mut shadow = team.clone();
        shadow.request_status = RequestStatus::Pending;

        let payload = EditRequestPayload {
            review_id,
            team_id: team.id,
            reason: reason.trim().to_string(),
        };
        let ack = self.api.submit_edit_request(&payload).await?;
        if !ack.success {
            warn!(
                "Edit request rejected for team {}: {}",
                team.name, ack.message
            );
            return Err(EvalSystemError::api_operation(ack.message));
        }

        info!(
            "Edit request submitted for review {} / team {}",
            review_id, team.name
        );
        Ok(shadow)
    }
}
