use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 截止后修改申请
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct EditRequestPayload {
    pub review_id: i64,
    pub team_id: i64,
    // 申请理由（去除首尾空白后非空）
    pub reason: String,
}
