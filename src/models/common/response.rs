use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 外部协作方（REST 后端）的统一确认响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub struct ApiAck {
    pub success: bool,
    pub message: String,
}

impl ApiAck {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
