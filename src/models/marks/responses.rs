use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::marks::entities::MarkRecord;

/// 单条成绩写入的确认
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct MarkAck {
    pub student_id: i64,
    // 服务端分配的记录 ID
    pub mark_id: i64,
}

/// 单个学生的提交结果
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub enum StudentSubmitStatus {
    Succeeded {
        mark_id: i64,
    },
    Failed {
        message: String,
        // 服务端以截止/锁定为由拒绝（客户端锁定状态已过期）
        stale_lock: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct StudentSubmitOutcome {
    pub student_id: i64,
    pub status: StudentSubmitStatus,
}

/// 整体提交结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub enum SubmissionClassification {
    // 全部成功
    Complete,
    // 部分成功：失败的学生需要重新提交
    Partial,
    // 全部失败
    Failed,
}

/// 提交报告
///
/// 逐学生的结果聚合；部分失败是一等状态而非被吞掉的异常。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/mark.ts")]
pub struct SubmissionReport {
    pub records: Vec<MarkRecord>,
    pub outcomes: Vec<StudentSubmitOutcome>,
}

impl SubmissionReport {
    pub fn classification(&self) -> SubmissionClassification {
        let failed = self
            .outcomes
            .iter()
            .filter(|o| matches!(o.status, StudentSubmitStatus::Failed { .. }))
            .count();
        if failed == 0 {
            SubmissionClassification::Complete
        } else if failed == self.outcomes.len() {
            SubmissionClassification::Failed
        } else {
            SubmissionClassification::Partial
        }
    }

    /// 失败学生的 ID 列表（这些学生保持可编辑，需要重新提交）
    pub fn failed_students(&self) -> Vec<i64> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, StudentSubmitStatus::Failed { .. }))
            .map(|o| o.student_id)
            .collect()
    }

    /// 是否存在服务端截止/锁定拒绝
    ///
    /// 为真时应提示评审教师提交修改申请，而不是盲目重试。
    pub fn has_stale_lock(&self) -> bool {
        self.outcomes.iter().any(|o| {
            matches!(
                o.status,
                StudentSubmitStatus::Failed {
                    stale_lock: true,
                    ..
                }
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(student_id: i64, status: StudentSubmitStatus) -> StudentSubmitOutcome {
        StudentSubmitOutcome { student_id, status }
    }

    #[test]
    fn test_classification() {
        let ok = StudentSubmitStatus::Succeeded { mark_id: 1 };
        let fail = StudentSubmitStatus::Failed {
            message: "network".to_string(),
            stale_lock: false,
        };

        let report = SubmissionReport {
            records: vec![],
            outcomes: vec![outcome(1, ok.clone()), outcome(2, ok.clone())],
        };
        assert_eq!(report.classification(), SubmissionClassification::Complete);

        let report = SubmissionReport {
            records: vec![],
            outcomes: vec![outcome(1, ok), outcome(2, fail.clone())],
        };
        assert_eq!(report.classification(), SubmissionClassification::Partial);
        assert_eq!(report.failed_students(), vec![2]);

        let report = SubmissionReport {
            records: vec![],
            outcomes: vec![outcome(1, fail.clone()), outcome(2, fail)],
        };
        assert_eq!(report.classification(), SubmissionClassification::Failed);
    }

    #[test]
    fn test_has_stale_lock() {
        let report = SubmissionReport {
            records: vec![],
            outcomes: vec![outcome(
                1,
                StudentSubmitStatus::Failed {
                    message: "deadline passed".to_string(),
                    stale_lock: true,
                },
            )],
        };
        assert!(report.has_stale_lock());
    }
}
