//! 提交构建器
//!
//! 把通过校验的会话状态组装成每个学生一条的不可变成绩记录，
//! 并发执行全部写入。部分失败是一等状态：成功学生的确认不会被
//! 丢弃，失败学生保持可编辑，会话不被整体销毁。

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, warn};

use crate::api::EvaluationApi;
use crate::errors::{EvalSystemError, Result};
use crate::models::marks::entities::{ComponentMark, MarkRecord};
use crate::models::marks::responses::{
    StudentSubmitOutcome, StudentSubmitStatus, SubmissionClassification, SubmissionReport,
};
use crate::services::realtime::{TeamStateUpdate, UpdateBus};
use crate::services::session::{Attendance, MarkEntrySession, SessionSnapshot};
use crate::utils::remarks::{RemarkParts, build_remarks};

/// 一次提交的完整结果
#[derive(Debug)]
pub struct SubmitResult {
    pub report: SubmissionReport,
    // 全部成功时填充，交给宿主做乐观本地对账
    pub snapshot: Option<SessionSnapshot>,
}

pub struct SubmissionService {
    api: Arc<dyn EvaluationApi>,
}

impl SubmissionService {
    pub fn new(api: Arc<dyn EvaluationApi>) -> Self {
        Self { api }
    }

    /// 从会话组装成绩记录（不发起网络请求）
    ///
    /// 前置条件：会话通过有效性校验；违反时返回校验错误，
    /// 状态不变，绝不部分提交。
    pub fn build_records(session: &MarkEntrySession) -> Result<Vec<MarkRecord>> {
        if let Some(reason) = session.first_validation_error() {
            return Err(EvalSystemError::validation(reason));
        }

        let review = session.review();
        let max_total = review.max_total_marks();
        let mut records = Vec::with_capacity(session.students().len());

        for student in session.students() {
            let student_id = student.student_id;
            let meta = session
                .student_meta(student_id)
                .ok_or_else(|| EvalSystemError::session_state("学生元数据缺失"))?;
            let exempt = session.is_student_exempt(student_id);

            let component_marks = review
                .components
                .iter()
                .map(|c| ComponentMark {
                    component_id: c.id,
                    component_name: c.name.clone(),
                    marks: if exempt {
                        0.0
                    } else {
                        session.recorded_score(student_id, c.id).unwrap_or(0.0)
                    },
                    max_marks: c.max_marks,
                })
                .collect();

            let remarks = build_remarks(&RemarkParts {
                absent: meta.attendance == Attendance::Absent,
                pat: meta.pat,
                personal: meta.comment.clone(),
                team_feedback: session.team_meta().team_comment.clone(),
                ppt_approved: session.team_meta().ppt_approved,
            });

            records.push(MarkRecord {
                student_id,
                project_id: session.team_id(),
                review_id: review.id,
                faculty_type: session.faculty_type(),
                component_marks,
                total_marks: session.student_total(student_id),
                max_total_marks: max_total,
                remarks,
                is_submitted: true,
            });
        }
        Ok(records)
    }

    /// 提交会话
    ///
    /// 每个学生一条记录并发写入；仅当全部成功才算整体成功，
    /// 此时会话被销毁并向实时通道推送乐观更新。部分失败时
    /// 报告逐学生结果，调用方据此重新提交失败的学生。
    pub async fn submit(&self, session: &mut MarkEntrySession) -> Result<SubmitResult> {
        // 校验失败不发起任何网络请求
        let records = Self::build_records(session)?;
        session.begin_submit()?;

        let writes = records
            .iter()
            .map(|record| self.api.submit_student_mark(record));
        let results = join_all(writes).await;
        session.finish_submit();

        let outcomes: Vec<StudentSubmitOutcome> = records
            .iter()
            .zip(results)
            .map(|(record, result)| StudentSubmitOutcome {
                student_id: record.student_id,
                status: match result {
                    Ok(ack) => StudentSubmitStatus::Succeeded {
                        mark_id: ack.mark_id,
                    },
                    Err(err) => StudentSubmitStatus::Failed {
                        message: err.format_simple(),
                        stale_lock: matches!(err, EvalSystemError::StaleLock(_)),
                    },
                },
            })
            .collect();

        let report = SubmissionReport { records, outcomes };
        match report.classification() {
            SubmissionClassification::Complete => {
                let snapshot = session.snapshot();
                info!(
                    "Submission complete for team {} ({} students)",
                    session.team_name(),
                    report.outcomes.len()
                );

                // 乐观更新：聚合计数器由消费方刷新，这里只广播状态；
                // 锁定/申请状态回显打开时的快照，提交本身不改变它们
                UpdateBus::get().send_to_faculty(
                    session.evaluator_id(),
                    TeamStateUpdate {
                        review_id: session.review().id,
                        team_id: session.team_id(),
                        marks_entered: true,
                        is_unlocked: session.team_unlocked(),
                        request_status: session.team_request_status(),
                    },
                );

                session.mark_consumed();
                Ok(SubmitResult {
                    report,
                    snapshot: Some(snapshot),
                })
            }
            SubmissionClassification::Partial => {
                warn!(
                    "Partial submission for team {}: {} student(s) failed",
                    session.team_name(),
                    report.failed_students().len()
                );
                Ok(SubmitResult {
                    report,
                    snapshot: None,
                })
            }
            SubmissionClassification::Failed => {
                warn!("Submission failed for team {}", session.team_name());
                Ok(SubmitResult {
                    report,
                    snapshot: None,
                })
            }
        }
    }
}
