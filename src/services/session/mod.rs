//! 评分会话
//!
//! 一次 (评审, 团队) 的交互式逐学生/逐维度打分走查。会话状态是
//! 唯一权威：引导走查视图与仪表盘表格视图都是它上面的纯投影，
//! 不允许任何视图私有的副本（见 scoring / navigation 子模块）。
//!
//! 会话为临时对象：提交成功或显式取消即销毁，从不部分持久化；
//! 取消无条件丢弃所有进行中的评分（会话很短，单团队数分钟）。

pub mod manager;
pub mod navigation;
pub mod scoring;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::{EvalSystemError, Result};
use crate::models::reviews::entities::{FacultyType, ReviewDefinition};
use crate::models::teams::entities::{ExceptionRecord, RequestStatus, Student, Team};
use crate::services::lock::ensure_entry_allowed;
use crate::utils::validate::{validate_component, validate_team_comment};

use manager::{SessionGuard, SessionManager};

/// 出勤状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Present,
    Absent,
}

/// 学生级会话元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentMeta {
    pub attendance: Attendance,
    // 项目协助团队豁免
    pub pat: bool,
    pub comment: String,
}

impl Default for StudentMeta {
    fn default() -> Self {
        Self {
            attendance: Attendance::Present,
            pat: false,
            comment: String::new(),
        }
    }
}

/// 团队级会话元数据
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamMeta {
    pub ppt_approved: bool,
    pub team_comment: String,
}

/// 学生打分进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentProgress {
    NotStarted,
    InProgress,
    Complete,
}

/// 当前展示的视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView {
    // 逐学生/逐维度引导走查
    Walkthrough,
    // 学生 × 维度的可编辑总表
    Dashboard,
}

/// 自动推进结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    // 同一学生的下一个维度
    NextRubric,
    // 下一个未完成的学生
    NextStudent { student_id: i64 },
    // 全部完成，进入仪表盘视图
    Dashboard,
}

/// 选中档位后的短暂确认展示
#[derive(Debug, Clone, PartialEq)]
pub struct Spotlight {
    pub student_id: i64,
    pub component_id: i64,
    pub score: f64,
    pub label: String,
}

/// 会话时序参数
#[derive(Debug, Clone, Copy)]
pub struct SessionTiming {
    pub switch_delay: std::time::Duration,
    pub settle_delay: std::time::Duration,
}

impl SessionTiming {
    pub fn from_config() -> Self {
        let config = AppConfig::get();
        Self {
            switch_delay: config.switch_delay(),
            settle_delay: config.settle_delay(),
        }
    }

    /// 无延时（测试用）
    pub const fn immediate() -> Self {
        Self {
            switch_delay: std::time::Duration::ZERO,
            settle_delay: std::time::Duration::ZERO,
        }
    }
}

/// 提交成功后交给宿主做乐观本地对账的会话快照
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub marks: HashMap<i64, HashMap<i64, f64>>,
    pub meta: HashMap<i64, StudentMeta>,
    pub team_meta: TeamMeta,
}

/// 评分会话
#[derive(Debug)]
pub struct MarkEntrySession {
    id: Uuid,
    evaluator_id: i64,
    team_id: i64,
    team_name: String,
    faculty_type: FacultyType,
    // 评审快照：会话打开时复制维度列表，评审定义的中途修改
    // 不影响进行中的会话
    review: ReviewDefinition,
    // 打开时团队的锁定快照：提交成功后原样回显到实时总线，
    // 乐观更新绝不改写锁定状态
    team_unlocked: bool,
    team_request_status: RequestStatus,
    students: Vec<Student>,
    // 学生 ID -> (维度 ID -> 分值)
    marks: HashMap<i64, HashMap<i64, f64>>,
    meta: HashMap<i64, StudentMeta>,
    team_meta: TeamMeta,
    active_student: usize,
    active_rubric: usize,
    view: SessionView,
    // 切换学生的过渡窗口，窗口内拒绝评分变更
    switching_until: Option<Instant>,
    spotlight: Option<Spotlight>,
    in_flight: bool,
    consumed: bool,
    timing: SessionTiming,
    _guard: SessionGuard,
}

impl MarkEntrySession {
    /// 打开评分会话
    ///
    /// 前置条件：锁定状态机与 PPT 闸门都放行，且该
    /// (评审教师, 团队) 没有其他活动会话。
    pub fn open(
        evaluator_id: i64,
        review: &ReviewDefinition,
        team: &Team,
        now: DateTime<Utc>,
        exception: Option<&ExceptionRecord>,
        timing: SessionTiming,
    ) -> Result<Self> {
        ensure_entry_allowed(review, team, now, exception)?;

        if team.students.is_empty() {
            return Err(EvalSystemError::validation(format!(
                "团队 {} 没有成员，无法打分",
                team.name
            )));
        }
        if review.components.is_empty() {
            return Err(EvalSystemError::validation(format!(
                "评审 {} 没有评分维度",
                review.display_name
            )));
        }
        for component in &review.components {
            validate_component(component).map_err(EvalSystemError::validation)?;
        }

        let id = Uuid::new_v4();
        let guard = SessionManager::acquire(evaluator_id, team.id, id)?;

        let meta = team
            .students
            .iter()
            .map(|s| (s.student_id, StudentMeta::default()))
            .collect();

        info!(
            "Mark-entry session {} opened for review {} / team {}",
            id, review.display_name, team.name
        );

        Ok(Self {
            id,
            evaluator_id,
            team_id: team.id,
            team_name: team.name.clone(),
            faculty_type: team.role,
            review: review.clone(),
            team_unlocked: team.is_unlocked,
            team_request_status: team.request_status,
            students: team.students.clone(),
            marks: HashMap::new(),
            meta,
            team_meta: TeamMeta::default(),
            active_student: 0,
            active_rubric: 0,
            view: SessionView::Walkthrough,
            switching_until: None,
            spotlight: None,
            in_flight: false,
            consumed: false,
            timing,
            _guard: guard,
        })
    }

    // ---- 只读访问 ----

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn evaluator_id(&self) -> i64 {
        self.evaluator_id
    }

    pub fn team_id(&self) -> i64 {
        self.team_id
    }

    pub fn team_name(&self) -> &str {
        &self.team_name
    }

    pub fn faculty_type(&self) -> FacultyType {
        self.faculty_type
    }

    /// 评审快照（会话打开时固定）
    pub fn review(&self) -> &ReviewDefinition {
        &self.review
    }

    /// 打开时团队是否处于例外解锁状态
    pub fn team_unlocked(&self) -> bool {
        self.team_unlocked
    }

    /// 打开时团队的修改申请状态
    pub fn team_request_status(&self) -> RequestStatus {
        self.team_request_status
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn marks(&self) -> &HashMap<i64, HashMap<i64, f64>> {
        &self.marks
    }

    pub fn student_meta(&self, student_id: i64) -> Option<&StudentMeta> {
        self.meta.get(&student_id)
    }

    pub fn team_meta(&self) -> &TeamMeta {
        &self.team_meta
    }

    pub fn view(&self) -> SessionView {
        self.view
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    // ---- 完成度与合计 ----

    /// 学生是否被豁免打分（缺席或 PAT）
    pub fn is_student_exempt(&self, student_id: i64) -> bool {
        self.meta
            .get(&student_id)
            .is_some_and(|m| m.attendance == Attendance::Absent || m.pat)
    }

    /// 学生是否已完成：豁免，或每个维度都有分值
    pub fn is_student_complete(&self, student_id: i64) -> bool {
        if self.is_student_exempt(student_id) {
            return true;
        }
        let Some(scored) = self.marks.get(&student_id) else {
            return false;
        };
        self.review
            .components
            .iter()
            .all(|c| scored.contains_key(&c.id))
    }

    pub fn student_progress(&self, student_id: i64) -> StudentProgress {
        if self.is_student_complete(student_id) {
            StudentProgress::Complete
        } else if self
            .marks
            .get(&student_id)
            .is_some_and(|scored| !scored.is_empty())
        {
            StudentProgress::InProgress
        } else {
            StudentProgress::NotStarted
        }
    }

    /// 是否需要视觉提醒：未完成且未豁免
    ///
    /// 豁免学生不出现在提醒里，但仍保留在名单中。
    pub fn needs_attention(&self, student_id: i64) -> bool {
        !self.is_student_complete(student_id) && !self.is_student_exempt(student_id)
    }

    /// 学生总分
    ///
    /// 每个维度按 `分值 / 档位上限 × 满分` 折算后求和，保留一位小数。
    /// 豁免学生总分为 0；已记录的分值保留在映射里但不参与合计。
    pub fn student_total(&self, student_id: i64) -> f64 {
        if self.is_student_exempt(student_id) {
            return 0.0;
        }
        let Some(scored) = self.marks.get(&student_id) else {
            return 0.0;
        };
        let total: f64 = self
            .review
            .components
            .iter()
            .filter_map(|c| {
                let score = scored.get(&c.id)?;
                let ceiling = c.level_ceiling();
                if ceiling > 0.0 {
                    Some(score / ceiling * c.max_marks)
                } else {
                    Some(0.0)
                }
            })
            .sum();
        round1(total)
    }

    /// 团队总分（所有学生之和）
    pub fn team_total(&self) -> f64 {
        round1(
            self.students
                .iter()
                .map(|s| self.student_total(s.student_id))
                .sum(),
        )
    }

    /// 总分上限
    pub fn max_total(&self) -> f64 {
        self.review.max_total_marks()
    }

    // ---- 会话有效性（持续重估，不只在点提交时） ----

    /// 会话是否允许提交：所有学生完成且团队评语达到最短长度
    pub fn is_valid_for_submission(&self) -> bool {
        self.first_validation_error().is_none()
    }

    /// 第一条阻止提交的校验错误
    pub fn first_validation_error(&self) -> Option<String> {
        for student in &self.students {
            if !self.is_student_complete(student.student_id) {
                return Some(format!("学生 {} 的评分尚未完成", student.name));
            }
        }
        if let Err(msg) = validate_team_comment(&self.team_meta.team_comment) {
            return Some(msg.to_string());
        }
        None
    }

    // ---- 元数据变更 ----

    /// 设置出勤状态
    ///
    /// 标记缺席立即使该学生完成（总分 0），并在其为当前学生时
    /// 自动推进到下一个未完成的学生。
    pub fn set_attendance(
        &mut self,
        student_id: i64,
        attendance: Attendance,
    ) -> Result<Option<AdvanceOutcome>> {
        self.ensure_mutable()?;
        let meta = self
            .meta
            .get_mut(&student_id)
            .ok_or_else(|| EvalSystemError::not_found(format!("学生 {student_id} 不在会话中")))?;
        meta.attendance = attendance;
        Ok(self.auto_advance_if_active_exempt(student_id))
    }

    /// 设置 PAT 豁免，语义同缺席
    pub fn set_pat(&mut self, student_id: i64, pat: bool) -> Result<Option<AdvanceOutcome>> {
        self.ensure_mutable()?;
        let meta = self
            .meta
            .get_mut(&student_id)
            .ok_or_else(|| EvalSystemError::not_found(format!("学生 {student_id} 不在会话中")))?;
        meta.pat = pat;
        Ok(self.auto_advance_if_active_exempt(student_id))
    }

    pub fn set_student_comment(&mut self, student_id: i64, comment: impl Into<String>) -> Result<()> {
        self.ensure_mutable()?;
        let meta = self
            .meta
            .get_mut(&student_id)
            .ok_or_else(|| EvalSystemError::not_found(format!("学生 {student_id} 不在会话中")))?;
        meta.comment = comment.into();
        Ok(())
    }

    pub fn set_team_comment(&mut self, comment: impl Into<String>) -> Result<()> {
        self.ensure_mutable()?;
        self.team_meta.team_comment = comment.into();
        Ok(())
    }

    pub fn set_team_ppt_approved(&mut self, approved: bool) -> Result<()> {
        self.ensure_mutable()?;
        self.team_meta.ppt_approved = approved;
        Ok(())
    }

    // ---- 提交生命周期（由 SubmissionService 驱动） ----

    /// 标记提交进行中；进行中不允许第二次提交同一会话
    pub fn begin_submit(&mut self) -> Result<()> {
        if self.consumed {
            return Err(EvalSystemError::session_state("会话已提交完成"));
        }
        if self.in_flight {
            return Err(EvalSystemError::session_state("提交正在进行中"));
        }
        self.in_flight = true;
        Ok(())
    }

    pub fn finish_submit(&mut self) {
        self.in_flight = false;
    }

    /// 全部写入成功后销毁会话语义（登记随 Drop 注销）
    pub fn mark_consumed(&mut self) {
        self.consumed = true;
        info!("Mark-entry session {} consumed", self.id);
    }

    /// 提交成功后交给宿主的快照
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            marks: self.marks.clone(),
            meta: self.meta.clone(),
            team_meta: self.team_meta.clone(),
        }
    }

    // ---- 内部辅助 ----

    pub(crate) fn ensure_mutable(&self) -> Result<()> {
        if self.consumed {
            return Err(EvalSystemError::session_state("会话已提交完成"));
        }
        if self.in_flight {
            return Err(EvalSystemError::session_state("提交进行中，状态不可变更"));
        }
        if let Some(until) = self.switching_until
            && Instant::now() < until
        {
            return Err(EvalSystemError::session_state("学生切换过渡中"));
        }
        Ok(())
    }

    pub(crate) fn marks_mut(&mut self) -> &mut HashMap<i64, HashMap<i64, f64>> {
        &mut self.marks
    }

    pub(crate) fn active_student_index(&self) -> usize {
        self.active_student
    }

    pub(crate) fn active_rubric_index(&self) -> usize {
        self.active_rubric
    }

    pub(crate) fn set_cursor(&mut self, student: usize, rubric: usize) {
        self.active_student = student;
        self.active_rubric = rubric;
    }

    pub(crate) fn set_view(&mut self, view: SessionView) {
        self.view = view;
    }

    pub(crate) fn set_switching_until(&mut self, until: Option<Instant>) {
        self.switching_until = until;
    }

    pub(crate) fn set_spotlight(&mut self, spotlight: Option<Spotlight>) {
        self.spotlight = spotlight;
    }

    pub(crate) fn timing(&self) -> SessionTiming {
        self.timing
    }

    fn auto_advance_if_active_exempt(&mut self, student_id: i64) -> Option<AdvanceOutcome> {
        let active_id = self.students.get(self.active_student)?.student_id;
        if active_id == student_id && self.is_student_exempt(student_id) {
            Some(self.advance_to_next_incomplete())
        } else {
            None
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;
    use crate::models::rubrics::entities::{RubricComponent, RubricLevel};
    use crate::models::teams::entities::{PptApproval, RequestStatus};
    use chrono::TimeZone;

    pub fn component(id: i64, name: &str, max: f64, scores: &[f64]) -> RubricComponent {
        RubricComponent {
            id,
            name: name.to_string(),
            description: None,
            max_marks: max,
            levels: scores
                .iter()
                .map(|&s| RubricLevel {
                    score: s,
                    label: format!("L{s}"),
                    description: None,
                })
                .collect(),
        }
    }

    pub fn review() -> ReviewDefinition {
        ReviewDefinition {
            id: 1,
            display_name: "Review 1".to_string(),
            faculty_type: FacultyType::Both,
            order: 1,
            deadline: crate::models::reviews::entities::DeadlineWindow {
                from: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
                to: Utc.with_ymd_and_hms(2025, 1, 30, 23, 59, 59).unwrap(),
            },
            ppt_required: true,
            draft_required: false,
            components: vec![
                component(11, "Design", 10.0, &[0.0, 5.0, 10.0]),
                component(12, "Docs", 5.0, &[0.0, 5.0]),
            ],
        }
    }

    pub fn student(id: i64, name: &str) -> Student {
        Student {
            student_id: id,
            name: name.to_string(),
            roll_no: format!("R{id:04}"),
            total_marks: None,
            max_total_marks: None,
        }
    }

    pub fn team(id: i64) -> Team {
        Team {
            id,
            name: "Alpha".to_string(),
            students: vec![student(101, "学生甲"), student(102, "学生乙")],
            panel_name: Some("Panel A".to_string()),
            venue: Some("Lab 3".to_string()),
            role: FacultyType::Guide,
            ppt_approvals: vec![PptApproval {
                review_id: 1,
                is_approved: true,
            }],
            marks_entered: false,
            is_unlocked: false,
            request_status: RequestStatus::None,
        }
    }

    pub fn open_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    pub fn open_session(team_id: i64) -> MarkEntrySession {
        MarkEntrySession::open(
            9000 + team_id,
            &review(),
            &team(team_id),
            open_now(),
            None,
            SessionTiming::immediate(),
        )
        .expect("session should open")
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_open_requires_gates() {
        // 已过截止时间无法打开会话
        let late = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let err = MarkEntrySession::open(
            1,
            &review(),
            &team(900),
            late,
            None,
            SessionTiming::immediate(),
        )
        .unwrap_err();
        assert_eq!(err.code(), EvalSystemError::entry_locked("").code());
    }

    #[test]
    fn test_exempt_student_total_zero_even_with_scores() {
        // 缺席/PAT 学生总分恒为 0 且视为完成，已记录的分值不被擦除
        let mut session = open_session(901);
        session.marks_mut().entry(101).or_default().insert(11, 10.0);
        session.marks_mut().entry(101).or_default().insert(12, 5.0);
        assert_eq!(session.student_total(101), 15.0);

        session.set_attendance(101, Attendance::Absent).unwrap();
        assert_eq!(session.student_total(101), 0.0);
        assert!(session.is_student_complete(101));
        // 分值保留在映射中
        assert_eq!(session.marks()[&101][&11], 10.0);

        session.set_attendance(101, Attendance::Present).unwrap();
        assert_eq!(session.student_total(101), 15.0);
    }

    #[test]
    fn test_pat_marks_complete() {
        let mut session = open_session(902);
        session.set_pat(102, true).unwrap();
        assert!(session.is_student_complete(102));
        assert_eq!(session.student_total(102), 0.0);
        assert!(!session.needs_attention(102));
        // 未豁免未完成的学生需要提醒
        assert!(session.needs_attention(101));
    }

    #[test]
    fn test_session_validity() {
        // 任何未豁免学生缺少分值时会话无效；
        // 全部完成且团队评语达标时才有效
        let mut session = open_session(903);
        assert!(!session.is_valid_for_submission());

        session.marks_mut().entry(101).or_default().insert(11, 10.0);
        session.marks_mut().entry(101).or_default().insert(12, 5.0);
        assert!(!session.is_valid_for_submission()); // 学生乙未完成

        session.set_pat(102, true).unwrap();
        assert!(!session.is_valid_for_submission()); // 评语不足 10 字符

        session.set_team_comment("short").unwrap();
        assert!(!session.is_valid_for_submission());

        session.set_team_comment("Great work overall").unwrap();
        assert!(session.is_valid_for_submission());
    }

    #[test]
    fn test_totals_rounding() {
        // 舍入规则：保留一位小数
        let mut session = open_session(904);
        session.marks_mut().entry(101).or_default().insert(11, 5.0);
        session.marks_mut().entry(101).or_default().insert(12, 5.0);
        // 5/10*10 + 5/5*5 = 10.0
        assert_eq!(session.student_total(101), 10.0);
        assert_eq!(session.max_total(), 15.0);
    }

    #[test]
    fn test_progress_states() {
        let mut session = open_session(905);
        assert_eq!(session.student_progress(101), StudentProgress::NotStarted);
        session.marks_mut().entry(101).or_default().insert(11, 5.0);
        assert_eq!(session.student_progress(101), StudentProgress::InProgress);
        session.marks_mut().entry(101).or_default().insert(12, 5.0);
        assert_eq!(session.student_progress(101), StudentProgress::Complete);
    }

    #[tokio::test]
    async fn test_switching_window_blocks_mutation() {
        // 切换过渡窗口由时间戳表达：调用方中途放弃切换 future 时
        // 窗口仍然生效，期间一切评分/元数据变更被拒绝
        let mut session = open_session(907);
        session.set_switching_until(Some(Instant::now() + std::time::Duration::from_secs(60)));

        let err = session.set_direct_score(101, 11, 5.0).unwrap_err();
        assert_eq!(err.code(), EvalSystemError::session_state("").code());
        assert!(session.select_level(0).await.is_err());
        assert!(session.set_team_comment("Great work overall").is_err());
        assert!(session.set_attendance(101, Attendance::Absent).is_err());

        // 窗口过期后恢复可变
        session.set_switching_until(None);
        assert!(session.set_direct_score(101, 11, 5.0).is_ok());
    }

    #[test]
    fn test_in_flight_blocks_second_submit() {
        // 提交进行中不允许第二次提交，也不允许状态变更
        let mut session = open_session(908);
        session.begin_submit().unwrap();
        assert!(session.begin_submit().is_err());
        assert!(session.set_team_comment("Great work overall").is_err());
        assert!(session.set_direct_score(101, 11, 5.0).is_err());

        session.finish_submit();
        assert!(session.begin_submit().is_ok());
        session.finish_submit();

        // 已消费的会话拒绝再次提交
        session.mark_consumed();
        assert!(session.begin_submit().is_err());
    }

    #[test]
    fn test_second_session_for_same_team_rejected() {
        let _first = open_session(906);
        let err = MarkEntrySession::open(
            9906,
            &review(),
            &team(906),
            open_now(),
            None,
            SessionTiming::immediate(),
        )
        .unwrap_err();
        assert_eq!(err.code(), EvalSystemError::session_conflict("").code());
    }
}
