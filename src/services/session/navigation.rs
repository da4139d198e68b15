//! 会话内导航
//!
//! 学生切换带一个短暂的合成过渡（视觉加载态，功能上是空操作），
//! 过渡窗口内拒绝分值变更；手动前进/后退永不擦除已记录的分值。

use tokio::time::Instant;
use tracing::debug;

use crate::errors::{EvalSystemError, Result};
use crate::services::session::{AdvanceOutcome, MarkEntrySession, SessionView};

impl MarkEntrySession {
    /// 切换到指定学生
    ///
    /// 过渡延时期间持有 `&mut self`；过渡窗口由时间戳表达，
    /// 即使调用方中途放弃 future 也会自然过期。
    pub async fn select_student(&mut self, student_id: i64) -> Result<()> {
        self.ensure_mutable()?;
        let index = self
            .students()
            .iter()
            .position(|s| s.student_id == student_id)
            .ok_or_else(|| EvalSystemError::not_found(format!("学生 {student_id} 不在会话中")))?;

        let delay = self.timing().switch_delay;
        self.set_switching_until(Some(Instant::now() + delay));
        tokio::time::sleep(delay).await;
        self.set_switching_until(None);

        self.set_cursor(index, 0);
        self.set_view(SessionView::Walkthrough);
        debug!("Switched to student {}", student_id);
        Ok(())
    }

    /// 切换到仪表盘总表视图
    pub fn enter_dashboard(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        self.set_view(SessionView::Dashboard);
        Ok(())
    }

    /// 返回走查视图（保持当前光标）
    pub fn enter_walkthrough(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        self.set_view(SessionView::Walkthrough);
        Ok(())
    }

    /// 手动前进到下一个维度
    ///
    /// 最后一个维度继续前进时移到下一个学生的第一个维度
    /// （团队内回绕）。
    pub fn next_rubric(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        let rubric_count = self.review().components.len();
        let student_count = self.students().len();
        if self.active_rubric_index() + 1 < rubric_count {
            self.set_cursor(self.active_student_index(), self.active_rubric_index() + 1);
        } else {
            let next = (self.active_student_index() + 1) % student_count;
            self.set_cursor(next, 0);
        }
        self.set_view(SessionView::Walkthrough);
        Ok(())
    }

    /// 手动后退到上一个维度
    ///
    /// 从学生的第一个维度后退时移到上一个学生的最后一个维度
    /// （团队内回绕，不跨团队）。
    pub fn prev_rubric(&mut self) -> Result<()> {
        self.ensure_mutable()?;
        let rubric_count = self.review().components.len();
        let student_count = self.students().len();
        if self.active_rubric_index() > 0 {
            self.set_cursor(self.active_student_index(), self.active_rubric_index() - 1);
        } else {
            let prev = (self.active_student_index() + student_count - 1) % student_count;
            self.set_cursor(prev, rubric_count - 1);
        }
        self.set_view(SessionView::Walkthrough);
        Ok(())
    }

    /// 打分落定后的自动推进
    pub(crate) fn advance_after_score(&mut self) -> AdvanceOutcome {
        let rubric_count = self.review().components.len();
        if self.active_rubric_index() + 1 < rubric_count {
            self.set_cursor(self.active_student_index(), self.active_rubric_index() + 1);
            return AdvanceOutcome::NextRubric;
        }
        self.advance_to_next_incomplete()
    }

    /// 推进到下一个未完成的学生；没有则进入仪表盘视图
    pub(crate) fn advance_to_next_incomplete(&mut self) -> AdvanceOutcome {
        let student_count = self.students().len();
        let active = self.active_student_index();
        for offset in 1..=student_count {
            let index = (active + offset) % student_count;
            if index == active {
                continue;
            }
            let student_id = self.students()[index].student_id;
            if !self.is_student_complete(student_id) {
                self.set_cursor(index, 0);
                self.set_view(SessionView::Walkthrough);
                return AdvanceOutcome::NextStudent { student_id };
            }
        }
        self.set_view(SessionView::Dashboard);
        AdvanceOutcome::Dashboard
    }
}
