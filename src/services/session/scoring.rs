//! 走查打分与仪表盘直接录入
//!
//! 两个视图共享 `MarkEntrySession` 里同一份分值映射，这里只提供
//! 互不重复的变更入口。

use tracing::{debug, warn};

use crate::errors::{EvalSystemError, Result};
use crate::services::session::{AdvanceOutcome, MarkEntrySession, Spotlight};

/// 仪表盘直接录入被钳位时的警告
#[derive(Debug, Clone, PartialEq)]
pub struct ClampWarning {
    pub student_id: i64,
    pub component_id: i64,
    pub entered: f64,
    pub stored: f64,
}

impl MarkEntrySession {
    /// 当前学生 ID
    pub fn active_student_id(&self) -> Option<i64> {
        self.students()
            .get(self.active_student_index())
            .map(|s| s.student_id)
    }

    /// 当前维度 ID
    pub fn active_component_id(&self) -> Option<i64> {
        self.review()
            .components
            .get(self.active_rubric_index())
            .map(|c| c.id)
    }

    /// 选中档位后的短暂确认展示（停留期间可见）
    pub fn spotlight(&self) -> Option<&Spotlight> {
        self.spotlight.as_ref()
    }

    /// 已记录的分值
    pub fn recorded_score(&self, student_id: i64, component_id: i64) -> Option<f64> {
        self.marks().get(&student_id)?.get(&component_id).copied()
    }

    /// 为当前学生的当前维度选择一个档位
    ///
    /// 记录分值并短暂展示确认信息，停留结束后自动推进：
    /// 下一个维度 → 下一个未完成学生 → 仪表盘视图。
    /// 停留期间持有 `&mut self`，不存在并发的分值变更。
    pub async fn select_level(&mut self, level_index: usize) -> Result<AdvanceOutcome> {
        self.ensure_mutable()?;

        let student_id = self
            .active_student_id()
            .ok_or_else(|| EvalSystemError::session_state("没有当前学生"))?;
        let component = self
            .review()
            .components
            .get(self.active_rubric_index())
            .ok_or_else(|| EvalSystemError::session_state("没有当前评分维度"))?;
        let level = component.levels.get(level_index).ok_or_else(|| {
            EvalSystemError::validation(format!(
                "维度 {} 不存在档位 #{level_index}",
                component.name
            ))
        })?;

        let (component_id, score, label) = (component.id, level.score, level.label.clone());
        self.marks_mut()
            .entry(student_id)
            .or_default()
            .insert(component_id, score);
        debug!(
            "Recorded score {} for student {} / component {}",
            score, student_id, component_id
        );

        self.set_spotlight(Some(Spotlight {
            student_id,
            component_id,
            score,
            label,
        }));
        tokio::time::sleep(self.timing().settle_delay).await;
        self.set_spotlight(None);

        Ok(self.advance_after_score())
    }

    /// 仪表盘视图的单元格直接录入
    ///
    /// 输入值钳位到 `[0, 档位上限]`；越界输入存入边界值并返回警告，
    /// 绝不静默丢弃，也绝不保留未钳位的值。
    pub fn set_direct_score(
        &mut self,
        student_id: i64,
        component_id: i64,
        value: f64,
    ) -> Result<Option<ClampWarning>> {
        self.ensure_mutable()?;

        // NaN/无穷会原样穿过 clamp，先行拒绝
        if !value.is_finite() {
            return Err(EvalSystemError::validation(format!(
                "分值必须是有限数字，收到 {value}"
            )));
        }
        if !self.students().iter().any(|s| s.student_id == student_id) {
            return Err(EvalSystemError::not_found(format!(
                "学生 {student_id} 不在会话中"
            )));
        }
        let component = self
            .review()
            .components
            .iter()
            .find(|c| c.id == component_id)
            .ok_or_else(|| {
                EvalSystemError::not_found(format!("评分维度 {component_id} 不在本次评审中"))
            })?;

        let ceiling = component.level_ceiling();
        let stored = value.clamp(0.0, ceiling);
        let warning = if stored != value {
            warn!(
                "Clamped direct entry {} to {} for student {} / component {}",
                value, stored, student_id, component_id
            );
            Some(ClampWarning {
                student_id,
                component_id,
                entered: value,
                stored,
            })
        } else {
            None
        };

        self.marks_mut()
            .entry(student_id)
            .or_default()
            .insert(component_id, stored);
        Ok(warning)
    }
}
