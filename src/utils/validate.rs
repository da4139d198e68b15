use crate::models::reviews::entities::DeadlineWindow;
use crate::models::rubrics::entities::RubricComponent;

/// 团队评语最短长度（字符数）
pub const MIN_TEAM_COMMENT_LEN: usize = 10;

/// 校验团队评语
pub fn validate_team_comment(comment: &str) -> Result<(), &'static str> {
    // 评语长度校验：至少 10 个字符
    if comment.chars().count() < MIN_TEAM_COMMENT_LEN {
        return Err("Team comment must be at least 10 characters long");
    }
    Ok(())
}

/// 校验修改申请理由
pub fn validate_edit_reason(reason: &str) -> Result<(), &'static str> {
    // 理由去除首尾空白后非空
    if reason.trim().is_empty() {
        return Err("Edit request reason must not be empty");
    }
    Ok(())
}

/// 校验评审时间窗口
pub fn validate_deadline(deadline: &DeadlineWindow) -> Result<(), &'static str> {
    // 截止窗口校验：from <= to
    if deadline.from > deadline.to {
        return Err("Deadline window start must not be after its end");
    }
    Ok(())
}

/// 校验评分维度
///
/// 规则：
/// - 档位列表非空
/// - 档位分值互不相同
/// - 所有档位分值非负
/// - `max_marks` 必须等于档位分值上限（唯一事实来源是档位上限，
///   不一致的定义在创作时拒绝，而不是留下两套满分）
pub fn validate_component(component: &RubricComponent) -> Result<(), String> {
    if component.levels.is_empty() {
        return Err(format!("Component '{}' has no levels", component.name));
    }
    for level in &component.levels {
        if level.score < 0.0 {
            return Err(format!(
                "Component '{}' has a negative level score {}",
                component.name, level.score
            ));
        }
    }
    for (i, level) in component.levels.iter().enumerate() {
        if component.levels[i + 1..]
            .iter()
            .any(|other| other.score == level.score)
        {
            return Err(format!(
                "Component '{}' has duplicate level score {}",
                component.name, level.score
            ));
        }
    }
    let ceiling = component.level_ceiling();
    if component.max_marks != ceiling {
        return Err(format!(
            "Component '{}' max_marks {} does not match level ceiling {}",
            component.name, component.max_marks, ceiling
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rubrics::entities::RubricLevel;
    use chrono::{TimeZone, Utc};

    fn component(max_marks: f64, scores: &[f64]) -> RubricComponent {
        RubricComponent {
            id: 1,
            name: "Design".to_string(),
            description: None,
            max_marks,
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

    #[test]
    fn test_team_comment_length() {
        assert!(validate_team_comment("too short").is_err());
        assert!(validate_team_comment("Great work overall").is_ok());
        // 多字节字符按字符数计
        assert!(validate_team_comment("整体完成度相当不错").is_err()); // 9 字符
        assert!(validate_team_comment("整体完成度相当不错。").is_ok()); // 10 字符
    }

    #[test]
    fn test_edit_reason() {
        assert!(validate_edit_reason("   ").is_err());
        assert!(validate_edit_reason("medical").is_ok());
    }

    #[test]
    fn test_deadline_window() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 30, 0, 0, 0).unwrap();
        assert!(validate_deadline(&DeadlineWindow { from, to }).is_ok());
        assert!(validate_deadline(&DeadlineWindow { from: to, to: from }).is_err());
        // from == to 是合法窗口
        assert!(validate_deadline(&DeadlineWindow { from, to: from }).is_ok());
    }

    #[test]
    fn test_component_rules() {
        assert!(validate_component(&component(10.0, &[0.0, 5.0, 10.0])).is_ok());
        assert!(validate_component(&component(10.0, &[])).is_err());
        assert!(validate_component(&component(10.0, &[0.0, 5.0, 5.0, 10.0])).is_err());
        assert!(validate_component(&component(10.0, &[-1.0, 10.0])).is_err());
        // max_marks 与档位上限不一致
        assert!(validate_component(&component(20.0, &[0.0, 5.0, 10.0])).is_err());
    }
}
